use crate::world::{Agent, Entity, EntityId, Role, World};

/// Static grievance: `hardship * (1 - legitimacy)`.
pub fn grievance(perceived_hardship: f64, government_legitimacy: f64) -> f64 {
    perceived_hardship * (1.0 - government_legitimacy)
}

/// `1 - exp(-k * floor(cops / rebels))`.
///
/// `rebels` counts the deciding agent itself, so it is at least 1. The ratio
/// is an integer division, so a neighbourhood needs at least as many cops as
/// rebels before any risk is felt.
pub fn estimated_arrest_probability(k: f64, cops: usize, rebels: usize) -> f64 {
    let ratio = cops / rebels.max(1);
    1.0 - (-k * ratio as f64).exp()
}

fn is_active(entity: &Entity) -> bool {
    entity.as_agent().is_some_and(|a| a.active)
}

/// Perceived arrest risk for the agent `id`, from the cops and active agents
/// around its cell.
pub fn arrest_probability_for(world: &World, id: EntityId) -> f64 {
    let Some(cell) = world.entity(id).and_then(|e| e.cell) else {
        return 0.0;
    };
    let cops = world
        .grid
        .count_matching(cell, &world.entities, Role::Cop, None);
    let active = world
        .grid
        .count_matching(cell, &world.entities, Role::Agent, Some(&is_active));
    estimated_arrest_probability(world.params.k, cops, 1 + active)
}

/// Decide whether the agent rebels this tick.
pub fn determine_behaviour(world: &mut World, id: EntityId) {
    let Some(agent) = world.agent(id) else {
        return;
    };
    let net_risk = agent.risk_aversion * arrest_probability_for(world, id);
    let felt = grievance(agent.perceived_hardship, world.params.government_legitimacy);
    let rebels = felt - net_risk > world.params.threshold;

    if let Some(agent) = world.entity_mut(id).and_then(Entity::as_agent_mut) {
        agent.active = rebels;
    }
}

/// Per-tick update of an agent: recompute behaviour unless jailed, then
/// serve one tick of any jail term.
pub fn on_tick(world: &mut World, id: EntityId) {
    let Some(jailed) = world.agent(id).map(Agent::is_jailed) else {
        return;
    };
    if !jailed {
        determine_behaviour(world, id);
    }
    if let Some(agent) = world.entity_mut(id).and_then(Entity::as_agent_mut) {
        agent.serve_jail_time();
    }
}
