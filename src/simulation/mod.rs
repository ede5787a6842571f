pub mod agent;
pub mod cop;
pub mod statistics;

use rand::seq::SliceRandom;
use tracing::debug;

use crate::simulation::cop::Arrest;
use crate::simulation::statistics::TickStatistics;
use crate::world::{EntityId, Role, World};

/// Result of executing a single tick.
#[derive(Debug, Clone)]
pub struct TickResult {
    pub statistics: TickStatistics,
    pub arrests: Vec<Arrest>,
}

/// What a single entity update produced.
#[derive(Debug, Default)]
struct UpdateOutcome {
    arrest: Option<Arrest>,
    blocked: bool,
}

/// Execute a single simulation tick on the world.
///
/// The update order is a fresh uniform permutation of the population. Each
/// entity updates exactly once, sequentially, and sees every move made by
/// the entities before it in the same tick.
pub fn execute_tick(world: &mut World) -> TickResult {
    let mut order = std::mem::take(&mut world.schedule);
    order.shuffle(&mut world.rng);

    let mut arrests = Vec::new();
    let mut blocked_moves = 0;
    for &id in &order {
        let outcome = update_entity(world, id);
        arrests.extend(outcome.arrest);
        if outcome.blocked {
            blocked_moves += 1;
        }
    }
    world.schedule = order;

    world.tick_count += 1;
    let statistics = statistics::compute_statistics(
        world.tick_count,
        &world.entities,
        arrests.len(),
        blocked_moves,
    );

    TickResult {
        statistics,
        arrests,
    }
}

/// One entity's per-tick update, dispatched on its role.
fn update_entity(world: &mut World, id: EntityId) -> UpdateOutcome {
    let Some(role) = world.entity(id).map(|e| e.role()) else {
        return UpdateOutcome::default();
    };

    let mut outcome = UpdateOutcome::default();
    if world.params.movement {
        if let Err(e) = world.relocate(id) {
            debug!(entity = %id, error = %e, "No free cell, staying put");
            outcome.blocked = true;
        }
    }

    match role {
        Role::Agent => agent::on_tick(world, id),
        Role::Cop => outcome.arrest = cop::on_tick(world, id),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::ModelParams;
    use crate::simulation::statistics::PopulationCounts;
    use crate::world::Entity;

    fn scenario_params() -> ModelParams {
        ModelParams {
            width: 5,
            height: 5,
            cop_density: 0.04,
            agent_density: 0.7,
            vision: 7.0,
            k: 2.3,
            threshold: 0.1,
            max_jail_term: 30,
            government_legitimacy: 0.82,
            movement: false,
            seed: 0,
        }
    }

    fn jail_terms(world: &World) -> Vec<u32> {
        world
            .entities()
            .iter()
            .filter_map(Entity::as_agent)
            .map(|a| a.jail_term)
            .collect()
    }

    #[test]
    fn five_by_five_scenario_first_tick() {
        let mut world = World::with_seed(scenario_params(), 2019).unwrap();
        let cop = EntityId::new(0);
        assert_eq!(world.entity(cop).unwrap().role(), Role::Cop);
        let cop_cell_before = world.entity(cop).unwrap().cell;
        let cells_before: Vec<_> = world.entities().iter().map(|e| e.cell).collect();

        let result = world.tick();

        assert_eq!(result.statistics.tick, 1);
        assert_eq!(result.statistics.counts.total(), 17);
        assert_eq!(world.agent_count(), 17);
        world.assert_placement_consistent();

        let occupants: usize = world
            .grid()
            .cells()
            .iter()
            .map(|c| c.occupants().len())
            .sum();
        assert_eq!(occupants, 18);

        let cop_cell_after = world.entity(cop).unwrap().cell;
        if cop_cell_after != cop_cell_before {
            let arrest = result.arrests.first().expect("a moving cop made an arrest");
            assert_eq!(Some(arrest.cell), cop_cell_after);
            assert_eq!(cells_before[arrest.suspect.index()], cop_cell_after);
        }
        assert!(result.arrests.len() <= 1);
    }

    #[test]
    fn placement_stays_consistent_over_many_ticks() {
        let params = ModelParams {
            width: 12,
            height: 9,
            vision: 3.0,
            government_legitimacy: 0.3,
            ..scenario_params()
        };
        let mut world = World::with_seed(params, 5).unwrap();
        for _ in 0..100 {
            let result = world.tick();
            world.assert_placement_consistent();
            assert_eq!(result.statistics.counts.total(), world.agent_count());
        }
    }

    #[test]
    fn same_seed_same_history() {
        let params = ModelParams {
            width: 10,
            height: 10,
            government_legitimacy: 0.5,
            ..scenario_params()
        };
        let run = || {
            let mut world = World::with_seed(params.clone(), 314).unwrap();
            (0..50)
                .map(|_| world.tick().statistics.counts)
                .collect::<Vec<PopulationCounts>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn jail_terms_only_rise_through_arrests() {
        let params = ModelParams {
            width: 10,
            height: 10,
            cop_density: 0.1,
            government_legitimacy: 0.2,
            ..scenario_params()
        };
        let mut world = World::with_seed(params, 8).unwrap();
        for _ in 0..60 {
            let before = jail_terms(&world);
            let result = world.tick();
            let after = jail_terms(&world);
            let cops = world.cop_count();
            for (i, (b, a)) in before.iter().zip(&after).enumerate() {
                let id = EntityId::new(i + cops);
                let arrests: Vec<_> = result.arrests.iter().filter(|r| r.suspect == id).collect();
                if arrests.is_empty() {
                    assert!(a <= b, "agent {} term rose from {} to {}", id, b, a);
                } else {
                    assert!(arrests.iter().all(|r| r.jail_term <= 30));
                    assert!(arrests.iter().any(|r| *a <= r.jail_term));
                }
            }
        }
    }

    #[test]
    fn low_legitimacy_produces_arrests() {
        let params = ModelParams {
            width: 10,
            height: 10,
            cop_density: 0.05,
            government_legitimacy: 0.0,
            threshold: 0.1,
            ..scenario_params()
        };
        let mut world = World::with_seed(params, 21).unwrap();
        let arrests: usize = (0..20).map(|_| world.tick().arrests.len()).sum();
        assert!(arrests > 0);
        assert!(world.counts().jailed > 0 || world.counts().active > 0);
    }

    #[test]
    fn full_legitimacy_keeps_everyone_quiet() {
        let params = ModelParams {
            government_legitimacy: 1.0,
            ..scenario_params()
        };
        let mut world = World::with_seed(params, 4).unwrap();
        for _ in 0..10 {
            let result = world.tick();
            assert_eq!(result.statistics.counts.quiet, 17);
            assert!(result.arrests.is_empty());
        }
    }

    #[test]
    fn empty_world_ticks() {
        let params = ModelParams {
            cop_density: 0.0,
            agent_density: 0.0,
            ..scenario_params()
        };
        let mut world = World::with_seed(params, 1).unwrap();
        let result = world.tick();
        assert_eq!(result.statistics.counts.total(), 0);
        assert_eq!(world.tick_count(), 1);
    }

    #[test]
    fn movement_keeps_free_entities_unstacked() {
        let params = ModelParams {
            width: 8,
            height: 8,
            movement: true,
            government_legitimacy: 1.0,
            ..scenario_params()
        };
        let mut world = World::with_seed(params, 17).unwrap();
        let start: Vec<_> = world.entities().iter().map(|e| e.cell).collect();
        for _ in 0..5 {
            let result = world.tick();
            assert_eq!(result.statistics.blocked_moves, 0);
            world.assert_placement_consistent();
            for cell in world.grid().cells() {
                let blockers = cell
                    .occupants()
                    .iter()
                    .filter(|&&id| world.entity(id).is_some_and(Entity::occupies))
                    .count();
                assert!(blockers <= 1);
            }
        }
        let end: Vec<_> = world.entities().iter().map(|e| e.cell).collect();
        assert_ne!(start, end);
    }

    #[test]
    fn movement_on_full_grid_is_blocked_not_stuck() {
        let params = ModelParams {
            width: 2,
            height: 2,
            cop_density: 0.25,
            agent_density: 0.75,
            movement: true,
            government_legitimacy: 1.0,
            ..scenario_params()
        };
        let mut world = World::with_seed(params, 3).unwrap();
        let result = world.tick();
        assert_eq!(result.statistics.blocked_moves, 4);
        world.assert_placement_consistent();
    }

    #[test]
    fn update_order_is_reshuffled_every_tick() {
        let mut world = World::with_seed(scenario_params(), 42).unwrap();
        let population = world.entities().len();
        let ticks = 1800;
        let mut first_counts = vec![0usize; population];
        let mut previous = world.schedule.clone();
        let mut unchanged = 0;

        for _ in 0..ticks {
            world.tick();
            if world.schedule == previous {
                unchanged += 1;
            }
            previous = world.schedule.clone();
            first_counts[world.schedule[0].index()] += 1;
        }

        assert_eq!(unchanged, 0);
        // 1800 ticks over 18 entities: 100 expected leads each.
        let expected = ticks / population;
        for (index, &count) in first_counts.iter().enumerate() {
            assert!(
                count > expected / 2 && count < expected * 2,
                "entity {} led {} of {} ticks",
                index,
                count,
                ticks
            );
        }
    }

    #[test]
    fn schedule_survives_ticks() {
        let mut world = World::with_seed(scenario_params(), 6).unwrap();
        world.tick();
        world.tick();
        let mut ids: Vec<_> = world.schedule.iter().map(|id| id.index()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..18).collect::<Vec<_>>());
    }
}
