use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::debug;

use crate::world::grid::CellId;
use crate::world::{Entity, EntityId, World};

/// One arrest made during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Arrest {
    pub cop: EntityId,
    pub suspect: EntityId,
    pub cell: CellId,
    pub jail_term: u32,
}

fn is_visible_rebel(entity: &Entity) -> bool {
    entity.as_agent().is_some_and(|a| a.is_visible_rebel())
}

/// Arrest one random active, free agent around the cop, if any.
///
/// The cop moves onto the suspect's cell. The jail term is drawn uniformly
/// from `0..=max_jail_term`; a term of 0 releases the suspect immediately.
pub fn enforce(world: &mut World, id: EntityId) -> Option<Arrest> {
    let cell = world.entity(id)?.cell?;
    let suspects = world
        .grid
        .entities_matching(cell, &world.entities, is_visible_rebel);
    let suspect = *suspects.choose(&mut world.rng)?;
    let target = world.entity(suspect)?.cell?;

    world.place(id, target);

    let jail_term = world.rng.gen_range(0..=world.params.max_jail_term);
    world
        .entity_mut(suspect)
        .and_then(Entity::as_agent_mut)?
        .arrest(jail_term);

    debug!(cop = %id, suspect = %suspect, cell = target, jail_term, "Arrest");
    Some(Arrest {
        cop: id,
        suspect,
        cell: target,
        jail_term,
    })
}

/// Per-tick update of a cop: enforce every tick.
pub fn on_tick(world: &mut World, id: EntityId) -> Option<Arrest> {
    enforce(world, id)
}
