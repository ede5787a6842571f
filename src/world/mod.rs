pub mod entity;
pub mod grid;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::model::ModelParams;
use crate::error::SimError;
use crate::simulation::{self, TickResult};
use crate::simulation::statistics::PopulationCounts;
pub use entity::{Agent, Entity, EntityId, EntityKind, Role};
pub use grid::{Cell, CellId, Grid};

/// The grid, its fixed population and the run's single random stream.
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) params: ModelParams,
    pub(crate) grid: Grid,
    pub(crate) entities: Vec<Entity>,
    /// Update order, reshuffled every tick.
    pub(crate) schedule: Vec<EntityId>,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) tick_count: u64,
}

impl World {
    /// Build a world from `params`.
    ///
    /// If `params.seed` is 0, a random seed is chosen. The seed actually used
    /// is stored in [`World::params`] so the run can be replayed.
    pub fn new(params: ModelParams) -> Result<Self, SimError> {
        let seed = if params.seed == 0 {
            rand::thread_rng().r#gen()
        } else {
            params.seed
        };
        Self::with_seed(params, seed)
    }

    /// Build a world whose random stream starts from `seed`.
    ///
    /// Parameters are validated before any entity is created. Cops are
    /// placed first, then agents, each on a random unoccupied cell.
    pub fn with_seed(params: ModelParams, seed: u64) -> Result<Self, SimError> {
        params.validate().map_err(SimError::InvalidConfiguration)?;

        let params = ModelParams { seed, ..params };
        let grid = Grid::new(params.width, params.height, params.vision);
        let cops = params.cop_count();
        let agents = params.agent_count();

        let mut world = World {
            grid,
            entities: Vec::with_capacity(cops + agents),
            schedule: Vec::with_capacity(cops + agents),
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick_count: 0,
            params,
        };

        for _ in 0..cops {
            let id = EntityId::new(world.entities.len());
            world.spawn(Entity::cop(id))?;
        }
        for _ in 0..agents {
            let id = EntityId::new(world.entities.len());
            let agent = Agent::random(&mut world.rng);
            world.spawn(Entity::agent(id, agent))?;
        }

        info!(
            seed,
            width = world.params.width,
            height = world.params.height,
            cops,
            agents,
            "World created"
        );
        Ok(world)
    }

    fn spawn(&mut self, entity: Entity) -> Result<(), SimError> {
        let id = entity.id;
        self.entities.push(entity);
        self.schedule.push(id);
        let cell = self.grid.random_unoccupied_cell(&self.entities, &mut self.rng)?;
        self.grid.place(&mut self.entities, id, cell);
        Ok(())
    }

    /// Advance the simulation by one step.
    pub fn tick(&mut self) -> TickResult {
        simulation::execute_tick(self)
    }

    /// Move `id` to a random unoccupied cell if it is able to move.
    ///
    /// Returns whether a move happened. `NoCapacity` leaves the entity where
    /// it was.
    pub fn relocate(&mut self, id: EntityId) -> Result<bool, SimError> {
        if !self.entity(id).is_some_and(Entity::can_move) {
            return Ok(false);
        }
        let cell = self.grid.random_unoccupied_cell(&self.entities, &mut self.rng)?;
        self.grid.place(&mut self.entities, id, cell);
        Ok(true)
    }

    pub(crate) fn place(&mut self, id: EntityId, cell: CellId) {
        self.grid.place(&mut self.entities, id, cell);
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.params.seed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    pub fn agent(&self, id: EntityId) -> Option<&Agent> {
        self.entity(id).and_then(Entity::as_agent)
    }

    /// Occupants of the cell at `(x, y)`, in arrival order.
    pub fn occupants_at(&self, x: u32, y: u32) -> impl Iterator<Item = &Entity> + '_ {
        self.grid
            .cell_at(x, y)
            .and_then(|id| self.grid.cell(id))
            .map(Cell::occupants)
            .unwrap_or_default()
            .iter()
            .filter_map(|&id| self.entity(id))
    }

    /// Concatenated occupant symbols of the cell at `(x, y)`.
    pub fn symbols_at(&self, x: u32, y: u32) -> String {
        self.occupants_at(x, y).map(Entity::symbol).collect()
    }

    /// Quiet, jailed and active agent totals for the current state.
    pub fn counts(&self) -> PopulationCounts {
        PopulationCounts::of(&self.entities)
    }

    pub fn cop_count(&self) -> usize {
        self.entities.iter().filter(|e| e.role() == Role::Cop).count()
    }

    pub fn agent_count(&self) -> usize {
        self.entities.iter().filter(|e| e.role() == Role::Agent).count()
    }

    #[cfg(test)]
    pub(crate) fn assert_placement_consistent(&self) {
        for (cell_id, cell) in self.grid.cells().iter().enumerate() {
            for &id in cell.occupants() {
                assert_eq!(
                    self.entity(id).and_then(|e| e.cell),
                    Some(cell_id),
                    "{} listed on cell {} but records another cell",
                    id,
                    cell_id
                );
            }
        }
        for entity in &self.entities {
            let cell = entity.cell.expect("every entity is placed");
            let listed = self.grid.cell(cell).map(Cell::occupants).unwrap_or_default();
            assert_eq!(listed.iter().filter(|&&o| o == entity.id).count(), 1);
        }
    }
}
