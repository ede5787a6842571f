use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::SimError;
use crate::world::entity::{Entity, EntityId, Role};

/// Index of a cell in the grid, row-major from the bottom-left corner.
pub type CellId = usize;

/// A fixed grid location holding zero or more entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    x: u32,
    y: u32,
    occupants: Vec<EntityId>,
}

impl Cell {
    fn new(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            occupants: Vec::new(),
        }
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    /// Entities on this cell, in arrival order.
    pub fn occupants(&self) -> &[EntityId] {
        &self.occupants
    }

    /// A cell is occupied if it holds a cop or a free agent.
    /// Jailed agents are present but do not block placement.
    pub fn is_occupied(&self, entities: &[Entity]) -> bool {
        self.occupants
            .iter()
            .any(|id| entities.get(id.index()).is_some_and(Entity::occupies))
    }

    fn distance_to(&self, other: &Cell) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Fixed-size cell grid with a vision-radius neighbour index.
///
/// Neighbour lists are derived once from the grid topology at construction;
/// the topology never changes, so [`Grid::compute_neighbors`] always
/// reproduces them.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    vision: f64,
    cells: Vec<Cell>,
    neighbors: Vec<Vec<CellId>>,
}

impl Grid {
    pub fn new(width: u32, height: u32, vision: f64) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(x, y));
            }
        }

        let mut grid = Self {
            width,
            height,
            vision,
            cells,
            neighbors: Vec::new(),
        };
        grid.neighbors = (0..grid.cells.len())
            .map(|id| grid.compute_neighbors(id))
            .collect();
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn vision(&self) -> f64 {
        self.vision
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn cell_at(&self, x: u32, y: u32) -> Option<CellId> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// All other cells within the vision radius of `cell`, in row-major order.
    pub fn neighbors(&self, cell: CellId) -> &[CellId] {
        self.neighbors.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Recompute the neighbour list of `cell` from coordinates alone.
    ///
    /// Only the bounding box of the vision circle is scanned; the grid does
    /// not wrap at its edges. The box never extends past the grid, however
    /// large the vision radius.
    pub fn compute_neighbors(&self, cell: CellId) -> Vec<CellId> {
        let Some(origin) = self.cells.get(cell) else {
            return Vec::new();
        };
        let extent = f64::from(self.width.max(self.height));
        let reach = self.vision.min(extent).floor() as i64;
        let min_x = (i64::from(origin.x) - reach).max(0);
        let max_x = (i64::from(origin.x) + reach).min(i64::from(self.width) - 1);
        let min_y = (i64::from(origin.y) - reach).max(0);
        let max_y = (i64::from(origin.y) + reach).min(i64::from(self.height) - 1);

        let mut out = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let id = y as usize * self.width as usize + x as usize;
                if id == cell {
                    continue;
                }
                if origin.distance_to(&self.cells[id]) <= self.vision {
                    out.push(id);
                }
            }
        }
        out
    }

    /// Entities on neighbouring cells satisfying `predicate`.
    ///
    /// Neighbour cells are visited in row-major order and occupants in arrival
    /// order. Callers needing a fair pick must draw from the result.
    pub fn entities_matching<P>(
        &self,
        cell: CellId,
        entities: &[Entity],
        predicate: P,
    ) -> Vec<EntityId>
    where
        P: Fn(&Entity) -> bool,
    {
        self.neighbors(cell)
            .iter()
            .flat_map(|&n| self.cells[n].occupants.iter().copied())
            .filter(|id| entities.get(id.index()).is_some_and(&predicate))
            .collect()
    }

    /// Number of neighbouring entities with the given role that satisfy
    /// `predicate` (all of them when `predicate` is `None`).
    pub fn count_matching(
        &self,
        cell: CellId,
        entities: &[Entity],
        role: Role,
        predicate: Option<&dyn Fn(&Entity) -> bool>,
    ) -> usize {
        self.entities_matching(cell, entities, |e| {
            e.role() == role && predicate.is_none_or(|p| p(e))
        })
        .len()
    }

    /// Pick a cell uniformly among those not occupied.
    pub fn random_unoccupied_cell<R: Rng + ?Sized>(
        &self,
        entities: &[Entity],
        rng: &mut R,
    ) -> Result<CellId, SimError> {
        let free: Vec<CellId> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_occupied(entities))
            .map(|(id, _)| id)
            .collect();

        free.choose(rng).copied().ok_or_else(|| SimError::NoCapacity {
            occupants: entities.iter().filter(|e| e.occupies()).count(),
            cells: self.cells.len(),
        })
    }

    /// Move `id` onto `cell`, detaching it from its previous cell.
    /// This is the only way occupancy changes.
    pub fn place(&mut self, entities: &mut [Entity], id: EntityId, cell: CellId) {
        let Some(entity) = entities.get_mut(id.index()) else {
            return;
        };
        if cell >= self.cells.len() {
            return;
        }
        if let Some(previous) = entity.cell {
            if let Some(prev) = self.cells.get_mut(previous) {
                if let Some(pos) = prev.occupants.iter().position(|&o| o == id) {
                    prev.occupants.remove(pos);
                }
            }
        }
        self.cells[cell].occupants.push(id);
        entity.cell = Some(cell);
    }
}
