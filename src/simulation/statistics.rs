use serde::Serialize;

use crate::world::Entity;

/// Agent totals by status. Every agent falls in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PopulationCounts {
    pub quiet: usize,
    pub jailed: usize,
    pub active: usize,
}

impl PopulationCounts {
    pub fn of(entities: &[Entity]) -> Self {
        let mut counts = Self::default();
        for agent in entities.iter().filter_map(Entity::as_agent) {
            if agent.is_jailed() {
                counts.jailed += 1;
            } else if agent.active {
                counts.active += 1;
            } else {
                counts.quiet += 1;
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.quiet + self.jailed + self.active
    }

    /// Share of free agents that are rebelling; 0 when nobody is free.
    pub fn rebellion_ratio(&self) -> f64 {
        let free = self.active + self.quiet;
        if free == 0 {
            0.0
        } else {
            self.active as f64 / free as f64
        }
    }

    /// Whether the rebellion is widespread enough to be reported.
    pub fn is_reported(&self, threshold: f64) -> bool {
        self.rebellion_ratio() > threshold
    }
}

/// Per-tick aggregate metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickStatistics {
    pub tick: u64,
    #[serde(flatten)]
    pub counts: PopulationCounts,
    pub arrests: usize,
    /// Optional movements that found no free cell.
    pub blocked_moves: usize,
}

/// Compute statistics for the current world state after a tick.
pub fn compute_statistics(
    tick: u64,
    entities: &[Entity],
    arrests: usize,
    blocked_moves: usize,
) -> TickStatistics {
    TickStatistics {
        tick,
        counts: PopulationCounts::of(entities),
        arrests,
        blocked_moves,
    }
}
