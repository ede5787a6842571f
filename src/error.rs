use thiserror::Error;

/// Errors raised by world construction and movement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Every cell is occupied, so there is nowhere to place a mobile entity.
    #[error("no unoccupied cell left ({occupants} occupants on {cells} cells)")]
    NoCapacity { occupants: usize, cells: usize },

    /// Parameters rejected before any entity was created.
    #[error("invalid configuration:\n{0}")]
    InvalidConfiguration(String),
}
