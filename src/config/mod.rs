pub mod model;
pub mod simulation;
