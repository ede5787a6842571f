pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod simulation;
pub mod world;

pub use error::SimError;
pub use world::World;
