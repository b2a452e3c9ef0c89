pub mod building;
pub mod catalog;
pub mod config;
pub mod grid;
pub mod optimizer;
pub mod placement;
pub mod report;
pub mod scenario;
pub mod strategy;

pub use config::PlotConfiguration;
pub use placement::PlacementEngine;
pub use strategy::{OptimizationResult, RoadStrategy};
