// src/config/mod.rs
pub mod model;
pub mod plans;

pub use model::ModelConfig;
pub use plans::{PlanConfig, PlanTable, PlanTier};
