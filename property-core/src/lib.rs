pub mod calculations;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;

pub use db::repository::{RepositoryError, SnapshotRepository};
pub use engine::{
    Engine, PropertyReport, compute_all, compute_income_breakdown,
    compute_inflation_adjusted_projection, compute_loan_projection, compute_savings_projection,
    compute_sensitivity, compute_tax,
};
pub use error::EngineError;
pub use models::*;
