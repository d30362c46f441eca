pub mod error;

pub use error::{ContractViolation, PlanningError};

pub type PlanningResult<T> = Result<T, PlanningError>;
