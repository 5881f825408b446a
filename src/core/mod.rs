mod engine;
mod error;
mod types;

pub use engine::{
    max_loan_amount, months_to_goal, project, required_down_payment, split_months, validate,
};
pub use error::ProjectionError;
pub use types::{AffordabilityInput, AffordabilityResult, GoalTime};
