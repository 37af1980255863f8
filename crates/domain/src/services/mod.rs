//! Domain services for the command queue.
//!
//! Services contain business rules that operate on domain models.

pub mod params_validator;
pub mod retry_policy;

pub use params_validator::{
    FieldViolation, JsonParamsValidator, ParamsValidator, ParamsValidatorError,
};
pub use retry_policy::RetryPolicy;
