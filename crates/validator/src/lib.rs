#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;

pub use error::*;
pub mod extras;

pub trait Validate {
  fn validate(&self) -> Result<(), ValidateError>;
}
