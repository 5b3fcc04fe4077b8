#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod mail;
pub mod member;
pub mod password;
pub mod registration;
pub mod util;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Error, Result};
pub use host::Portal;
pub use registration::RegistrationTool;
