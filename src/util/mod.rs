pub mod figment;
pub mod validator;

mod sensitive;
pub use sensitive::Sensitive;
