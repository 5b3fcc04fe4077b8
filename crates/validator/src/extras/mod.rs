mod email;
mod url;

pub use email::{is_single_address, validate_email, EMAIL_MAX_LEN};
pub use url::validate_url;
