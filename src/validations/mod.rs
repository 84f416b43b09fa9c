mod short_link;

pub use short_link::{is_valid_short_code, validate_url, MAX_CODE_LENGTH};
