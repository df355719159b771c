pub mod crypto;
pub mod json_field;
pub mod time;
pub mod token;
pub mod validation;
