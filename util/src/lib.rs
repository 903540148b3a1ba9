pub mod config;
pub mod test_helpers;
pub mod validation;
