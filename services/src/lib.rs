pub mod activity;
pub mod attendance;
pub mod batch;
pub mod certificate;
pub mod context;
pub mod enrollment;
pub mod error;
pub mod hours;
pub mod notifier;
pub mod session;
pub mod session_generator;

#[cfg(test)]
mod test_support;

pub use context::ActingUser;
pub use error::{ErrorKind, ServiceError, ServiceResult};
