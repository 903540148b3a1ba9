use db::models::user::Role;
use serde::{Deserialize, Serialize};
use services::ActingUser;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The request-scoped identity handed to every service call.
    pub fn actor(&self) -> ActingUser {
        ActingUser::new(self.0.sub, self.0.role)
    }
}
