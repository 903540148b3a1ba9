use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, DbErr, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Platform-wide role of a user.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "professor")]
    Professor,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Represents a user in the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique student or staff number.
    pub username: String,
    /// User's unique email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let active_model = ActiveModel {
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(Self::hash_password(password)?),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_by_username(db: &DbConn, username: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Username.eq(username))
            .one(db)
            .await
    }

    pub fn hash_password(password: &str) -> Result<String, DbErr> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DbErr::Custom(format!("Failed to hash password: {e}")))
    }

    pub fn verify_password(&self, password: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_create_and_verify_password() {
        let db = setup_test_db().await;

        let user = Model::create(&db, "u21000001", "student@up.ac.za", "hunter22", Role::Student)
            .await
            .unwrap();
        assert_eq!(user.role, Role::Student);
        assert_ne!(user.password_hash, "hunter22");
        assert!(user.verify_password("hunter22"));
        assert!(!user.verify_password("wrong"));

        let found = Model::find_by_username(&db, "u21000001").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[test]
    fn test_role_parses_case_insensitively() {
        assert_eq!("Professor".parse::<Role>().unwrap(), Role::Professor);
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
