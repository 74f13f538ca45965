use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::{self, AuthService};
use crate::db::DbPool;
use crate::entities::{user, Role};
use crate::errors::{map_insert_error, ServiceError};

/// Registration and login.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
    auth: Arc<AuthService>,
    bootstrap_admin_email: Option<String>,
}

/// Outcome of a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
}

impl UserService {
    pub fn new(
        db: Arc<DbPool>,
        auth: Arc<AuthService>,
        bootstrap_admin_email: Option<String>,
    ) -> Self {
        Self {
            db,
            auth,
            bootstrap_admin_email: bootstrap_admin_email.map(|e| e.trim().to_lowercase()),
        }
    }

    /// Registers a new user. A duplicate email fails with `Duplicate` and
    /// inserts nothing (enforced by the unique constraint, not a pre-check,
    /// so two racing registrations cannot both pass).
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: &str,
    ) -> Result<Uuid, ServiceError> {
        let email = email.trim().to_lowercase();

        let role = match &self.bootstrap_admin_email {
            Some(admin_email) if *admin_email == email => Role::Administrator,
            _ => Role::Client,
        };

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email.clone()),
            password_hash: Set(auth::hash_password(password)?),
            role: Set(role),
            created_at: Set(chrono::Utc::now()),
        };

        let created = model
            .insert(&*self.db)
            .await
            .map_err(|e| map_insert_error(e, &format!("email {email} is already registered")))?;

        info!(user_id = %created.id, "user registered");
        Ok(created.id)
    }

    /// Verifies credentials and issues an access token. Unknown email and
    /// wrong password return the same message.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let email = email.trim().to_lowercase();

        let user = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::Auth("unknown email or password".to_string()))?;

        if !auth::verify_password(password, &user.password_hash)? {
            return Err(ServiceError::Auth("unknown email or password".to_string()));
        }

        let token = self.auth.issue_token(&user)?;

        info!(user_id = %user.id, "login succeeded");
        Ok(LoginResponse {
            token,
            user_id: user.id,
            name: user.name,
            role: user.role,
        })
    }
}
