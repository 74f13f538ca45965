use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User account entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Salted argon2 hash; plaintext is never persisted or serialized.
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Closed role enumeration gating access to the administrator and client views.
///
/// Anything outside these two values fails closed at the auth boundary:
/// tokens carrying an unknown role are rejected, never elevated.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "administrator")]
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Administrator => "administrator",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "administrator" => Ok(Role::Administrator),
            _ => Err(()),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_parsing_is_closed() {
        assert_eq!(Role::from_str("client"), Ok(Role::Client));
        assert_eq!(Role::from_str("administrator"), Ok(Role::Administrator));
        assert!(Role::from_str("admin").is_err());
        assert!(Role::from_str("superuser").is_err());
        assert!(Role::from_str("").is_err());
        assert!(Role::from_str("Administrator").is_err());
    }
}
