use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A viewer's ask to be promoted to editor, reviewed by an admin.
///
/// At most one PENDING row may exist per (workspace, user); a partial
/// unique index backs the application-level existence check.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "access_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,

    pub workspace_id: String,
    pub user_id: String,

    pub status: AccessRequestStatus,

    pub message: Option<String>,

    pub reviewed_by: Option<String>,

    /// Unix timestamp (seconds).
    pub reviewed_at: Option<i64>,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessRequestStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "DENIED")]
    Denied,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
