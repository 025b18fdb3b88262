use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Workspace membership row, one per (workspace, user).
///
/// Members are rows rather than an embedded array so role changes and
/// removals update a single row instead of rewriting the whole list.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workspace_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,

    pub workspace_id: String,
    pub user_id: String,

    pub role: Role,

    /// Unix timestamp (seconds).
    pub joined_at: i64,
}

/// Membership role. The workspace owner always holds `Admin`.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "EDITOR")]
    Editor,
    #[sea_orm(string_value = "VIEWER")]
    Viewer,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
