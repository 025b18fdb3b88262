use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Top-level tenant boundary. Boards, tasks, requests, and activity all
/// hang off a workspace and are never shared across workspaces.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workspaces")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,

    pub name: String,

    /// URL identity, globally unique.
    #[sea_orm(unique)]
    pub slug: String,

    pub owner_user_id: String,

    /// Shareable join code; regenerable by an admin.
    pub invite_code: String,

    /// When set, non-members may view the workspace's boards.
    pub public_access: bool,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
