use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit entry. Nothing here is ever mutated except `read`,
/// flipped when the viewing user opens their feed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,

    pub workspace_id: String,
    pub board_id: Option<String>,
    pub task_id: Option<String>,

    /// Acting user; absent for system-originated entries.
    pub user_id: Option<String>,

    /// Typed event tag, e.g. `task.moved`.
    pub event: String,

    /// Free-text context for the feed line.
    pub detail: Option<String>,

    pub read: bool,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
