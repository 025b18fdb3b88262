use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Assignment of a user to a task, one row per (task, user).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task_assignees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,

    pub task_id: String,
    pub user_id: String,

    /// Unix timestamp (seconds).
    pub assigned_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
