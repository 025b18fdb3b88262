use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kanban board scoped to one workspace.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "boards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,

    pub workspace_id: String,

    pub name: String,

    /// URL identity, unique within the owning workspace.
    pub slug: String,

    pub description: Option<String>,
    pub color: Option<String>,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
