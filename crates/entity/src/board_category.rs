use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Board-local category (label taxonomy). Tasks reference these by id;
/// the link is enforced in application code, not by a foreign key.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "board_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,

    pub board_id: String,

    pub name: String,
    pub color: String,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
