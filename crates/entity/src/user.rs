use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Local mirror of the identity provider's user record.
///
/// Authentication happens upstream; this row only exists so members,
/// assignees, and comment authors can be joined for display and so
/// assignment notifications know where to send mail.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,

    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    pub image: Option<String>,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
