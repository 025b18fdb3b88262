use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::error::Result;
use crate::identity::{require_identity, Identity};

use entity::activity_log;

const DEFAULT_FEED_LIMIT: u64 = 50;

/// Workspace activity feed, newest first. Members only.
pub async fn list_activity(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
    limit: Option<u64>,
) -> Result<Vec<activity_log::Model>> {
    let actor = require_identity(identity)?;
    super::require_workspace(db, workspace_id).await?;
    super::require_membership(db, workspace_id, &actor.user_id).await?;

    Ok(activity_log::Entity::find()
        .filter(activity_log::Column::WorkspaceId.eq(workspace_id))
        .order_by_desc(activity_log::Column::CreatedAt)
        .limit(limit.unwrap_or(DEFAULT_FEED_LIMIT))
        .all(db)
        .await?)
}

/// Flip the `read` flag on every unread entry; the only mutation the
/// audit trail permits. Returns the number of entries touched.
pub async fn mark_all_read(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
) -> Result<u64> {
    let actor = require_identity(identity)?;
    super::require_workspace(db, workspace_id).await?;
    super::require_membership(db, workspace_id, &actor.user_id).await?;

    let res = activity_log::Entity::update_many()
        .col_expr(activity_log::Column::Read, Expr::value(true))
        .filter(activity_log::Column::WorkspaceId.eq(workspace_id))
        .filter(activity_log::Column::Read.eq(false))
        .exec(db)
        .await?;

    Ok(res.rows_affected)
}
