//! Mutation and query operations, one module per resource area. Every
//! mutating operation authenticates, authorizes through the role gate,
//! performs its mutation, then best-effort records an activity entry.

pub mod access_requests;
pub mod activity;
pub mod boards;
pub mod tasks;
pub mod workspaces;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::roles::{self, Action};

use entity::{board, task, workspace, workspace_member};

pub(crate) async fn require_workspace(
    db: &DatabaseConnection,
    workspace_id: &str,
) -> Result<workspace::Model> {
    workspace::Entity::find_by_id(workspace_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Workspace not found"))
}

pub(crate) async fn require_board(db: &DatabaseConnection, board_id: &str) -> Result<board::Model> {
    board::Entity::find_by_id(board_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Board not found"))
}

pub(crate) async fn require_task(db: &DatabaseConnection, task_id: &str) -> Result<task::Model> {
    task::Entity::find_by_id(task_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Task not found"))
}

pub(crate) async fn find_membership(
    db: &DatabaseConnection,
    workspace_id: &str,
    user_id: &str,
) -> Result<Option<workspace_member::Model>> {
    Ok(workspace_member::Entity::find()
        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
        .filter(workspace_member::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

pub(crate) async fn require_membership(
    db: &DatabaseConnection,
    workspace_id: &str,
    user_id: &str,
) -> Result<workspace_member::Model> {
    find_membership(db, workspace_id, user_id)
        .await?
        .ok_or_else(|| Error::forbidden("You are not a member of this workspace"))
}

pub(crate) fn ensure(allowed: bool, message: &str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(Error::forbidden(message))
    }
}

/// Read gate shared by every query: members always see the workspace,
/// guests only when it is public, and a missing session on a private
/// workspace is Unauthorized rather than Forbidden.
pub(crate) async fn require_view_access(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace: &workspace::Model,
) -> Result<Option<workspace_member::Model>> {
    let membership = match identity {
        Some(actor) => find_membership(db, &workspace.id, &actor.user_id).await?,
        None => None,
    };

    let role = membership.as_ref().map(|m| m.role);
    let allowed = roles::can_perform(
        role,
        Action::ViewBoard {
            workspace_public: workspace.public_access,
        },
    );

    if allowed {
        Ok(membership)
    } else if identity.is_none() {
        Err(Error::Unauthorized)
    } else {
        Err(Error::forbidden("You do not have access to this workspace"))
    }
}
