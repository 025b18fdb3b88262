use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::activity::{self, ActivityEntry, ActivityEvent};
use crate::error::{conflict_on_unique, Error, Result};
use crate::identity::{require_identity, Identity};
use crate::roles::{can_perform, Action};
use crate::util::{now_ts, uuid_v4};

use entity::access_request::AccessRequestStatus;
use entity::workspace_member::Role;
use entity::{access_request, workspace_member};

use super::{ensure, find_membership, require_membership, require_workspace};

const ALREADY_PENDING: &str = "An access request is already pending";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEditAccess {
    pub workspace_id: String,
    pub message: Option<String>,
}

/// A viewer's formal ask to be promoted to editor.
pub async fn request_edit_access(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    input: RequestEditAccess,
) -> Result<access_request::Model> {
    let actor = require_identity(identity)?;
    require_workspace(db, &input.workspace_id).await?;

    let membership = require_membership(db, &input.workspace_id, &actor.user_id).await?;
    if matches!(membership.role, Role::Admin | Role::Editor) {
        return Err(Error::conflict("You already have edit access"));
    }

    let pending = access_request::Entity::find()
        .filter(access_request::Column::WorkspaceId.eq(&input.workspace_id))
        .filter(access_request::Column::UserId.eq(&actor.user_id))
        .filter(access_request::Column::Status.eq(AccessRequestStatus::Pending))
        .one(db)
        .await?;
    if pending.is_some() {
        return Err(Error::conflict(ALREADY_PENDING));
    }

    let active = access_request::ActiveModel {
        id: Set(uuid_v4()),
        workspace_id: Set(input.workspace_id.clone()),
        user_id: Set(actor.user_id.clone()),
        status: Set(AccessRequestStatus::Pending),
        message: Set(input.message),
        reviewed_by: Set(None),
        reviewed_at: Set(None),
        created_at: Set(now_ts()),
    };

    // The partial unique PENDING index turns a racing duplicate into the
    // same Conflict the pre-check produces.
    let created = active
        .insert(db)
        .await
        .map_err(|e| conflict_on_unique(e, ALREADY_PENDING))?;

    activity::record(
        db,
        ActivityEntry::new(&input.workspace_id, ActivityEvent::AccessRequested)
            .user(&actor.user_id)
            .detail(actor.name.clone()),
    )
    .await;

    Ok(created)
}

pub async fn list_access_requests(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
    status: Option<AccessRequestStatus>,
) -> Result<Vec<access_request::Model>> {
    let actor = require_identity(identity)?;
    require_workspace(db, workspace_id).await?;

    let membership = require_membership(db, workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageWorkspace),
        "Only admins can review access requests",
    )?;

    let mut query = access_request::Entity::find()
        .filter(access_request::Column::WorkspaceId.eq(workspace_id))
        .order_by_desc(access_request::Column::CreatedAt);
    if let Some(status) = status {
        query = query.filter(access_request::Column::Status.eq(status));
    }

    Ok(query.all(db).await?)
}

async fn require_reviewable(
    db: &DatabaseConnection,
    actor: &Identity,
    request_id: &str,
) -> Result<access_request::Model> {
    let request = access_request::Entity::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Access request not found"))?;

    let membership = require_membership(db, &request.workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageWorkspace),
        "Only admins can review access requests",
    )?;

    if request.status != AccessRequestStatus::Pending {
        return Err(Error::conflict("This access request has already been reviewed"));
    }

    Ok(request)
}

/// Approve a pending request: promote the requester to editor and stamp
/// the reviewer.
pub async fn approve_access_request(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    request_id: &str,
) -> Result<access_request::Model> {
    let actor = require_identity(identity)?;
    let request = require_reviewable(db, actor, request_id).await?;

    let requester = find_membership(db, &request.workspace_id, &request.user_id)
        .await?
        .ok_or_else(|| Error::not_found("The requesting user is no longer a member"))?;

    if requester.role == Role::Viewer {
        let mut active: workspace_member::ActiveModel = requester.into();
        active.role = Set(Role::Editor);
        active.update(db).await?;
    }

    let workspace_id = request.workspace_id.clone();
    let requester_id = request.user_id.clone();
    let mut active: access_request::ActiveModel = request.into();
    active.status = Set(AccessRequestStatus::Approved);
    active.reviewed_by = Set(Some(actor.user_id.clone()));
    active.reviewed_at = Set(Some(now_ts()));

    let reviewed = active.update(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&workspace_id, ActivityEvent::AccessApproved)
            .user(&actor.user_id)
            .detail(requester_id),
    )
    .await;

    Ok(reviewed)
}

pub async fn deny_access_request(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    request_id: &str,
) -> Result<access_request::Model> {
    let actor = require_identity(identity)?;
    let request = require_reviewable(db, actor, request_id).await?;

    let workspace_id = request.workspace_id.clone();
    let requester_id = request.user_id.clone();
    let mut active: access_request::ActiveModel = request.into();
    active.status = Set(AccessRequestStatus::Denied);
    active.reviewed_by = Set(Some(actor.user_id.clone()));
    active.reviewed_at = Set(Some(now_ts()));

    let reviewed = active.update(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&workspace_id, ActivityEvent::AccessDenied)
            .user(&actor.user_id)
            .detail(requester_id),
    )
    .await;

    Ok(reviewed)
}
