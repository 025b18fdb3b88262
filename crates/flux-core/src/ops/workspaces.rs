use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};

use crate::activity::{self, ActivityEntry, ActivityEvent};
use crate::error::{conflict_on_unique, Error, Result};
use crate::identity::{require_identity, sync_user, Identity};
use crate::roles::{can_perform, Action};
use crate::util::{generate_invite_code, now_ts, slugify, uuid_v4};

use entity::workspace_member::Role;
use entity::{
    access_request, activity_log, board, board_category, comment, subtask, task, task_assignee,
    user, workspace, workspace_member,
};

use super::{ensure, find_membership, require_membership, require_view_access, require_workspace};

const SLUG_TAKEN: &str = "A workspace with this slug already exists";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspace {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub public_access: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinWorkspace {
    pub invite_code: String,
}

/// Membership row joined with its user for the members panel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: Role,
    pub joined_at: i64,
}

pub async fn create_workspace(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    input: CreateWorkspace,
) -> Result<workspace::Model> {
    let actor = require_identity(identity)?;

    let name = input.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Workspace name cannot be blank"));
    }

    let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(explicit) => slugify(explicit),
        None => slugify(name),
    };
    if slug.is_empty() {
        return Err(Error::validation("Workspace slug cannot be blank"));
    }

    sync_user(db, actor).await?;

    let taken = workspace::Entity::find()
        .filter(workspace::Column::Slug.eq(&slug))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(Error::conflict(SLUG_TAKEN));
    }

    let now = now_ts();
    let workspace_id = uuid_v4();

    let ws_active = workspace::ActiveModel {
        id: Set(workspace_id.clone()),
        name: Set(name.to_string()),
        slug: Set(slug),
        owner_user_id: Set(actor.user_id.clone()),
        invite_code: Set(generate_invite_code()),
        public_access: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let ws = ws_active
        .insert(db)
        .await
        .map_err(|e| conflict_on_unique(e, SLUG_TAKEN))?;

    // The creator is the owner and always an admin.
    let member_active = workspace_member::ActiveModel {
        id: Set(uuid_v4()),
        workspace_id: Set(workspace_id.clone()),
        user_id: Set(actor.user_id.clone()),
        role: Set(Role::Admin),
        joined_at: Set(now),
    };
    member_active.insert(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&workspace_id, ActivityEvent::WorkspaceCreated)
            .user(&actor.user_id)
            .detail(ws.name.clone()),
    )
    .await;

    Ok(ws)
}

pub async fn get_workspace(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
) -> Result<workspace::Model> {
    let ws = require_workspace(db, workspace_id).await?;
    require_view_access(db, identity, &ws).await?;
    Ok(ws)
}

pub async fn get_workspace_by_slug(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    slug: &str,
) -> Result<workspace::Model> {
    let ws = workspace::Entity::find()
        .filter(workspace::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Workspace not found"))?;
    require_view_access(db, identity, &ws).await?;
    Ok(ws)
}

/// All workspaces the actor belongs to.
pub async fn list_workspaces(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
) -> Result<Vec<workspace::Model>> {
    let actor = require_identity(identity)?;

    let memberships = workspace_member::Entity::find()
        .filter(workspace_member::Column::UserId.eq(&actor.user_id))
        .all(db)
        .await?;

    let ids: Vec<String> = memberships.into_iter().map(|m| m.workspace_id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(workspace::Entity::find()
        .filter(workspace::Column::Id.is_in(ids))
        .all(db)
        .await?)
}

pub async fn update_workspace(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
    input: UpdateWorkspace,
) -> Result<workspace::Model> {
    let actor = require_identity(identity)?;
    let ws = require_workspace(db, workspace_id).await?;

    let membership = require_membership(db, workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageWorkspace),
        "Only admins can change workspace settings",
    )?;

    let mut active: workspace::ActiveModel = ws.into();

    if let Some(name) = input.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Workspace name cannot be blank"));
        }
        active.name = Set(name);
    }

    if let Some(slug) = input.slug {
        let slug = slugify(&slug);
        if slug.is_empty() {
            return Err(Error::validation("Workspace slug cannot be blank"));
        }
        let taken = workspace::Entity::find()
            .filter(workspace::Column::Slug.eq(&slug))
            .filter(workspace::Column::Id.ne(workspace_id))
            .one(db)
            .await?;
        if taken.is_some() {
            return Err(Error::conflict(SLUG_TAKEN));
        }
        active.slug = Set(slug);
    }

    if let Some(public_access) = input.public_access {
        active.public_access = Set(public_access);
    }

    active.updated_at = Set(now_ts());

    let updated = active
        .update(db)
        .await
        .map_err(|e| conflict_on_unique(e, SLUG_TAKEN))?;

    activity::record(
        db,
        ActivityEntry::new(workspace_id, ActivityEvent::WorkspaceUpdated).user(&actor.user_id),
    )
    .await;

    Ok(updated)
}

/// Invalidate the current invite code by minting a new one.
pub async fn regenerate_invite_code(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
) -> Result<workspace::Model> {
    let actor = require_identity(identity)?;
    let ws = require_workspace(db, workspace_id).await?;

    let membership = require_membership(db, workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageWorkspace),
        "Only admins can reset the invite code",
    )?;

    let mut active: workspace::ActiveModel = ws.into();
    active.invite_code = Set(generate_invite_code());
    active.updated_at = Set(now_ts());

    Ok(active.update(db).await?)
}

/// Delete a workspace and everything scoped to it: boards, categories,
/// tasks (with assignees, subtasks, comments), access requests, members,
/// and the activity trail.
pub async fn delete_workspace(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
) -> Result<()> {
    let actor = require_identity(identity)?;
    let ws = require_workspace(db, workspace_id).await?;

    let membership = require_membership(db, workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageWorkspace),
        "Only admins can delete a workspace",
    )?;

    let task_ids: Vec<String> = task::Entity::find()
        .filter(task::Column::WorkspaceId.eq(workspace_id))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    if !task_ids.is_empty() {
        comment::Entity::delete_many()
            .filter(comment::Column::TaskId.is_in(task_ids.clone()))
            .exec(db)
            .await?;
        subtask::Entity::delete_many()
            .filter(subtask::Column::TaskId.is_in(task_ids.clone()))
            .exec(db)
            .await?;
        task_assignee::Entity::delete_many()
            .filter(task_assignee::Column::TaskId.is_in(task_ids))
            .exec(db)
            .await?;
    }

    task::Entity::delete_many()
        .filter(task::Column::WorkspaceId.eq(workspace_id))
        .exec(db)
        .await?;

    let board_ids: Vec<String> = board::Entity::find()
        .filter(board::Column::WorkspaceId.eq(workspace_id))
        .all(db)
        .await?
        .into_iter()
        .map(|b| b.id)
        .collect();

    if !board_ids.is_empty() {
        board_category::Entity::delete_many()
            .filter(board_category::Column::BoardId.is_in(board_ids))
            .exec(db)
            .await?;
    }

    board::Entity::delete_many()
        .filter(board::Column::WorkspaceId.eq(workspace_id))
        .exec(db)
        .await?;

    access_request::Entity::delete_many()
        .filter(access_request::Column::WorkspaceId.eq(workspace_id))
        .exec(db)
        .await?;

    activity_log::Entity::delete_many()
        .filter(activity_log::Column::WorkspaceId.eq(workspace_id))
        .exec(db)
        .await?;

    workspace_member::Entity::delete_many()
        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
        .exec(db)
        .await?;

    workspace::Entity::delete_by_id(workspace_id).exec(db).await?;

    tracing::info!(workspace = workspace_id, slug = %ws.slug, "workspace deleted");

    Ok(())
}

/// Join via invite code; new members start as viewers.
pub async fn join_workspace(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    input: JoinWorkspace,
) -> Result<workspace_member::Model> {
    let actor = require_identity(identity)?;

    let code = input.invite_code.trim();
    if code.is_empty() {
        return Err(Error::validation("Invite code cannot be blank"));
    }

    let ws = workspace::Entity::find()
        .filter(workspace::Column::InviteCode.eq(code))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Invalid invite code"))?;

    if find_membership(db, &ws.id, &actor.user_id).await?.is_some() {
        return Err(Error::conflict("You are already a member of this workspace"));
    }

    sync_user(db, actor).await?;

    let member_active = workspace_member::ActiveModel {
        id: Set(uuid_v4()),
        workspace_id: Set(ws.id.clone()),
        user_id: Set(actor.user_id.clone()),
        role: Set(Role::Viewer),
        joined_at: Set(now_ts()),
    };

    let member = member_active
        .insert(db)
        .await
        .map_err(|e| conflict_on_unique(e, "You are already a member of this workspace"))?;

    activity::record(
        db,
        ActivityEntry::new(&ws.id, ActivityEvent::MemberJoined)
            .user(&actor.user_id)
            .detail(actor.name.clone()),
    )
    .await;

    Ok(member)
}

pub async fn list_members(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
) -> Result<Vec<MemberProfile>> {
    let actor = require_identity(identity)?;
    require_workspace(db, workspace_id).await?;
    require_membership(db, workspace_id, &actor.user_id).await?;

    let members = workspace_member::Entity::find()
        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
        .all(db)
        .await?;

    let user_ids: Vec<String> = members.iter().map(|m| m.user_id.clone()).collect();
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?;

    let profiles = members
        .into_iter()
        .filter_map(|m| {
            let u = users.iter().find(|u| u.id == m.user_id)?;
            Some(MemberProfile {
                id: m.id,
                user_id: m.user_id,
                name: u.name.clone(),
                email: u.email.clone(),
                image: u.image.clone(),
                role: m.role,
                joined_at: m.joined_at,
            })
        })
        .collect();

    Ok(profiles)
}

pub async fn update_member_role(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
    target_user_id: &str,
    role: Role,
) -> Result<workspace_member::Model> {
    let actor = require_identity(identity)?;
    let ws = require_workspace(db, workspace_id).await?;

    let membership = require_membership(db, workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageWorkspace),
        "Only admins can change member roles",
    )?;

    if target_user_id == ws.owner_user_id {
        return Err(Error::forbidden("The workspace owner's role cannot be changed"));
    }

    let target = find_membership(db, workspace_id, target_user_id)
        .await?
        .ok_or_else(|| Error::not_found("Member not found"))?;

    let mut active: workspace_member::ActiveModel = target.into();
    active.role = Set(role);
    let updated = active.update(db).await?;

    activity::record(
        db,
        ActivityEntry::new(workspace_id, ActivityEvent::MemberRoleChanged)
            .user(&actor.user_id)
            .detail(
                serde_json::json!({ "userId": target_user_id, "role": role }).to_string(),
            ),
    )
    .await;

    Ok(updated)
}

/// Remove a member (admin) or leave the workspace (self). The owner can
/// never be removed.
pub async fn remove_member(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
    target_user_id: &str,
) -> Result<()> {
    let actor = require_identity(identity)?;
    let ws = require_workspace(db, workspace_id).await?;

    let membership = require_membership(db, workspace_id, &actor.user_id).await?;
    let removing_self = actor.user_id == target_user_id;
    ensure(
        removing_self || can_perform(Some(membership.role), Action::ManageWorkspace),
        "Only admins can remove members",
    )?;

    if target_user_id == ws.owner_user_id {
        return Err(Error::forbidden("The workspace owner cannot be removed"));
    }

    let res = workspace_member::Entity::delete_many()
        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
        .filter(workspace_member::Column::UserId.eq(target_user_id))
        .exec(db)
        .await?;

    if res.rows_affected == 0 {
        return Err(Error::not_found("Member not found"));
    }

    activity::record(
        db,
        ActivityEntry::new(workspace_id, ActivityEvent::MemberRemoved)
            .user(&actor.user_id)
            .detail(target_user_id.to_string()),
    )
    .await;

    Ok(())
}
