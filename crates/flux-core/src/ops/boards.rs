use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::sea_query::Expr;
use serde::Deserialize;

use crate::activity::{self, ActivityEntry, ActivityEvent};
use crate::error::{conflict_on_unique, Error, Result};
use crate::identity::{require_identity, Identity};
use crate::roles::{can_perform, Action};
use crate::util::{now_ts, slugify, uuid_v4};

use entity::{board, board_category, comment, subtask, task, task_assignee};

use super::{
    ensure, require_board, require_membership, require_view_access, require_workspace,
};

const SLUG_TAKEN: &str = "A board with this slug already exists in this workspace";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoard {
    pub workspace_id: String,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoard {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCategory {
    pub board_id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub color: Option<String>,
}

async fn slug_taken(
    db: &DatabaseConnection,
    workspace_id: &str,
    slug: &str,
    exclude_board: Option<&str>,
) -> Result<bool> {
    let mut query = board::Entity::find()
        .filter(board::Column::WorkspaceId.eq(workspace_id))
        .filter(board::Column::Slug.eq(slug));
    if let Some(id) = exclude_board {
        query = query.filter(board::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

pub async fn create_board(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    input: CreateBoard,
) -> Result<board::Model> {
    let actor = require_identity(identity)?;
    require_workspace(db, &input.workspace_id).await?;

    let membership = require_membership(db, &input.workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageBoard),
        "You do not have permission to create boards",
    )?;

    let name = input.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Board name cannot be blank"));
    }

    let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(explicit) => slugify(explicit),
        None => slugify(name),
    };
    if slug.is_empty() {
        return Err(Error::validation("Board slug cannot be blank"));
    }

    if slug_taken(db, &input.workspace_id, &slug, None).await? {
        return Err(Error::conflict(SLUG_TAKEN));
    }

    let now = now_ts();
    let active = board::ActiveModel {
        id: Set(uuid_v4()),
        workspace_id: Set(input.workspace_id.clone()),
        name: Set(name.to_string()),
        slug: Set(slug),
        description: Set(input.description),
        color: Set(input.color),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = active
        .insert(db)
        .await
        .map_err(|e| conflict_on_unique(e, SLUG_TAKEN))?;

    activity::record(
        db,
        ActivityEntry::new(&input.workspace_id, ActivityEvent::BoardCreated)
            .board(&created.id)
            .user(&actor.user_id)
            .detail(created.name.clone()),
    )
    .await;

    Ok(created)
}

pub async fn list_boards(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    workspace_id: &str,
) -> Result<Vec<board::Model>> {
    let ws = require_workspace(db, workspace_id).await?;
    require_view_access(db, identity, &ws).await?;

    Ok(board::Entity::find()
        .filter(board::Column::WorkspaceId.eq(workspace_id))
        .order_by_asc(board::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn get_board(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    board_id: &str,
) -> Result<board::Model> {
    let b = require_board(db, board_id).await?;
    let ws = require_workspace(db, &b.workspace_id).await?;
    require_view_access(db, identity, &ws).await?;
    Ok(b)
}

pub async fn update_board(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    board_id: &str,
    input: UpdateBoard,
) -> Result<board::Model> {
    let actor = require_identity(identity)?;
    let b = require_board(db, board_id).await?;

    let membership = require_membership(db, &b.workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageBoard),
        "You do not have permission to update this board",
    )?;

    let workspace_id = b.workspace_id.clone();
    let mut active: board::ActiveModel = b.into();

    if let Some(name) = input.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Board name cannot be blank"));
        }
        active.name = Set(name);
    }

    if let Some(slug) = input.slug {
        let slug = slugify(&slug);
        if slug.is_empty() {
            return Err(Error::validation("Board slug cannot be blank"));
        }
        if slug_taken(db, &workspace_id, &slug, Some(board_id)).await? {
            return Err(Error::conflict(SLUG_TAKEN));
        }
        active.slug = Set(slug);
    }

    if let Some(description) = input.description {
        active.description = Set(Some(description));
    }
    if let Some(color) = input.color {
        active.color = Set(Some(color));
    }

    active.updated_at = Set(now_ts());

    let updated = active
        .update(db)
        .await
        .map_err(|e| conflict_on_unique(e, SLUG_TAKEN))?;

    activity::record(
        db,
        ActivityEntry::new(&workspace_id, ActivityEvent::BoardUpdated)
            .board(board_id)
            .user(&actor.user_id)
            .detail(updated.name.clone()),
    )
    .await;

    Ok(updated)
}

/// Delete a board along with its tasks, their embedded records, and its
/// categories. Admin only.
pub async fn delete_board(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    board_id: &str,
) -> Result<()> {
    let actor = require_identity(identity)?;
    let b = require_board(db, board_id).await?;

    let membership = require_membership(db, &b.workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::DeleteBoard),
        "Only admins can delete boards",
    )?;

    let task_ids: Vec<String> = task::Entity::find()
        .filter(task::Column::BoardId.eq(board_id))
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
        .filter(task::Column::BoardId.eq(board_id))
        .exec(db)
        .await?;

    board_category::Entity::delete_many()
        .filter(board_category::Column::BoardId.eq(board_id))
        .exec(db)
        .await?;

    board::Entity::delete_by_id(board_id).exec(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&b.workspace_id, ActivityEvent::BoardDeleted)
            .user(&actor.user_id)
            .detail(b.name.clone()),
    )
    .await;

    Ok(())
}

pub async fn list_categories(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    board_id: &str,
) -> Result<Vec<board_category::Model>> {
    let b = require_board(db, board_id).await?;
    let ws = require_workspace(db, &b.workspace_id).await?;
    require_view_access(db, identity, &ws).await?;

    Ok(board_category::Entity::find()
        .filter(board_category::Column::BoardId.eq(board_id))
        .order_by_asc(board_category::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn add_category(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    input: AddCategory,
) -> Result<board_category::Model> {
    let actor = require_identity(identity)?;
    let b = require_board(db, &input.board_id).await?;

    let membership = require_membership(db, &b.workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageBoard),
        "You do not have permission to manage categories",
    )?;

    let name = input.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Category name cannot be blank"));
    }

    let active = board_category::ActiveModel {
        id: Set(uuid_v4()),
        board_id: Set(input.board_id.clone()),
        name: Set(name.to_string()),
        color: Set(input.color),
        created_at: Set(now_ts()),
    };

    let created = active.insert(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&b.workspace_id, ActivityEvent::CategoryAdded)
            .board(&input.board_id)
            .user(&actor.user_id)
            .detail(created.name.clone()),
    )
    .await;

    Ok(created)
}

/// Targeted single-row update; concurrent edits to sibling categories
/// never clobber each other.
pub async fn update_category(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    category_id: &str,
    input: UpdateCategory,
) -> Result<board_category::Model> {
    let actor = require_identity(identity)?;

    let category = board_category::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Category not found"))?;
    let b = require_board(db, &category.board_id).await?;

    let membership = require_membership(db, &b.workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageBoard),
        "You do not have permission to manage categories",
    )?;

    let mut active: board_category::ActiveModel = category.into();

    if let Some(name) = input.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Category name cannot be blank"));
        }
        active.name = Set(name);
    }
    if let Some(color) = input.color {
        active.color = Set(color);
    }

    let updated = active.update(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&b.workspace_id, ActivityEvent::CategoryUpdated)
            .board(&b.id)
            .user(&actor.user_id)
            .detail(updated.name.clone()),
    )
    .await;

    Ok(updated)
}

/// Remove a category and detach the tasks that referenced it.
pub async fn remove_category(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    category_id: &str,
) -> Result<()> {
    let actor = require_identity(identity)?;

    let category = board_category::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Category not found"))?;
    let b = require_board(db, &category.board_id).await?;

    let membership = require_membership(db, &b.workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::ManageBoard),
        "You do not have permission to manage categories",
    )?;

    // The task->category link is application-enforced, so clear it here.
    task::Entity::update_many()
        .col_expr(task::Column::CategoryId, Expr::value(Option::<String>::None))
        .filter(task::Column::CategoryId.eq(category_id))
        .exec(db)
        .await?;

    board_category::Entity::delete_by_id(category_id).exec(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&b.workspace_id, ActivityEvent::CategoryRemoved)
            .board(&b.id)
            .user(&actor.user_id)
            .detail(category.name.clone()),
    )
    .await;

    Ok(())
}
