use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::activity::{self, ActivityEntry, ActivityEvent};
use crate::error::{conflict_on_unique, Error, Result};
use crate::identity::{require_identity, Identity};
use crate::mailer::{Mailer, Recipient};
use crate::ordering::{append_order, compute_order, needs_rebalance, rebalanced_orders};
use crate::roles::{can_perform, Action};
use crate::util::{now_ts, uuid_v4};

use entity::task::TaskStatus;
use entity::{board_category, comment, subtask, task, task_assignee, user, workspace_member};

use super::{
    ensure, find_membership, require_board, require_membership, require_task,
    require_view_access, require_workspace,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub board_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<entity::TaskPriority>,
    pub category_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<entity::TaskPriority>,
    /// `Some(None)` detaches the task from its category.
    pub category_id: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTask {
    pub status: TaskStatus,
    /// Position within the destination column after the move.
    pub target_index: usize,
}

/// Task joined with its embedded records for the card detail view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: task::Model,
    pub assignees: Vec<task_assignee::Model>,
    pub subtasks: Vec<subtask::Model>,
    pub comments: Vec<comment::Model>,
}

async fn is_assignee(db: &DatabaseConnection, task_id: &str, user_id: &str) -> Result<bool> {
    Ok(task_assignee::Entity::find()
        .filter(task_assignee::Column::TaskId.eq(task_id))
        .filter(task_assignee::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .is_some())
}

/// Edit gate for update/move: admins and editors always, viewers only on
/// tasks they are assigned to.
async fn require_edit_access(
    db: &DatabaseConnection,
    t: &task::Model,
    actor: &Identity,
    denial: &str,
) -> Result<workspace_member::Model> {
    let membership = require_membership(db, &t.workspace_id, &actor.user_id).await?;
    let assignee = is_assignee(db, &t.id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::EditTask { assignee }),
        denial,
    )?;
    Ok(membership)
}

async fn require_category_on_board(
    db: &DatabaseConnection,
    board_id: &str,
    category_id: &str,
) -> Result<()> {
    let category = board_category::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Category not found"))?;
    if category.board_id != board_id {
        return Err(Error::validation("Category does not belong to this board"));
    }
    Ok(())
}

/// Orders of one (board, status) column, ascending, excluding `skip_task`.
async fn column_tasks(
    db: &DatabaseConnection,
    board_id: &str,
    status: TaskStatus,
    skip_task: Option<&str>,
) -> Result<Vec<task::Model>> {
    let mut query = task::Entity::find()
        .filter(task::Column::BoardId.eq(board_id))
        .filter(task::Column::Status.eq(status))
        .order_by_asc(task::Column::SortOrder);
    if let Some(id) = skip_task {
        query = query.filter(task::Column::Id.ne(id));
    }
    Ok(query.all(db).await?)
}

pub async fn create_task(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    input: CreateTask,
) -> Result<task::Model> {
    let actor = require_identity(identity)?;
    let b = require_board(db, &input.board_id).await?;

    let membership = require_membership(db, &b.workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::CreateTask),
        "You do not have permission to create tasks",
    )?;

    let title = input.title.trim();
    if title.is_empty() {
        return Err(Error::validation("Task title cannot be blank"));
    }

    if let Some(category_id) = input.category_id.as_deref() {
        require_category_on_board(db, &b.id, category_id).await?;
    }

    let status = input.status.unwrap_or(TaskStatus::Backlog);
    let column = column_tasks(db, &b.id, status, None).await?;
    let orders: Vec<f64> = column.iter().map(|t| t.sort_order).collect();

    let now = now_ts();
    let active = task::ActiveModel {
        id: Set(uuid_v4()),
        workspace_id: Set(b.workspace_id.clone()),
        board_id: Set(b.id.clone()),
        title: Set(title.to_string()),
        description: Set(input.description),
        status: Set(status),
        priority: Set(input.priority.unwrap_or(entity::TaskPriority::Medium)),
        category_id: Set(input.category_id),
        sort_order: Set(append_order(&orders)),
        created_by: Set(actor.user_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = active.insert(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&b.workspace_id, ActivityEvent::TaskCreated)
            .board(&b.id)
            .task(&created.id)
            .user(&actor.user_id)
            .detail(created.title.clone()),
    )
    .await;

    Ok(created)
}

/// Board tasks grouped by column order. Archived tasks are only included
/// on request.
pub async fn list_tasks(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    board_id: &str,
    include_archived: bool,
) -> Result<Vec<task::Model>> {
    let b = require_board(db, board_id).await?;
    let ws = require_workspace(db, &b.workspace_id).await?;
    require_view_access(db, identity, &ws).await?;

    let mut query = task::Entity::find()
        .filter(task::Column::BoardId.eq(board_id))
        .order_by_asc(task::Column::Status)
        .order_by_asc(task::Column::SortOrder);
    if !include_archived {
        query = query.filter(task::Column::Status.ne(TaskStatus::Archived));
    }

    Ok(query.all(db).await?)
}

pub async fn get_task(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    task_id: &str,
) -> Result<TaskDetail> {
    let t = require_task(db, task_id).await?;
    let ws = require_workspace(db, &t.workspace_id).await?;
    require_view_access(db, identity, &ws).await?;

    let assignees = task_assignee::Entity::find()
        .filter(task_assignee::Column::TaskId.eq(task_id))
        .all(db)
        .await?;
    let subtasks = subtask::Entity::find()
        .filter(subtask::Column::TaskId.eq(task_id))
        .order_by_asc(subtask::Column::CreatedAt)
        .all(db)
        .await?;
    let comments = comment::Entity::find()
        .filter(comment::Column::TaskId.eq(task_id))
        .order_by_asc(comment::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(TaskDetail {
        task: t,
        assignees,
        subtasks,
        comments,
    })
}

pub async fn update_task(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    task_id: &str,
    input: UpdateTask,
) -> Result<task::Model> {
    let actor = require_identity(identity)?;
    let t = require_task(db, task_id).await?;
    require_edit_access(db, &t, actor, "You do not have permission to update this task").await?;

    if let Some(Some(category_id)) = input.category_id.as_ref() {
        require_category_on_board(db, &t.board_id, category_id).await?;
    }

    let workspace_id = t.workspace_id.clone();
    let board_id = t.board_id.clone();
    let mut active: task::ActiveModel = t.into();

    if let Some(title) = input.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(Error::validation("Task title cannot be blank"));
        }
        active.title = Set(title);
    }
    if let Some(description) = input.description {
        active.description = Set(Some(description));
    }
    if let Some(priority) = input.priority {
        active.priority = Set(priority);
    }
    if let Some(category_id) = input.category_id {
        active.category_id = Set(category_id);
    }

    active.updated_at = Set(now_ts());
    let updated = active.update(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&workspace_id, ActivityEvent::TaskUpdated)
            .board(&board_id)
            .task(task_id)
            .user(&actor.user_id)
            .detail(updated.title.clone()),
    )
    .await;

    Ok(updated)
}

/// Move a task to `target_index` of the `status` column, assigning the
/// fractional midpoint order. When the destination gap has collapsed
/// below the minimum, the column is renumbered first.
pub async fn move_task(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    task_id: &str,
    input: MoveTask,
) -> Result<task::Model> {
    let actor = require_identity(identity)?;
    let t = require_task(db, task_id).await?;
    require_edit_access(db, &t, actor, "You do not have permission to move this task").await?;

    let column = column_tasks(db, &t.board_id, input.status, Some(task_id)).await?;
    let mut orders: Vec<f64> = column.iter().map(|c| c.sort_order).collect();

    if needs_rebalance(&orders, input.target_index) {
        orders.clear();
        for (neighbor, fresh) in column.iter().zip(rebalanced_orders(column.len())) {
            let mut active: task::ActiveModel = neighbor.clone().into();
            active.sort_order = Set(fresh);
            active.update(db).await?;
            orders.push(fresh);
        }
    }

    let sort_order = compute_order(&orders, input.target_index);

    let workspace_id = t.workspace_id.clone();
    let board_id = t.board_id.clone();
    let mut active: task::ActiveModel = t.into();
    active.status = Set(input.status);
    active.sort_order = Set(sort_order);
    active.updated_at = Set(now_ts());

    let moved = active.update(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&workspace_id, ActivityEvent::TaskMoved)
            .board(&board_id)
            .task(task_id)
            .user(&actor.user_id)
            .detail(
                serde_json::json!({
                    "status": moved.status,
                    "sortOrder": moved.sort_order,
                })
                .to_string(),
            ),
    )
    .await;

    Ok(moved)
}

/// Soft-archive: the task keeps its history and can be moved back out of
/// the ARCHIVED column later.
pub async fn archive_task(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    task_id: &str,
) -> Result<task::Model> {
    let actor = require_identity(identity)?;
    let t = require_task(db, task_id).await?;
    require_edit_access(db, &t, actor, "You do not have permission to archive this task").await?;

    if t.status == TaskStatus::Archived {
        return Ok(t);
    }

    let column = column_tasks(db, &t.board_id, TaskStatus::Archived, Some(task_id)).await?;
    let orders: Vec<f64> = column.iter().map(|c| c.sort_order).collect();

    let workspace_id = t.workspace_id.clone();
    let board_id = t.board_id.clone();
    let mut active: task::ActiveModel = t.into();
    active.status = Set(TaskStatus::Archived);
    active.sort_order = Set(append_order(&orders));
    active.updated_at = Set(now_ts());

    let archived = active.update(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&workspace_id, ActivityEvent::TaskArchived)
            .board(&board_id)
            .task(task_id)
            .user(&actor.user_id)
            .detail(archived.title.clone()),
    )
    .await;

    Ok(archived)
}

pub async fn delete_task(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    task_id: &str,
) -> Result<()> {
    let actor = require_identity(identity)?;
    let t = require_task(db, task_id).await?;

    let membership = require_membership(db, &t.workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::DeleteTask),
        "You do not have permission to delete tasks",
    )?;

    comment::Entity::delete_many()
        .filter(comment::Column::TaskId.eq(task_id))
        .exec(db)
        .await?;
    subtask::Entity::delete_many()
        .filter(subtask::Column::TaskId.eq(task_id))
        .exec(db)
        .await?;
    task_assignee::Entity::delete_many()
        .filter(task_assignee::Column::TaskId.eq(task_id))
        .exec(db)
        .await?;
    task::Entity::delete_by_id(task_id).exec(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&t.workspace_id, ActivityEvent::TaskDeleted)
            .board(&t.board_id)
            .user(&actor.user_id)
            .detail(t.title.clone()),
    )
    .await;

    Ok(())
}

/// Assign a workspace member to a task and fire the notification email.
pub async fn assign_user(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    task_id: &str,
    user_id: &str,
    mailer: Option<&Mailer>,
) -> Result<task_assignee::Model> {
    let actor = require_identity(identity)?;
    let t = require_task(db, task_id).await?;
    require_edit_access(db, &t, actor, "You do not have permission to update this task").await?;

    if find_membership(db, &t.workspace_id, user_id).await?.is_none() {
        return Err(Error::validation("User is not a member of this workspace"));
    }

    if is_assignee(db, task_id, user_id).await? {
        return Err(Error::conflict("User is already assigned to this task"));
    }

    let active = task_assignee::ActiveModel {
        id: Set(uuid_v4()),
        task_id: Set(task_id.to_string()),
        user_id: Set(user_id.to_string()),
        assigned_at: Set(now_ts()),
    };

    let assignment = active
        .insert(db)
        .await
        .map_err(|e| conflict_on_unique(e, "User is already assigned to this task"))?;

    if let Some(mailer) = mailer {
        let b = require_board(db, &t.board_id).await?;
        let ws = require_workspace(db, &t.workspace_id).await?;
        if let Some(assignee) = user::Entity::find_by_id(user_id).one(db).await? {
            mailer.notify_assignment(
                Recipient {
                    email: assignee.email,
                    name: Some(assignee.name),
                },
                &t.title,
                &b.name,
                &ws.name,
            );
        }
    }

    activity::record(
        db,
        ActivityEntry::new(&t.workspace_id, ActivityEvent::TaskAssigned)
            .board(&t.board_id)
            .task(task_id)
            .user(&actor.user_id)
            .detail(user_id.to_string()),
    )
    .await;

    Ok(assignment)
}

pub async fn unassign_user(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    task_id: &str,
    user_id: &str,
) -> Result<()> {
    let actor = require_identity(identity)?;
    let t = require_task(db, task_id).await?;
    require_edit_access(db, &t, actor, "You do not have permission to update this task").await?;

    let res = task_assignee::Entity::delete_many()
        .filter(task_assignee::Column::TaskId.eq(task_id))
        .filter(task_assignee::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if res.rows_affected == 0 {
        return Err(Error::not_found("Assignment not found"));
    }

    activity::record(
        db,
        ActivityEntry::new(&t.workspace_id, ActivityEvent::TaskUnassigned)
            .board(&t.board_id)
            .task(task_id)
            .user(&actor.user_id)
            .detail(user_id.to_string()),
    )
    .await;

    Ok(())
}

pub async fn add_subtask(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    task_id: &str,
    title: &str,
) -> Result<subtask::Model> {
    let actor = require_identity(identity)?;
    let t = require_task(db, task_id).await?;
    require_edit_access(db, &t, actor, "You do not have permission to update this task").await?;

    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("Subtask title cannot be blank"));
    }

    let active = subtask::ActiveModel {
        id: Set(uuid_v4()),
        task_id: Set(task_id.to_string()),
        title: Set(title.to_string()),
        completed: Set(false),
        created_at: Set(now_ts()),
    };

    Ok(active.insert(db).await?)
}

pub async fn set_subtask_completed(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    subtask_id: &str,
    completed: bool,
) -> Result<subtask::Model> {
    let actor = require_identity(identity)?;

    let st = subtask::Entity::find_by_id(subtask_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Subtask not found"))?;
    let t = require_task(db, &st.task_id).await?;
    require_edit_access(db, &t, actor, "You do not have permission to update this task").await?;

    let mut active: subtask::ActiveModel = st.into();
    active.completed = Set(completed);
    Ok(active.update(db).await?)
}

pub async fn remove_subtask(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    subtask_id: &str,
) -> Result<()> {
    let actor = require_identity(identity)?;

    let st = subtask::Entity::find_by_id(subtask_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Subtask not found"))?;
    let t = require_task(db, &st.task_id).await?;
    require_edit_access(db, &t, actor, "You do not have permission to update this task").await?;

    subtask::Entity::delete_by_id(subtask_id).exec(db).await?;
    Ok(())
}

/// Any member may comment, viewers included.
pub async fn add_comment(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    task_id: &str,
    content: &str,
) -> Result<comment::Model> {
    let actor = require_identity(identity)?;
    let t = require_task(db, task_id).await?;

    let membership = require_membership(db, &t.workspace_id, &actor.user_id).await?;
    ensure(
        can_perform(Some(membership.role), Action::Comment),
        "You do not have permission to comment",
    )?;

    let content = content.trim();
    if content.is_empty() {
        return Err(Error::validation("Comment cannot be blank"));
    }

    let active = comment::ActiveModel {
        id: Set(uuid_v4()),
        task_id: Set(task_id.to_string()),
        author_user_id: Set(actor.user_id.clone()),
        content: Set(content.to_string()),
        created_at: Set(now_ts()),
    };

    let created = active.insert(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&t.workspace_id, ActivityEvent::CommentAdded)
            .board(&t.board_id)
            .task(task_id)
            .user(&actor.user_id),
    )
    .await;

    Ok(created)
}

/// Admins delete any comment; everyone else only their own.
pub async fn delete_comment(
    db: &DatabaseConnection,
    identity: Option<&Identity>,
    comment_id: &str,
) -> Result<()> {
    let actor = require_identity(identity)?;

    let c = comment::Entity::find_by_id(comment_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Comment not found"))?;
    let t = require_task(db, &c.task_id).await?;

    let membership = require_membership(db, &t.workspace_id, &actor.user_id).await?;
    let author = c.author_user_id == actor.user_id;
    ensure(
        can_perform(Some(membership.role), Action::DeleteComment { author }),
        "You do not have permission to delete this comment",
    )?;

    comment::Entity::delete_by_id(comment_id).exec(db).await?;

    activity::record(
        db,
        ActivityEntry::new(&t.workspace_id, ActivityEvent::CommentDeleted)
            .board(&t.board_id)
            .task(&t.id)
            .user(&actor.user_id),
    )
    .await;

    Ok(())
}
