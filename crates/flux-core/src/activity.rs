//! Best-effort activity recorder. Called after (never within) the
//! primary mutation's persistence step; a failed audit write is logged
//! and swallowed so it can never roll back the mutation that triggered
//! it.

use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::util::{now_ts, uuid_v4};

use entity::activity_log;

/// Typed event tag stored on each entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActivityEvent {
    WorkspaceCreated,
    WorkspaceUpdated,
    MemberJoined,
    MemberRoleChanged,
    MemberRemoved,
    BoardCreated,
    BoardUpdated,
    BoardDeleted,
    CategoryAdded,
    CategoryUpdated,
    CategoryRemoved,
    TaskCreated,
    TaskUpdated,
    TaskMoved,
    TaskArchived,
    TaskDeleted,
    TaskAssigned,
    TaskUnassigned,
    CommentAdded,
    CommentDeleted,
    AccessRequested,
    AccessApproved,
    AccessDenied,
}

impl ActivityEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WorkspaceCreated => "workspace.created",
            Self::WorkspaceUpdated => "workspace.updated",
            Self::MemberJoined => "member.joined",
            Self::MemberRoleChanged => "member.role_changed",
            Self::MemberRemoved => "member.removed",
            Self::BoardCreated => "board.created",
            Self::BoardUpdated => "board.updated",
            Self::BoardDeleted => "board.deleted",
            Self::CategoryAdded => "category.added",
            Self::CategoryUpdated => "category.updated",
            Self::CategoryRemoved => "category.removed",
            Self::TaskCreated => "task.created",
            Self::TaskUpdated => "task.updated",
            Self::TaskMoved => "task.moved",
            Self::TaskArchived => "task.archived",
            Self::TaskDeleted => "task.deleted",
            Self::TaskAssigned => "task.assigned",
            Self::TaskUnassigned => "task.unassigned",
            Self::CommentAdded => "comment.added",
            Self::CommentDeleted => "comment.deleted",
            Self::AccessRequested => "access.requested",
            Self::AccessApproved => "access.approved",
            Self::AccessDenied => "access.denied",
        }
    }
}

/// One entry to append.
#[derive(Clone, Debug)]
pub struct ActivityEntry {
    pub workspace_id: String,
    pub board_id: Option<String>,
    pub task_id: Option<String>,
    pub user_id: Option<String>,
    pub event: ActivityEvent,
    pub detail: Option<String>,
}

impl ActivityEntry {
    pub fn new(workspace_id: impl Into<String>, event: ActivityEvent) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            board_id: None,
            task_id: None,
            user_id: None,
            event,
            detail: None,
        }
    }

    pub fn board(mut self, board_id: impl Into<String>) -> Self {
        self.board_id = Some(board_id.into());
        self
    }

    pub fn task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Append one entry. Returns the new record id, or `None` when the write
/// failed (logged, swallowed).
pub async fn record(db: &DatabaseConnection, entry: ActivityEntry) -> Option<String> {
    let id = uuid_v4();
    let event = entry.event.as_str();

    let active = activity_log::ActiveModel {
        id: Set(id.clone()),
        workspace_id: Set(entry.workspace_id),
        board_id: Set(entry.board_id),
        task_id: Set(entry.task_id),
        user_id: Set(entry.user_id),
        event: Set(event.to_string()),
        detail: Set(entry.detail),
        read: Set(false),
        created_at: Set(now_ts()),
    };

    match active.insert(db).await {
        Ok(_) => Some(id),
        Err(e) => {
            tracing::warn!(event, error = %e, "activity write failed (ignored)");
            None
        }
    }
}
