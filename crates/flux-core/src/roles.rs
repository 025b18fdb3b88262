use entity::workspace_member::Role;

/// A requested operation, carrying whatever context its policy row needs:
/// assignee-ness for task edits, authorship for comment deletion, the
/// workspace's public flag for guest viewing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    ViewBoard { workspace_public: bool },
    /// Create/update a board or manage its categories.
    ManageBoard,
    DeleteBoard,
    CreateTask,
    DeleteTask,
    /// Update or move a task.
    EditTask { assignee: bool },
    Comment,
    DeleteComment { author: bool },
    /// Invite/remove members, change roles, review access requests,
    /// change workspace settings, delete the workspace.
    ManageWorkspace,
}

/// The role gate: a pure policy-table lookup, evaluated before every
/// mutation. `None` is a non-member (possibly a guest on a public
/// workspace).
pub fn can_perform(role: Option<Role>, action: Action) -> bool {
    use Role::{Admin, Editor, Viewer};

    match action {
        Action::ViewBoard { workspace_public } => role.is_some() || workspace_public,
        Action::ManageBoard | Action::CreateTask | Action::DeleteTask => {
            matches!(role, Some(Admin | Editor))
        }
        Action::DeleteBoard | Action::ManageWorkspace => matches!(role, Some(Admin)),
        Action::EditTask { assignee } => match role {
            Some(Admin | Editor) => true,
            Some(Viewer) => assignee,
            None => false,
        },
        Action::Comment => role.is_some(),
        Action::DeleteComment { author } => match role {
            Some(Admin) => true,
            Some(Editor | Viewer) => author,
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Option<Role>; 4] = [
        Some(Role::Admin),
        Some(Role::Editor),
        Some(Role::Viewer),
        None,
    ];

    fn allowed_roles(action: Action) -> Vec<Option<Role>> {
        ALL_ROLES
            .into_iter()
            .filter(|r| can_perform(*r, action))
            .collect()
    }

    #[test]
    fn viewing_requires_membership_unless_public() {
        assert_eq!(
            allowed_roles(Action::ViewBoard { workspace_public: false }),
            vec![Some(Role::Admin), Some(Role::Editor), Some(Role::Viewer)]
        );
        assert_eq!(
            allowed_roles(Action::ViewBoard { workspace_public: true }),
            ALL_ROLES.to_vec()
        );
    }

    #[test]
    fn board_and_task_management_needs_editor() {
        for action in [Action::ManageBoard, Action::CreateTask, Action::DeleteTask] {
            assert_eq!(
                allowed_roles(action),
                vec![Some(Role::Admin), Some(Role::Editor)]
            );
        }
    }

    #[test]
    fn board_deletion_is_admin_only() {
        assert_eq!(allowed_roles(Action::DeleteBoard), vec![Some(Role::Admin)]);
    }

    #[test]
    fn viewers_edit_tasks_only_as_assignees() {
        assert!(!can_perform(Some(Role::Viewer), Action::EditTask { assignee: false }));
        assert!(can_perform(Some(Role::Viewer), Action::EditTask { assignee: true }));
        assert!(can_perform(Some(Role::Editor), Action::EditTask { assignee: false }));
        assert!(!can_perform(None, Action::EditTask { assignee: true }));
    }

    #[test]
    fn any_member_comments_but_guests_do_not() {
        assert_eq!(
            allowed_roles(Action::Comment),
            vec![Some(Role::Admin), Some(Role::Editor), Some(Role::Viewer)]
        );
    }

    #[test]
    fn comment_deletion_requires_admin_or_authorship() {
        assert!(can_perform(Some(Role::Admin), Action::DeleteComment { author: false }));
        assert!(!can_perform(Some(Role::Editor), Action::DeleteComment { author: false }));
        assert!(can_perform(Some(Role::Editor), Action::DeleteComment { author: true }));
        assert!(can_perform(Some(Role::Viewer), Action::DeleteComment { author: true }));
        assert!(!can_perform(None, Action::DeleteComment { author: true }));
    }

    #[test]
    fn workspace_administration_is_admin_only() {
        assert_eq!(allowed_roles(Action::ManageWorkspace), vec![Some(Role::Admin)]);
    }
}
