//! Client-side optimistic state for a board's visible task list.
//!
//! Single-threaded and UI-event-driven: every mutating action applies its
//! transition synchronously and returns a [`Reversal`] capturing the
//! pre-mutation snapshot, then the caller issues the asynchronous
//! authoritative write. On success an ADD swaps its temporary id for the
//! server id and UPDATE/MOVE results are left standing; on failure the
//! reversal restores the snapshot. There is no cancellation: a superseded
//! action is simply overwritten by the next one touching the same task,
//! and the caller drops the stale reversal.

use serde::{Deserialize, Serialize};

use crate::util::uuid_v4;

use entity::{TaskPriority, TaskStatus};

/// The client's view of one task card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCard {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub sort_order: f64,
    pub assignee_ids: Vec<String>,
}

/// The four optimistic transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum TaskAction {
    /// Insert a card carrying a temporary id from [`temp_id`].
    Add(TaskCard),
    /// Replace the card with the same id.
    Update(TaskCard),
    Delete { id: String },
    Move { id: String, status: TaskStatus, sort_order: f64 },
}

/// Pre-mutation snapshot needed to undo exactly one applied action.
#[derive(Clone, Debug, PartialEq)]
pub struct Reversal(ReversalKind);

#[derive(Clone, Debug, PartialEq)]
enum ReversalKind {
    RemoveAdded { id: String },
    Restore { before: TaskCard },
    Reinsert { before: TaskCard },
}

const TEMP_ID_PREFIX: &str = "tmp-";

/// Temporary id for an optimistic ADD, replaced by the server id on
/// confirmation.
pub fn temp_id() -> String {
    format!("{TEMP_ID_PREFIX}{}", uuid_v4())
}

pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Authoritative-until-confirmed task list for one board.
#[derive(Clone, Debug, Default)]
pub struct BoardState {
    tasks: Vec<TaskCard>,
}

impl BoardState {
    pub fn new(tasks: Vec<TaskCard>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[TaskCard] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&TaskCard> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Cards of one status column, sorted by their fractional order.
    pub fn column(&self, status: TaskStatus) -> Vec<&TaskCard> {
        let mut cards: Vec<&TaskCard> = self.tasks.iter().filter(|t| t.status == status).collect();
        cards.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));
        cards
    }

    /// Apply an action synchronously. Returns `None` when the target id
    /// no longer exists (the action is dropped, nothing to undo).
    pub fn apply(&mut self, action: TaskAction) -> Option<Reversal> {
        match action {
            TaskAction::Add(card) => {
                let id = card.id.clone();
                self.tasks.push(card);
                Some(Reversal(ReversalKind::RemoveAdded { id }))
            }
            TaskAction::Update(card) => {
                let slot = self.tasks.iter_mut().find(|t| t.id == card.id)?;
                let before = std::mem::replace(slot, card);
                Some(Reversal(ReversalKind::Restore { before }))
            }
            TaskAction::Delete { id } => {
                let index = self.tasks.iter().position(|t| t.id == id)?;
                let before = self.tasks.remove(index);
                Some(Reversal(ReversalKind::Reinsert { before }))
            }
            TaskAction::Move { id, status, sort_order } => {
                let slot = self.tasks.iter_mut().find(|t| t.id == id)?;
                let before = slot.clone();
                slot.status = status;
                slot.sort_order = sort_order;
                Some(Reversal(ReversalKind::Restore { before }))
            }
        }
    }

    /// Reconcile a confirmed ADD: swap the temporary id for the
    /// server-assigned one. Returns false when the card is gone (e.g.
    /// optimistically deleted in the meantime).
    pub fn confirm_add(&mut self, temp: &str, server_id: impl Into<String>) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == temp) {
            Some(card) => {
                card.id = server_id.into();
                true
            }
            None => false,
        }
    }

    /// Restore the pre-mutation snapshot after a failed server write.
    pub fn rollback(&mut self, reversal: Reversal) {
        match reversal.0 {
            ReversalKind::RemoveAdded { id } => {
                self.tasks.retain(|t| t.id != id);
            }
            ReversalKind::Restore { before } => {
                match self.tasks.iter_mut().find(|t| t.id == before.id) {
                    Some(slot) => *slot = before,
                    // Deleted by a later action; reviving the snapshot
                    // keeps the list consistent with the failed write.
                    None => self.tasks.push(before),
                }
            }
            ReversalKind::Reinsert { before } => {
                self.tasks.push(before);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, status: TaskStatus, sort_order: f64) -> TaskCard {
        TaskCard {
            id: id.to_string(),
            title: format!("task {id}"),
            description: None,
            status,
            priority: TaskPriority::Medium,
            sort_order,
            assignee_ids: Vec::new(),
        }
    }

    #[test]
    fn add_is_visible_immediately_and_confirm_swaps_ids() {
        let mut state = BoardState::default();
        let tmp = temp_id();
        assert!(is_temp_id(&tmp));

        state.apply(TaskAction::Add(card(&tmp, TaskStatus::Todo, 1000.0)));
        assert!(state.get(&tmp).is_some());

        assert!(state.confirm_add(&tmp, "srv-1"));
        assert!(state.get(&tmp).is_none());
        assert_eq!(state.get("srv-1").unwrap().sort_order, 1000.0);
    }

    #[test]
    fn failed_add_rolls_back_to_empty() {
        let mut state = BoardState::default();
        let tmp = temp_id();
        let reversal = state
            .apply(TaskAction::Add(card(&tmp, TaskStatus::Backlog, 1000.0)))
            .unwrap();

        state.rollback(reversal);
        assert!(state.tasks().is_empty());
    }

    #[test]
    fn failed_update_restores_the_snapshot() {
        let mut state = BoardState::new(vec![card("a", TaskStatus::Todo, 1000.0)]);

        let mut edited = state.get("a").unwrap().clone();
        edited.title = "renamed".to_string();
        let reversal = state.apply(TaskAction::Update(edited)).unwrap();
        assert_eq!(state.get("a").unwrap().title, "renamed");

        state.rollback(reversal);
        assert_eq!(state.get("a").unwrap().title, "task a");
    }

    #[test]
    fn failed_move_restores_status_and_order() {
        let mut state = BoardState::new(vec![card("a", TaskStatus::Backlog, 1000.0)]);

        let reversal = state
            .apply(TaskAction::Move {
                id: "a".to_string(),
                status: TaskStatus::Done,
                sort_order: 500.0,
            })
            .unwrap();
        assert_eq!(state.get("a").unwrap().status, TaskStatus::Done);

        state.rollback(reversal);
        let restored = state.get("a").unwrap();
        assert_eq!(restored.status, TaskStatus::Backlog);
        assert_eq!(restored.sort_order, 1000.0);
    }

    #[test]
    fn failed_delete_reinserts_the_card() {
        let mut state = BoardState::new(vec![
            card("a", TaskStatus::Todo, 1000.0),
            card("b", TaskStatus::Todo, 2000.0),
        ]);

        let reversal = state.apply(TaskAction::Delete { id: "a".to_string() }).unwrap();
        assert!(state.get("a").is_none());

        state.rollback(reversal);
        assert!(state.get("a").is_some());
        assert_eq!(state.tasks().len(), 2);
    }

    #[test]
    fn actions_on_missing_ids_are_dropped() {
        let mut state = BoardState::default();
        assert!(state
            .apply(TaskAction::Delete { id: "ghost".to_string() })
            .is_none());
        assert!(state
            .apply(TaskAction::Move {
                id: "ghost".to_string(),
                status: TaskStatus::Done,
                sort_order: 1.0,
            })
            .is_none());
    }

    #[test]
    fn superseding_action_overwrites_and_its_reversal_wins() {
        let mut state = BoardState::new(vec![card("a", TaskStatus::Todo, 1000.0)]);

        let mut first = state.get("a").unwrap().clone();
        first.title = "first edit".to_string();
        let _stale = state.apply(TaskAction::Update(first)).unwrap();

        let mut second = state.get("a").unwrap().clone();
        second.title = "second edit".to_string();
        let reversal = state.apply(TaskAction::Update(second)).unwrap();

        // Rolling back only the failed, superseding action returns to the
        // first edit, which the server already accepted.
        state.rollback(reversal);
        assert_eq!(state.get("a").unwrap().title, "first edit");
    }

    #[test]
    fn column_sorts_by_fractional_order() {
        let state = BoardState::new(vec![
            card("c", TaskStatus::Todo, 1500.0),
            card("a", TaskStatus::Todo, 500.0),
            card("b", TaskStatus::Done, 1000.0),
        ]);

        let todo: Vec<&str> = state
            .column(TaskStatus::Todo)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(todo, vec!["a", "c"]);
    }
}
