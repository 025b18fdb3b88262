//! Fractional positioning for tasks within one (board, status) column.
//!
//! A move assigns the midpoint of the destination neighbors instead of
//! renumbering the column: O(1) per move. Repeated insertion at one spot
//! halves the available gap each time, so callers renumber the column
//! once the gap collapses below [`MIN_ORDER_GAP`].

/// Gap between consecutive orders after a renumbering, and the step used
/// when appending.
pub const ORDER_STEP: f64 = 1000.0;

/// Below this neighbor gap a midpoint is no longer trustworthy and the
/// column must be renumbered before inserting.
pub const MIN_ORDER_GAP: f64 = 1e-4;

/// Order for a task *created* in a column: append after the current tail.
pub fn append_order(column: &[f64]) -> f64 {
    match column.last() {
        Some(last) => last + ORDER_STEP,
        None => ORDER_STEP,
    }
}

/// Order for a task *moved* to `target_index` of a column.
///
/// `column` holds the destination column's orders, ascending, with the
/// moved task already removed. Missing neighbors are synthesized: a
/// phantom predecessor at 0 and, when the column is empty, a phantom
/// successor at [`ORDER_STEP`] — so a move into an empty column lands at
/// 500 rather than the creation append value of 1000.
pub fn compute_order(column: &[f64], target_index: usize) -> f64 {
    let index = target_index.min(column.len());

    let prev = index.checked_sub(1).map(|i| column[i]);
    let next = column.get(index).copied();

    match (prev, next) {
        (Some(p), Some(n)) => (p + n) / 2.0,
        (Some(p), None) => p + ORDER_STEP,
        (None, Some(n)) => n / 2.0,
        (None, None) => ORDER_STEP / 2.0,
    }
}

/// True when inserting at `target_index` would midpoint into a gap too
/// small to keep subdividing.
pub fn needs_rebalance(column: &[f64], target_index: usize) -> bool {
    let index = target_index.min(column.len());

    let Some(next) = column.get(index).copied() else {
        // Appends always have headroom.
        return false;
    };
    let prev = index.checked_sub(1).map(|i| column[i]).unwrap_or(0.0);

    (next - prev) < MIN_ORDER_GAP
}

/// Fresh orders for a renumbered column of `len` tasks: 1000, 2000, ...
pub fn rebalanced_orders(len: usize) -> impl Iterator<Item = f64> {
    (1..=len).map(|i| i as f64 * ORDER_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_appends_in_thousand_steps() {
        assert_eq!(append_order(&[]), 1000.0);
        assert_eq!(append_order(&[1000.0]), 2000.0);
        assert_eq!(append_order(&[1000.0, 2000.0]), 3000.0);
    }

    #[test]
    fn move_between_neighbors_takes_midpoint() {
        assert_eq!(compute_order(&[1000.0, 2000.0], 1), 1500.0);
        assert_eq!(compute_order(&[500.0, 600.0, 3000.0], 2), 1800.0);
    }

    #[test]
    fn move_to_head_halves_the_first_order() {
        assert_eq!(compute_order(&[1000.0, 2000.0], 0), 500.0);
        assert_eq!(compute_order(&[250.0], 0), 125.0);
    }

    #[test]
    fn move_past_tail_appends() {
        assert_eq!(compute_order(&[1000.0, 2000.0], 2), 3000.0);
        // Indices past the end clamp to an append.
        assert_eq!(compute_order(&[1000.0], 9), 2000.0);
    }

    #[test]
    fn move_into_empty_column_lands_between_phantom_bounds() {
        assert_eq!(compute_order(&[], 0), 500.0);
    }

    #[test]
    fn midpoint_stays_strictly_between_neighbors() {
        let column = [1000.0, 1000.5];
        let order = compute_order(&column, 1);
        assert!(order > column[0] && order < column[1]);
    }

    #[test]
    fn repeated_head_inserts_eventually_demand_rebalance() {
        let mut column = vec![1000.0];
        for _ in 0..64 {
            if needs_rebalance(&column, 0) {
                return;
            }
            column.insert(0, compute_order(&column, 0));
        }
        panic!("gap never collapsed below MIN_ORDER_GAP");
    }

    #[test]
    fn appends_never_demand_rebalance() {
        assert!(!needs_rebalance(&[], 0));
        assert!(!needs_rebalance(&[1000.0], 1));
    }

    #[test]
    fn rebalanced_orders_restore_full_steps() {
        let orders: Vec<f64> = rebalanced_orders(3).collect();
        assert_eq!(orders, vec![1000.0, 2000.0, 3000.0]);
    }
}
