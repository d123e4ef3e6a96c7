//! Paint ordering by `zIndex`.

use crate::page::model::Stacked;

/// Elements in paint order: ascending `zIndex`, declaration order among equals.
pub fn stacking_order<T: Stacked>(items: &[T]) -> Vec<&T> {
    let mut out: Vec<&T> = items.iter().collect();
    // `sort_by_key` is stable.
    out.sort_by_key(|item| item.z_index());
    out
}
