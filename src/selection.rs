//! Post-build hit-testing and selection toggling.
//!
//! These operate only on a finished [`Registry`]; the build never exposes
//! intermediate state to them.

use crate::registry::{RectId, Registry};

/// First rectangle, in registry insertion order, whose bounds contain the point.
pub fn hit_test(registry: &Registry, x: f64, y: f64) -> Option<RectId> {
    registry
        .iter()
        .find(|(_, rect)| rect.bounds.contains(x, y))
        .map(|(id, _)| id)
}

/// Flip selection on `id`, returning the new state, or `None` for an unknown id.
pub fn toggle(registry: &mut Registry, id: RectId) -> Option<bool> {
    let rect = registry.get_mut(id)?;
    let selected = !rect.is_selected();
    rect.set_selected(selected);
    Some(selected)
}

/// Hit-test and toggle in one step; a miss leaves the registry untouched.
pub fn toggle_at(registry: &mut Registry, x: f64, y: f64) -> Option<RectId> {
    let id = hit_test(registry, x, y)?;
    toggle(registry, id)?;
    Some(id)
}

/// Ids of every selected rectangle, in insertion order.
pub fn selected(registry: &Registry) -> Vec<RectId> {
    registry
        .iter()
        .filter(|(_, rect)| rect.is_selected())
        .map(|(id, _)| id)
        .collect()
}

/// Clear every selection, returning how many rectangles changed.
pub fn clear(registry: &mut Registry) -> usize {
    let ids = selected(registry);
    for id in &ids {
        toggle(registry, *id);
    }
    ids.len()
}
