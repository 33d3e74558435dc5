//! Fractional ordering keys for tasks within a status column.
//!
//! Ordinals persist user-driven ordering: sorting a column by ordinal
//! reproduces the intended order. New drops take the midpoint of their
//! neighbors so most reorders touch exactly one file; when the midpoint
//! space between two neighbors is exhausted, or when ordinals collide or
//! are missing, the whole column is renumbered sequentially.

use crate::models::TaskRecord;

/// Default spacing between neighboring ordinals.
pub const ORDINAL_SPACING: f64 = 1000.0;

/// The slice of a task a reorder needs: identity and current ordinal.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalCard {
    /// Task id.
    pub id: String,
    /// Current ordinal, if the task has one.
    pub ordinal: Option<f64>,
}

impl OrdinalCard {
    /// Build a card view.
    #[must_use]
    pub fn new(id: impl Into<String>, ordinal: Option<f64>) -> Self {
        Self {
            id: id.into(),
            ordinal,
        }
    }
}

impl From<&TaskRecord> for OrdinalCard {
    fn from(task: &TaskRecord) -> Self {
        Self {
            id: task.id.clone(),
            ordinal: task.ordinal,
        }
    }
}

/// One ordinal reassignment to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalUpdate {
    /// Task id to update.
    pub id: String,
    /// New ordinal value.
    pub ordinal: f64,
}

/// Compute ordinal updates for dropping `moved_id` at `target_index`.
///
/// `column` is the target column in current display order, including the
/// moved card when the move stays within one column. `target_index` is the
/// moved card's position in the column after the drop.
///
/// Returns an empty set when the drop does not change relative order, a
/// single update when a midpoint (or boundary step) exists, and a full
/// sequential renumbering of the column when neighbors have colliding,
/// missing, or midpoint-exhausted ordinals.
#[must_use]
pub fn calculate_ordinals_for_drop(
    column: &[OrdinalCard],
    moved_id: &str,
    target_index: usize,
) -> Vec<OrdinalUpdate> {
    let current = column.iter().position(|card| card.id == moved_id);
    let rest: Vec<&OrdinalCard> = column.iter().filter(|card| card.id != moved_id).collect();
    let target = target_index.min(rest.len());

    if current == Some(target) {
        return Vec::new();
    }

    let prev = target.checked_sub(1).and_then(|i| rest.get(i).copied());
    let next = rest.get(target).copied();

    let ordinal = match (prev, next) {
        (None, None) => Some(ORDINAL_SPACING),
        (Some(p), None) => p.ordinal.map(|o| o + ORDINAL_SPACING),
        (None, Some(n)) => n.ordinal.map(|o| o - ORDINAL_SPACING),
        (Some(p), Some(n)) => match (p.ordinal, n.ordinal) {
            (Some(lo), Some(hi)) => midpoint(lo, hi),
            _ => None,
        },
    };

    match ordinal {
        Some(value) => vec![OrdinalUpdate {
            id: moved_id.to_owned(),
            ordinal: value,
        }],
        // No usable midpoint or a neighbor without an ordinal: renumber the
        // column with the moved card in place.
        None => {
            let mut sequence: Vec<OrdinalCard> = rest.iter().map(|c| (*c).clone()).collect();
            sequence.insert(target, OrdinalCard::new(moved_id, None));
            renumber(&sequence)
        }
    }
}

/// Repair a column whose ordinals are colliding or missing.
///
/// `column` is the column in intended display order. Returns no updates for
/// an already strictly increasing sequence; otherwise returns the
/// reassignments of a sequential renumbering pass with default spacing.
#[must_use]
pub fn resolve_ordinal_conflicts(column: &[OrdinalCard]) -> Vec<OrdinalUpdate> {
    if strictly_increasing(column) {
        return Vec::new();
    }
    renumber(column)
}

fn strictly_increasing(column: &[OrdinalCard]) -> bool {
    let mut last: Option<f64> = None;
    for card in column {
        let Some(ordinal) = card.ordinal else {
            return false;
        };
        if let Some(prev) = last {
            if ordinal <= prev {
                return false;
            }
        }
        last = Some(ordinal);
    }
    true
}

/// Midpoint of two ordinals, or `None` when floating-point headroom between
/// them is exhausted and no strictly-between value exists.
fn midpoint(lo: f64, hi: f64) -> Option<f64> {
    if lo >= hi {
        return None;
    }
    let mid = lo / 2.0 + hi / 2.0;
    if mid > lo && mid < hi {
        Some(mid)
    } else {
        None
    }
}

#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
fn renumber(sequence: &[OrdinalCard]) -> Vec<OrdinalUpdate> {
    sequence
        .iter()
        .enumerate()
        .filter_map(|(index, card)| {
            let ordinal = (index as f64 + 1.0) * ORDINAL_SPACING;
            if card.ordinal == Some(ordinal) {
                None
            } else {
                Some(OrdinalUpdate {
                    id: card.id.clone(),
                    ordinal,
                })
            }
        })
        .collect()
}
