//! Fractional order keys for reordering items inside a bucket.
//!
//! Inserting between two siblings takes the midpoint of their keys, so a move
//! touches one record. When repeated midpoints squeeze a gap below the
//! precision threshold the bucket is renumbered to `0..N` in its current
//! order, and the re-keyed siblings travel with the placement.

use crate::models::item::ItemId;

/// Default minimum gap between neighbouring keys.
pub const DEFAULT_RENORMALIZE_THRESHOLD: f64 = 1e-6;

/// One sibling in the destination bucket, in ascending key order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiblingKey {
    pub id: ItemId,
    pub order_key: f64,
}

impl SiblingKey {
    pub fn new(id: ItemId, order_key: f64) -> Self {
        Self { id, order_key }
    }
}

/// Result of positioning the dragged item.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Key for the dragged item
    pub order_key: f64,
    /// Siblings whose keys changed because the bucket was renumbered
    pub rekeyed: Vec<SiblingKey>,
}

impl Placement {
    pub fn was_renormalized(&self) -> bool {
        !self.rekeyed.is_empty()
    }
}

/// Key for inserting at `index` among `siblings` (ascending, dragged item
/// excluded). An index past the end appends.
pub fn insertion_key(siblings: &[f64], index: usize) -> f64 {
    match (siblings.first(), siblings.last()) {
        (None, _) | (_, None) => 0.0,
        (Some(first), _) if index == 0 => (first - 1.0).max(0.0),
        (_, Some(last)) if index >= siblings.len() => last + 1.0,
        _ => (siblings[index - 1] + siblings[index]) / 2.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedListPositioner {
    threshold: f64,
}

impl Default for OrderedListPositioner {
    fn default() -> Self {
        Self::new(DEFAULT_RENORMALIZE_THRESHOLD)
    }
}

impl OrderedListPositioner {
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_finite() && threshold > 0.0 {
            threshold
        } else {
            DEFAULT_RENORMALIZE_THRESHOLD
        };
        Self { threshold }
    }

    /// Position the dragged item at `index` among `siblings`.
    pub fn place(&self, siblings: &[SiblingKey], index: usize) -> Placement {
        debug_assert!(
            siblings.windows(2).all(|pair| pair[0].order_key <= pair[1].order_key),
            "siblings must be sorted by order key"
        );

        let index = index.min(siblings.len());
        let keys: Vec<f64> = siblings.iter().map(|s| s.order_key).collect();
        let order_key = insertion_key(&keys, index);

        if self.gap_too_small(&keys, index, order_key) {
            log::debug!(
                "Renumbering bucket of {} siblings: key {} at index {} is too close to a neighbour",
                siblings.len(),
                order_key,
                index
            );
            return renormalize(siblings, index);
        }

        Placement {
            order_key,
            rekeyed: Vec::new(),
        }
    }

    fn gap_too_small(&self, keys: &[f64], index: usize, key: f64) -> bool {
        let below = index.checked_sub(1).and_then(|i| keys.get(i));
        let above = keys.get(index);

        let below_ok = below.map_or(true, |lower| key - lower >= self.threshold);
        let above_ok = above.map_or(true, |upper| upper - key >= self.threshold);
        !(below_ok && above_ok)
    }
}

/// Reassign integer keys `0..=N` in current order with the dragged item at
/// `index`. Only siblings whose key actually changes are reported.
pub fn renormalize(siblings: &[SiblingKey], index: usize) -> Placement {
    let index = index.min(siblings.len());
    let rekeyed = siblings
        .iter()
        .enumerate()
        .filter_map(|(position, sibling)| {
            let slot = if position < index { position } else { position + 1 };
            let key = slot as f64;
            (sibling.order_key != key).then_some(SiblingKey::new(sibling.id, key))
        })
        .collect();

    Placement {
        order_key: index as f64,
        rekeyed,
    }
}
