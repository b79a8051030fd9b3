use crate::drag::positioner::SiblingKey;
use crate::models::item::{ItemId, ItemPlacement, PositionPatch, ScheduledItem};

/// The items currently loaded into the view.
///
/// The coordinator is its only writer; everything else reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCollection {
    items: Vec<ScheduledItem>,
}

impl ItemCollection {
    pub fn new(items: Vec<ScheduledItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ScheduledItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&ScheduledItem> {
        self.items.iter().find(|item| item.id == Some(id))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Insert `item`, replacing the stored item with the same id.
    pub fn replace(&mut self, item: ScheduledItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.id.is_some() && existing.id == item.id)
        {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Replace every item of `bucket` with `items`.
    pub fn replace_bucket(&mut self, bucket: &str, items: Vec<ScheduledItem>) {
        self.items.retain(|item| item.bucket() != Some(bucket));
        self.items.extend(items);
    }

    /// Merge `patch` into item `id`. Returns false for unknown ids.
    pub fn apply_patch(&mut self, id: ItemId, patch: &PositionPatch) -> bool {
        match self.items.iter_mut().find(|item| item.id == Some(id)) {
            Some(item) => {
                item.placement = item.placement.apply_patch(patch);
                true
            }
            None => false,
        }
    }

    pub fn placement(&self, id: ItemId) -> Option<&ItemPlacement> {
        self.get(id).map(|item| &item.placement)
    }

    /// Saved items in `bucket` ordered by key, optionally leaving one out.
    ///
    /// Ties keep load order so equal keys never swap.
    pub fn siblings(&self, bucket: &str, excluding: Option<ItemId>) -> Vec<SiblingKey> {
        let mut siblings: Vec<SiblingKey> = self
            .items
            .iter()
            .filter(|item| item.bucket() == Some(bucket))
            .filter_map(|item| match (item.id, item.order_key()) {
                (Some(id), Some(key)) if Some(id) != excluding => Some(SiblingKey::new(id, key)),
                _ => None,
            })
            .collect();

        siblings.sort_by(|a, b| a.order_key.total_cmp(&b.order_key));
        siblings
    }
}

impl FromIterator<ScheduledItem> for ItemCollection {
    fn from_iter<I: IntoIterator<Item = ScheduledItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
