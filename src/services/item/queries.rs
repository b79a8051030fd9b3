use super::shared::{map_item_row, ITEM_COLUMNS};
use super::ItemService;
use crate::models::item::ScheduledItem;
use anyhow::Result;
use chrono::{DateTime, Local};

impl<'a> ItemService<'a> {
    /// List every item, timed items by start then ordered items by bucket and key.
    pub fn list_all(&self) -> Result<Vec<ScheduledItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items
             ORDER BY kind DESC, start_datetime ASC, bucket_key ASC, order_key ASC, id ASC",
            ITEM_COLUMNS
        ))?;

        let items = stmt
            .query_map([], map_item_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }

    /// Items in one bucket in ascending order-key order.
    pub fn list_bucket(&self, bucket: &str) -> Result<Vec<ScheduledItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items
             WHERE kind = 'ordered' AND bucket_key = ?
             ORDER BY order_key ASC, id ASC",
            ITEM_COLUMNS
        ))?;

        let items = stmt
            .query_map([bucket], map_item_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }

    /// Timed items overlapping `[start, end)`.
    pub fn find_by_date_range(
        &self,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Vec<ScheduledItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items
             WHERE kind = 'timed' AND start_datetime < ? AND end_datetime > ?
             ORDER BY start_datetime ASC",
            ITEM_COLUMNS
        ))?;

        let items = stmt
            .query_map([end.to_rfc3339(), start.to_rfc3339()], map_item_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }
}
