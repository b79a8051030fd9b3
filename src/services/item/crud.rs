use super::shared::{map_item_row, placement_columns, ITEM_COLUMNS};
use super::ItemService;
use crate::models::item::{ItemId, PositionPatch, ScheduledItem};
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use rusqlite::{self, params};

impl<'a> ItemService<'a> {
    /// Create a new item in the database.
    pub fn create(&self, mut item: ScheduledItem) -> Result<ScheduledItem> {
        item.validate().map_err(|e| anyhow!(e))?;

        let now = Local::now();
        let (start, end, bucket, order_key) = placement_columns(&item.placement);

        self.conn
            .execute(
                "INSERT INTO items (
                    title, kind, start_datetime, end_datetime, bucket_key, order_key,
                    created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    item.title,
                    item.kind().as_str(),
                    start,
                    end,
                    bucket,
                    order_key,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )
            .context("Failed to insert item")?;

        item.id = Some(self.conn.last_insert_rowid());
        item.created_at = Some(now);
        item.updated_at = Some(now);

        Ok(item)
    }

    /// Retrieve an item by ID.
    pub fn get(&self, id: ItemId) -> Result<Option<ScheduledItem>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS),
            [id],
            map_item_row,
        );

        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Update an existing item.
    pub fn update(&self, item: &ScheduledItem) -> Result<()> {
        let id = item
            .id
            .ok_or_else(|| anyhow!("Item ID is required for update"))?;
        item.validate().map_err(|e| anyhow!(e))?;

        let (start, end, bucket, order_key) = placement_columns(&item.placement);
        let rows_affected = self
            .conn
            .execute(
                "UPDATE items SET
                    title = ?, kind = ?, start_datetime = ?, end_datetime = ?,
                    bucket_key = ?, order_key = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    item.title,
                    item.kind().as_str(),
                    start,
                    end,
                    bucket,
                    order_key,
                    Local::now().to_rfc3339(),
                    id,
                ],
            )
            .context("Failed to update item")?;

        if rows_affected == 0 {
            return Err(anyhow!("Item with id {} not found", id));
        }

        Ok(())
    }

    /// Merge a position patch into a stored item and save it.
    ///
    /// Returns `Ok(None)` when the item does not exist.
    pub fn update_position(
        &self,
        id: ItemId,
        patch: &PositionPatch,
    ) -> Result<Option<ScheduledItem>> {
        let Some(mut item) = self.get(id)? else {
            return Ok(None);
        };

        item.placement = item.placement.apply_patch(patch);
        self.update(&item)
            .with_context(|| format!("Failed to move item {}", id))?;

        self.get(id)
    }

    /// Delete an item by ID.
    pub fn delete(&self, id: ItemId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM items WHERE id = ?", [id])
            .context("Failed to delete item")?;

        if rows_affected == 0 {
            return Err(anyhow!("Item with id {} not found", id));
        }

        Ok(())
    }
}
