use chrono::{DateTime, Local};
use rusqlite::{self, Result, Row};

use crate::models::item::{ItemKind, ItemPlacement, ScheduledItem};

pub(crate) const ITEM_COLUMNS: &str =
    "id, title, kind, start_datetime, end_datetime, bucket_key, order_key, created_at, updated_at";

pub(crate) fn to_local_datetime(value: String) -> Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn conversion_error(message: String) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(message.into())
}

/// Map a row selected with [`ITEM_COLUMNS`] into an item.
pub(crate) fn map_item_row(row: &Row) -> Result<ScheduledItem> {
    let id: i64 = row.get(0)?;
    let kind_str: String = row.get(2)?;
    let kind = ItemKind::parse(&kind_str)
        .ok_or_else(|| conversion_error(format!("item {} has unknown kind '{}'", id, kind_str)))?;

    let placement = match kind {
        ItemKind::Timed => {
            let start: Option<String> = row.get(3)?;
            let end: Option<String> = row.get(4)?;
            let (Some(start), Some(end)) = (start, end) else {
                return Err(conversion_error(format!("timed item {} is missing its times", id)));
            };
            ItemPlacement::Timed {
                start: to_local_datetime(start)?,
                end: to_local_datetime(end)?,
            }
        }
        ItemKind::Ordered => {
            let bucket: Option<String> = row.get(5)?;
            let order_key: Option<f64> = row.get(6)?;
            ItemPlacement::Ordered {
                bucket: bucket
                    .ok_or_else(|| conversion_error(format!("ordered item {} has no bucket", id)))?,
                order_key: order_key.unwrap_or(0.0),
            }
        }
    };

    Ok(ScheduledItem {
        id: Some(id),
        title: row.get(1)?,
        placement,
        created_at: Some(to_local_datetime(row.get::<_, String>(7)?)?),
        updated_at: Some(to_local_datetime(row.get::<_, String>(8)?)?),
    })
}

/// Column values for a placement: (start, end, bucket, order_key).
pub(crate) fn placement_columns(
    placement: &ItemPlacement,
) -> (Option<String>, Option<String>, Option<String>, Option<f64>) {
    match placement {
        ItemPlacement::Timed { start, end } => {
            (Some(start.to_rfc3339()), Some(end.to_rfc3339()), None, None)
        }
        ItemPlacement::Ordered { bucket, order_key } => {
            (None, None, Some(bucket.clone()), Some(*order_key))
        }
    }
}
