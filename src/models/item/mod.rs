// Scheduled item module
// Items that live either on a time axis (appointments) or inside an ordered
// bucket such as a status column (tasks)

use chrono::{DateTime, Duration, Local};

/// Database identifier of a scheduled item.
pub type ItemId = i64;

/// Which axis an item is positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Placed on the calendar time axis
    Timed,
    /// Placed inside an ordered bucket
    Ordered,
}

impl ItemKind {
    /// Storage representation used by the record store
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Timed => "timed",
            ItemKind::Ordered => "ordered",
        }
    }

    /// Parse the storage representation back into a kind
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "timed" => Some(ItemKind::Timed),
            "ordered" => Some(ItemKind::Ordered),
            _ => None,
        }
    }
}

/// Where an item currently sits.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemPlacement {
    Timed {
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
    Ordered {
        bucket: String,
        order_key: f64,
    },
}

impl ItemPlacement {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemPlacement::Timed { .. } => ItemKind::Timed,
            ItemPlacement::Ordered { .. } => ItemKind::Ordered,
        }
    }

    /// Merge a position patch into this placement.
    ///
    /// Fields that do not belong to this placement's kind are ignored, so a
    /// timed item never picks up a bucket from a malformed patch.
    pub fn apply_patch(&self, patch: &PositionPatch) -> ItemPlacement {
        match self {
            ItemPlacement::Timed { start, end } => ItemPlacement::Timed {
                start: patch.start.unwrap_or(*start),
                end: patch.end.unwrap_or(*end),
            },
            ItemPlacement::Ordered { bucket, order_key } => ItemPlacement::Ordered {
                bucket: patch.bucket.clone().unwrap_or_else(|| bucket.clone()),
                order_key: patch.order_key.unwrap_or(*order_key),
            },
        }
    }

    /// Build the patch that turns `self` into `target`.
    ///
    /// Only changed fields are set. Placements of different kinds produce an
    /// empty patch because an item never changes kind by being dragged.
    pub fn patch_to(&self, target: &ItemPlacement) -> PositionPatch {
        let mut patch = PositionPatch::default();
        match (self, target) {
            (
                ItemPlacement::Timed { start, end },
                ItemPlacement::Timed {
                    start: new_start,
                    end: new_end,
                },
            ) => {
                if start != new_start {
                    patch.start = Some(*new_start);
                }
                if end != new_end {
                    patch.end = Some(*new_end);
                }
            }
            (
                ItemPlacement::Ordered { bucket, order_key },
                ItemPlacement::Ordered {
                    bucket: new_bucket,
                    order_key: new_key,
                },
            ) => {
                if bucket != new_bucket {
                    patch.bucket = Some(new_bucket.clone());
                }
                if order_key != new_key {
                    patch.order_key = Some(*new_key);
                }
            }
            _ => {}
        }
        patch
    }

    /// True when both placements describe the same position, comparing
    /// order keys within `key_tolerance`.
    pub fn same_position(&self, other: &ItemPlacement, key_tolerance: f64) -> bool {
        match (self, other) {
            (
                ItemPlacement::Timed { start, end },
                ItemPlacement::Timed {
                    start: other_start,
                    end: other_end,
                },
            ) => start == other_start && end == other_end,
            (
                ItemPlacement::Ordered { bucket, order_key },
                ItemPlacement::Ordered {
                    bucket: other_bucket,
                    order_key: other_key,
                },
            ) => bucket == other_bucket && (order_key - other_key).abs() <= key_tolerance,
            _ => false,
        }
    }
}

/// Partial position update sent to the record store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionPatch {
    pub start: Option<DateTime<Local>>,
    pub end: Option<DateTime<Local>>,
    pub bucket: Option<String>,
    pub order_key: Option<f64>,
}

impl PositionPatch {
    pub fn timed(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn ordered(bucket: impl Into<String>, order_key: f64) -> Self {
        Self {
            bucket: Some(bucket.into()),
            order_key: Some(order_key),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.bucket.is_none() && self.order_key.is_none()
    }
}

/// An appointment or task that can be dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledItem {
    pub id: Option<ItemId>,
    pub title: String,
    pub placement: ItemPlacement,
    pub created_at: Option<DateTime<Local>>,
    pub updated_at: Option<DateTime<Local>>,
}

impl ScheduledItem {
    /// Create a timed item (appointment).
    ///
    /// # Examples
    /// ```
    /// use schedule_drag::models::item::ScheduledItem;
    /// use chrono::Local;
    ///
    /// let start = Local::now();
    /// let end = start + chrono::Duration::hours(1);
    /// let item = ScheduledItem::timed("Client call", start, end).unwrap();
    /// assert!(item.start().is_some());
    /// ```
    pub fn timed(
        title: impl Into<String>,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Self, String> {
        Self::with_placement(title, ItemPlacement::Timed { start, end })
    }

    /// Create an ordered item (task) inside a bucket.
    pub fn ordered(
        title: impl Into<String>,
        bucket: impl Into<String>,
        order_key: f64,
    ) -> Result<Self, String> {
        Self::with_placement(
            title,
            ItemPlacement::Ordered {
                bucket: bucket.into(),
                order_key,
            },
        )
    }

    fn with_placement(title: impl Into<String>, placement: ItemPlacement) -> Result<Self, String> {
        let item = Self {
            id: None,
            title: title.into(),
            placement,
            created_at: None,
            updated_at: None,
        };
        item.validate()?;
        Ok(item)
    }

    /// Attach a database id
    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    /// Validate the item
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Item title cannot be empty".to_string());
        }

        match &self.placement {
            ItemPlacement::Timed { start, end } => {
                if end <= start {
                    return Err("Item end time must be after start time".to_string());
                }
            }
            ItemPlacement::Ordered { bucket, order_key } => {
                if bucket.trim().is_empty() {
                    return Err("Item bucket cannot be empty".to_string());
                }
                if !order_key.is_finite() {
                    return Err("Item order key must be a finite number".to_string());
                }
            }
        }

        Ok(())
    }

    pub fn kind(&self) -> ItemKind {
        self.placement.kind()
    }

    pub fn start(&self) -> Option<DateTime<Local>> {
        match self.placement {
            ItemPlacement::Timed { start, .. } => Some(start),
            ItemPlacement::Ordered { .. } => None,
        }
    }

    pub fn end(&self) -> Option<DateTime<Local>> {
        match self.placement {
            ItemPlacement::Timed { end, .. } => Some(end),
            ItemPlacement::Ordered { .. } => None,
        }
    }

    pub fn bucket(&self) -> Option<&str> {
        match &self.placement {
            ItemPlacement::Ordered { bucket, .. } => Some(bucket.as_str()),
            ItemPlacement::Timed { .. } => None,
        }
    }

    pub fn order_key(&self) -> Option<f64> {
        match self.placement {
            ItemPlacement::Ordered { order_key, .. } => Some(order_key),
            ItemPlacement::Timed { .. } => None,
        }
    }

    /// Duration of a timed item
    pub fn duration(&self) -> Option<Duration> {
        match self.placement {
            ItemPlacement::Timed { start, end } => Some(end - start),
            ItemPlacement::Ordered { .. } => None,
        }
    }
}
