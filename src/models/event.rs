use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderEventKind {
    Created { tracking_id: String },
    Updated { tracking_id: String },
    Deleted { tracking_id: String },
    ImportCompleted { imported: usize, skipped: usize, errors: usize, seeded: bool },
}

/// Change notification pushed to websocket subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: OrderEventKind,
    pub at: DateTime<Utc>,
}

impl OrderEvent {
    pub fn new(kind: OrderEventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            at: Utc::now(),
        }
    }
}
