use crate::shared::utils::now_timestamp;
use serde::{Deserialize, Serialize};

/// A time-boxed volunteer event. The roster only needs its identity and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drive {
    pub id: String,
    pub name: String,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub created_at: String,
}

impl Drive {
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            starts_at: None,
            ends_at: None,
            created_at: now_timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub drive_id: String,
    pub volunteer_id: String,
    pub registered_at: String,
}

impl Registration {
    pub fn new(drive_id: String, volunteer_id: String) -> Self {
        Self {
            drive_id,
            volunteer_id,
            registered_at: now_timestamp(),
        }
    }
}
