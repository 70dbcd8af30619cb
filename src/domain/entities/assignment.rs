use crate::domain::errors::DomainError;
use crate::shared::utils::now_timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Assigned,
    Waitlisted,
    Cancelled,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Waitlisted => "waitlisted",
            AssignmentStatus::Cancelled => "cancelled",
        }
    }

    /// Assigned and waitlisted rows both hold the volunteer's place in a drive
    pub fn is_active(&self) -> bool {
        !matches!(self, AssignmentStatus::Cancelled)
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(AssignmentStatus::Assigned),
            "waitlisted" => Ok(AssignmentStatus::Waitlisted),
            "cancelled" => Ok(AssignmentStatus::Cancelled),
            other => Err(DomainError::Internal(format!(
                "Unknown assignment status: {}",
                other
            ))),
        }
    }
}

/// A volunteer's hold on a duty slot within a drive.
///
/// Rows are never deleted; cancellation is a status. `seq` is assigned by the
/// store and breaks ties between rows created in the same microsecond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub volunteer_id: String,
    pub drive_id: String,
    pub duty_slot_id: String,
    pub status: AssignmentStatus,
    pub seq: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Assignment {
    pub fn new(
        volunteer_id: String,
        drive_id: String,
        duty_slot_id: String,
        status: AssignmentStatus,
    ) -> Self {
        let now = now_timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            volunteer_id,
            drive_id,
            duty_slot_id,
            status,
            seq: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
