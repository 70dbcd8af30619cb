use crate::domain::entities::AssignmentOutcome;

/// Roster events published after an engine call returns.
///
/// Downstream collaborators (notification dispatch, audit feeds) subscribe to
/// these; the promotion listener reacts to `CapacityFreed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    VolunteerAssigned {
        assignment_id: String,
        volunteer_id: String,
        drive_id: String,
        duty_slot_name: String,
        timestamp: String, // ISO 8601
    },
    VolunteerWaitlisted {
        assignment_id: String,
        volunteer_id: String,
        drive_id: String,
        duty_slot_name: String,
        timestamp: String, // ISO 8601
    },
    VolunteerPromoted {
        assignment_id: String,
        volunteer_id: String,
        drive_id: String,
        duty_slot_name: String,
        timestamp: String, // ISO 8601
    },
    AssignmentCancelled {
        assignment_id: String,
        volunteer_id: String,
        drive_id: String,
        cancelled_by: String,
        timestamp: String, // ISO 8601
    },
    CapacityFreed {
        drive_id: String,
        duty_slot_id: String,
        timestamp: String, // ISO 8601
    },
}

impl RosterEvent {
    /// Event describing a fresh assignment decision, if it produced a row
    pub fn from_outcome(
        volunteer_id: &str,
        drive_id: &str,
        outcome: &AssignmentOutcome,
        timestamp: String,
    ) -> Option<Self> {
        match outcome {
            AssignmentOutcome::Assigned {
                assignment_id,
                duty_slot_name,
                ..
            } => Some(RosterEvent::VolunteerAssigned {
                assignment_id: assignment_id.clone(),
                volunteer_id: volunteer_id.to_string(),
                drive_id: drive_id.to_string(),
                duty_slot_name: duty_slot_name.clone(),
                timestamp,
            }),
            AssignmentOutcome::Waitlisted {
                assignment_id,
                duty_slot_name,
                ..
            } => Some(RosterEvent::VolunteerWaitlisted {
                assignment_id: assignment_id.clone(),
                volunteer_id: volunteer_id.to_string(),
                drive_id: drive_id.to_string(),
                duty_slot_name: duty_slot_name.clone(),
                timestamp,
            }),
            AssignmentOutcome::None | AssignmentOutcome::Failed { .. } => None,
        }
    }
}
