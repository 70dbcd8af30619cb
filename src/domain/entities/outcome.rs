use serde::Serialize;

/// Result of one assignment decision.
///
/// `None` and `Waitlisted` are ordinary outcomes for a full or empty drive;
/// only `Failed` means the item could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AssignmentOutcome {
    Assigned {
        assignment_id: String,
        duty_slot_id: String,
        duty_slot_name: String,
    },
    Waitlisted {
        assignment_id: String,
        duty_slot_id: String,
        duty_slot_name: String,
        /// 1-based place in the slot's waitlist at the time of the decision
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<u32>,
    },
    None,
    Failed {
        reason: String,
    },
}

impl AssignmentOutcome {
    pub fn status_label(&self) -> &'static str {
        match self {
            AssignmentOutcome::Assigned { .. } => "assigned",
            AssignmentOutcome::Waitlisted { .. } => "waitlisted",
            AssignmentOutcome::None => "none",
            AssignmentOutcome::Failed { .. } => "failed",
        }
    }

    pub fn duty_slot_name(&self) -> Option<&str> {
        match self {
            AssignmentOutcome::Assigned { duty_slot_name, .. }
            | AssignmentOutcome::Waitlisted { duty_slot_name, .. } => Some(duty_slot_name),
            AssignmentOutcome::None | AssignmentOutcome::Failed { .. } => None,
        }
    }

    pub fn assignment_id(&self) -> Option<&str> {
        match self {
            AssignmentOutcome::Assigned { assignment_id, .. }
            | AssignmentOutcome::Waitlisted { assignment_id, .. } => Some(assignment_id),
            AssignmentOutcome::None | AssignmentOutcome::Failed { .. } => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignmentOutcome::Assigned { .. })
    }

    pub fn is_waitlisted(&self) -> bool {
        matches!(self, AssignmentOutcome::Waitlisted { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AssignmentOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VolunteerResult {
    pub volunteer_id: String,
    pub outcome: AssignmentOutcome,
}

/// Audit-tagged result of one batch run over a drive
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub drive_id: String,
    pub actor_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub results: Vec<VolunteerResult>,
}

impl BatchReport {
    pub fn count(&self, status_label: &str) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.status_label() == status_label)
            .count()
    }
}

/// Persisted summary of a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchAudit {
    pub batch_id: String,
    pub drive_id: String,
    pub actor_id: String,
    pub assigned_count: i64,
    pub waitlisted_count: i64,
    pub none_count: i64,
    pub failed_count: i64,
    pub started_at: String,
    pub finished_at: String,
}

impl From<&BatchReport> for BatchAudit {
    fn from(report: &BatchReport) -> Self {
        Self {
            batch_id: report.batch_id.clone(),
            drive_id: report.drive_id.clone(),
            actor_id: report.actor_id.clone(),
            assigned_count: report.count("assigned") as i64,
            waitlisted_count: report.count("waitlisted") as i64,
            none_count: report.count("none") as i64,
            failed_count: report.count("failed") as i64,
            started_at: report.started_at.clone(),
            finished_at: report.finished_at.clone(),
        }
    }
}

/// One processed waitlist item, or a slot-level failure when `volunteer_id` is absent
#[derive(Debug, Clone, Serialize)]
pub struct PromotionResult {
    pub duty_slot_id: String,
    pub volunteer_id: Option<String>,
    pub outcome: AssignmentOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromotionReport {
    pub drive_id: String,
    pub results: Vec<PromotionResult>,
}

impl PromotionReport {
    pub fn promoted(&self) -> impl Iterator<Item = &PromotionResult> {
        self.results.iter().filter(|r| r.outcome.is_assigned())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PromotionResult> {
        self.results.iter().filter(|r| r.outcome.is_failed())
    }
}
