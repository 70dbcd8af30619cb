use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::entities::{Assignment, AssignmentOutcome, BatchReport, Drive},
    domain::events::RosterEvent,
    infrastructure::http::middleware::{ApiError, ApiResult, AppState},
    shared::utils::now_timestamp,
};

const ACTOR_HEADER: &str = "x-actor-id";
const DEFAULT_ACTOR: &str = "system";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAssignRequest {
    pub drive_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResultItem {
    pub volunteer_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duty_slot_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAssignResponse {
    pub count: usize,
    pub batch_id: String,
    pub results: Vec<BatchResultItem>,
}

impl From<BatchReport> for BatchAssignResponse {
    fn from(report: BatchReport) -> Self {
        let results: Vec<BatchResultItem> = report
            .results
            .into_iter()
            .map(|r| BatchResultItem {
                status: r.outcome.status_label().to_string(),
                duty_slot_name: r.outcome.duty_slot_name().map(str::to_string),
                error: match r.outcome {
                    AssignmentOutcome::Failed { reason } => Some(reason),
                    _ => None,
                },
                volunteer_id: r.volunteer_id,
            })
            .collect();

        Self {
            count: results.len(),
            batch_id: report.batch_id,
            results,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignVolunteerRequest {
    pub volunteer_id: String,
    pub drive_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DriveDuty {
    pub drive: String,
    pub duty: String,
}

#[derive(Debug, Serialize)]
pub struct AssignVolunteerResponse {
    pub assignments: Vec<DriveDuty>,
}

/// Display line for one drive, or `None` when the volunteer got nothing there
fn drive_duty(drive: &Drive, outcome: &AssignmentOutcome) -> Option<DriveDuty> {
    let duty = match outcome {
        AssignmentOutcome::Assigned { duty_slot_name, .. } => duty_slot_name.clone(),
        AssignmentOutcome::Waitlisted { duty_slot_name, .. } => {
            format!("Waitlisted ({})", duty_slot_name)
        }
        AssignmentOutcome::None | AssignmentOutcome::Failed { .. } => return None,
    };
    Some(DriveDuty {
        drive: drive.name.clone(),
        duty,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: String,
    pub volunteer_id: String,
    pub drive_id: String,
    pub duty_slot_id: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Assignment> for AssignmentResponse {
    fn from(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            volunteer_id: assignment.volunteer_id,
            drive_id: assignment.drive_id,
            duty_slot_id: assignment.duty_slot_id,
            status: assignment.status.to_string(),
            created_at: assignment.created_at,
            updated_at: assignment.updated_at,
        }
    }
}

pub(crate) fn actor_id(headers: &HeaderMap) -> ApiResult<String> {
    match headers.get(ACTOR_HEADER) {
        None => Ok(DEFAULT_ACTOR.to_string()),
        Some(value) => {
            let actor = value
                .to_str()
                .map_err(|_| ApiError::BadRequest("X-Actor-Id must be valid text".to_string()))?
                .trim();
            if actor.is_empty() {
                Ok(DEFAULT_ACTOR.to_string())
            } else {
                Ok(actor.to_string())
            }
        }
    }
}

fn publish_outcome(state: &AppState, volunteer_id: &str, drive_id: &str, outcome: &AssignmentOutcome) {
    if let Some(event) = RosterEvent::from_outcome(volunteer_id, drive_id, outcome, now_timestamp()) {
        if let Err(e) = state.event_bus.publish(event) {
            tracing::warn!("Failed to publish assignment event: {}", e);
        }
    }
}

// POST /api/assignments/batch - Assign every unassigned registrant of a drive
pub async fn batch_assign(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<BatchAssignRequest>,
) -> ApiResult<Json<BatchAssignResponse>> {
    let actor = actor_id(&headers)?;

    let report = state
        .batch_coordinator
        .batch_assign(&req.drive_id, &actor)
        .await?;

    for result in &report.results {
        publish_outcome(&state, &result.volunteer_id, &report.drive_id, &result.outcome);
    }

    Ok(Json(BatchAssignResponse::from(report)))
}

// POST /api/assignments - Assign one volunteer across the listed drives
pub async fn assign_volunteer(
    State(state): State<AppState>,
    Json(req): Json<AssignVolunteerRequest>,
) -> ApiResult<Json<AssignVolunteerResponse>> {
    let outcomes = state
        .assignment_engine
        .assign_to_drives(&req.volunteer_id, &req.drive_ids)
        .await?;

    let mut assignments = Vec::with_capacity(outcomes.len());
    for (drive, outcome) in &outcomes {
        publish_outcome(&state, &req.volunteer_id, &drive.id, outcome);
        if let Some(line) = drive_duty(drive, outcome) {
            assignments.push(line);
        }
    }

    Ok(Json(AssignVolunteerResponse { assignments }))
}

// POST /api/assignments/:id/cancel - Cancel an assignment and free its capacity
pub async fn cancel_assignment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(assignment_id): Path<String>,
) -> ApiResult<Json<AssignmentResponse>> {
    let actor = actor_id(&headers)?;

    let assignment = state
        .cancellation_service
        .cancel_assignment(&assignment_id, &actor)
        .await?;

    Ok(Json(AssignmentResponse::from(assignment)))
}
