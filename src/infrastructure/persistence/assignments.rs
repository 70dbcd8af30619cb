use crate::domain::entities::{Assignment, AssignmentStatus, BatchAudit, Drive, DutySlot};
use crate::domain::ports::assignment_store::AssignmentStore;
use crate::domain::ports::eligibility::EligibilityPolicy;
use crate::domain::services::validate_transition;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::Database;
use crate::shared::utils::now_timestamp;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};
use std::str::FromStr;

const ASSIGNMENT_COLUMNS: &str =
    "id, volunteer_id, drive_id, duty_slot_id, status, seq, created_at, updated_at";

const DUTY_SLOT_COLUMNS: &str =
    "id, drive_id, name, base_capacity, manual_capacity_override, sort_order, created_at";

fn to_u32(value: i64, what: &str) -> ApiResult<u32> {
    u32::try_from(value).map_err(|_| ApiError::Internal(format!("Invalid {}: {}", what, value)))
}

pub(crate) fn row_to_assignment(row: &AnyRow) -> ApiResult<Assignment> {
    let status: String = row.try_get("status")?;
    Ok(Assignment {
        id: row.try_get("id")?,
        volunteer_id: row.try_get("volunteer_id")?,
        drive_id: row.try_get("drive_id")?,
        duty_slot_id: row.try_get("duty_slot_id")?,
        status: AssignmentStatus::from_str(&status)?,
        seq: row.try_get("seq")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn row_to_duty_slot(row: &AnyRow) -> ApiResult<DutySlot> {
    let base_capacity: i64 = row.try_get("base_capacity")?;
    let manual_capacity_override = row
        .try_get::<Option<i64>, _>("manual_capacity_override")
        .ok()
        .flatten();
    Ok(DutySlot {
        id: row.try_get("id")?,
        drive_id: row.try_get("drive_id")?,
        name: row.try_get("name")?,
        base_capacity: to_u32(base_capacity, "base capacity")?,
        manual_capacity_override: manual_capacity_override
            .map(|value| to_u32(value, "capacity override"))
            .transpose()?,
        sort_order: row.try_get("sort_order")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl AssignmentStore for Database {
    async fn list_candidate_duty_slots(
        &self,
        drive_id: &str,
        volunteer_id: &str,
        eligibility: &dyn EligibilityPolicy,
    ) -> ApiResult<Vec<DutySlot>> {
        let slots = self.list_duty_slots(drive_id).await?;
        let mut candidates = Vec::with_capacity(slots.len());
        for slot in slots {
            if eligibility.admits(volunteer_id, &slot).await? {
                candidates.push(slot);
            }
        }
        Ok(candidates)
    }

    async fn occupied_count(&self, duty_slot_id: &str) -> ApiResult<u32> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS occupied FROM assignments
             WHERE duty_slot_id = ? AND status = 'assigned'",
        )
        .bind(duty_slot_id)
        .fetch_one(&self.pool)
        .await?;

        let occupied: i64 = row.try_get("occupied")?;
        to_u32(occupied, "occupied count")
    }

    async fn effective_capacity(&self, duty_slot_id: &str) -> ApiResult<u32> {
        let slot = self
            .get_duty_slot(duty_slot_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Duty slot {} not found", duty_slot_id)))?;
        Ok(slot.effective_capacity())
    }

    async fn create_assignment(
        &self,
        volunteer_id: &str,
        drive_id: &str,
        duty_slot_id: &str,
        status: AssignmentStatus,
    ) -> ApiResult<Assignment> {
        if status == AssignmentStatus::Cancelled {
            return Err(ApiError::BadRequest(
                "Assignments cannot be created as cancelled".to_string(),
            ));
        }

        let assignment = Assignment::new(
            volunteer_id.to_string(),
            drive_id.to_string(),
            duty_slot_id.to_string(),
            status,
        );

        let mut tx = self.pool.begin().await?;

        // Writing the slot row first takes its write lock, so every
        // capacity-guarded write on this slot is serialized behind us.
        let locked = sqlx::query(
            "UPDATE duty_slots SET version = version + 1 WHERE id = ? AND drive_id = ?",
        )
        .bind(duty_slot_id)
        .bind(drive_id)
        .execute(&mut *tx)
        .await?;

        if locked.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ApiError::NotFound(format!(
                "Duty slot {} not found in drive {}",
                duty_slot_id, drive_id
            )));
        }

        let inserted = match status {
            AssignmentStatus::Assigned => {
                sqlx::query(
                    "INSERT INTO assignments
                        (id, volunteer_id, drive_id, duty_slot_id, status, seq, created_at, updated_at)
                     SELECT ?, ?, ?, ?, 'assigned',
                            (SELECT COALESCE(MAX(seq), 0) + 1 FROM assignments), ?, ?
                     FROM duty_slots d
                     WHERE d.id = ?
                       AND (SELECT COUNT(*) FROM assignments a
                            WHERE a.duty_slot_id = d.id AND a.status = 'assigned')
                           < COALESCE(d.manual_capacity_override, d.base_capacity)",
                )
                .bind(&assignment.id)
                .bind(&assignment.volunteer_id)
                .bind(&assignment.drive_id)
                .bind(&assignment.duty_slot_id)
                .bind(&assignment.created_at)
                .bind(&assignment.updated_at)
                .bind(&assignment.duty_slot_id)
                .execute(&mut *tx)
                .await?
            }
            _ => {
                sqlx::query(
                    "INSERT INTO assignments
                        (id, volunteer_id, drive_id, duty_slot_id, status, seq, created_at, updated_at)
                     VALUES (?, ?, ?, ?, 'waitlisted',
                             (SELECT COALESCE(MAX(seq), 0) + 1 FROM assignments), ?, ?)",
                )
                .bind(&assignment.id)
                .bind(&assignment.volunteer_id)
                .bind(&assignment.drive_id)
                .bind(&assignment.duty_slot_id)
                .bind(&assignment.created_at)
                .bind(&assignment.updated_at)
                .execute(&mut *tx)
                .await?
            }
        };

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Duty slot {} has no remaining capacity",
                duty_slot_id
            )));
        }

        tx.commit().await?;

        self.get_assignment(&assignment.id)
            .await?
            .ok_or_else(|| ApiError::Internal("Assignment disappeared after insert".to_string()))
    }

    async fn transition_assignment(
        &self,
        assignment_id: &str,
        to_status: AssignmentStatus,
    ) -> ApiResult<Assignment> {
        let current = self
            .get_assignment(assignment_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Assignment {} not found", assignment_id)))?;

        validate_transition(current.status, to_status)?;

        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;

        let updated = match to_status {
            AssignmentStatus::Assigned => {
                sqlx::query("UPDATE duty_slots SET version = version + 1 WHERE id = ?")
                    .bind(&current.duty_slot_id)
                    .execute(&mut *tx)
                    .await?;

                sqlx::query(
                    "UPDATE assignments
                     SET status = 'assigned', updated_at = ?
                     WHERE id = ? AND status = 'waitlisted'
                       AND (SELECT COUNT(*) FROM assignments a
                            WHERE a.duty_slot_id = ? AND a.status = 'assigned')
                           < (SELECT COALESCE(d.manual_capacity_override, d.base_capacity)
                              FROM duty_slots d WHERE d.id = ?)",
                )
                .bind(&now)
                .bind(assignment_id)
                .bind(&current.duty_slot_id)
                .bind(&current.duty_slot_id)
                .execute(&mut *tx)
                .await?
            }
            _ => {
                // Compare-and-set on the status we validated against
                sqlx::query(
                    "UPDATE assignments SET status = ?, updated_at = ?
                     WHERE id = ? AND status = ?",
                )
                .bind(to_status.as_str())
                .bind(&now)
                .bind(assignment_id)
                .bind(current.status.as_str())
                .execute(&mut *tx)
                .await?
            }
        };

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Assignment {} could not move from {} to {}",
                assignment_id, current.status, to_status
            )));
        }

        tx.commit().await?;

        self.get_assignment(assignment_id)
            .await?
            .ok_or_else(|| {
                ApiError::Internal("Assignment disappeared after transition".to_string())
            })
    }

    async fn list_unassigned_volunteers(&self, drive_id: &str) -> ApiResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT r.volunteer_id FROM drive_registrations r
             WHERE r.drive_id = ?
               AND NOT EXISTS (
                   SELECT 1 FROM assignments a
                   WHERE a.drive_id = r.drive_id
                     AND a.volunteer_id = r.volunteer_id
                     AND a.status <> 'cancelled'
               )
             ORDER BY r.registered_at ASC, r.volunteer_id ASC",
        )
        .bind(drive_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get("volunteer_id").map_err(ApiError::from))
            .collect()
    }

    async fn list_waitlisted(&self, duty_slot_id: &str) -> ApiResult<Vec<Assignment>> {
        let query = format!(
            "SELECT {} FROM assignments
             WHERE duty_slot_id = ? AND status = 'waitlisted'
             ORDER BY created_at ASC, seq ASC",
            ASSIGNMENT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(duty_slot_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_assignment).collect()
    }

    async fn get_drive(&self, drive_id: &str) -> ApiResult<Option<Drive>> {
        let row = sqlx::query(
            "SELECT id, name, starts_at, ends_at, created_at FROM drives WHERE id = ?",
        )
        .bind(drive_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Drive {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                starts_at: row.try_get::<Option<String>, _>("starts_at").ok().flatten(),
                ends_at: row.try_get::<Option<String>, _>("ends_at").ok().flatten(),
                created_at: row.try_get("created_at")?,
            })),
            None => Ok(None),
        }
    }

    async fn get_duty_slot(&self, duty_slot_id: &str) -> ApiResult<Option<DutySlot>> {
        let query = format!("SELECT {} FROM duty_slots WHERE id = ?", DUTY_SLOT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(duty_slot_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_duty_slot).transpose()
    }

    async fn list_duty_slots(&self, drive_id: &str) -> ApiResult<Vec<DutySlot>> {
        let query = format!(
            "SELECT {} FROM duty_slots WHERE drive_id = ? ORDER BY sort_order ASC, id ASC",
            DUTY_SLOT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(drive_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_duty_slot).collect()
    }

    async fn get_assignment(&self, assignment_id: &str) -> ApiResult<Option<Assignment>> {
        let query = format!("SELECT {} FROM assignments WHERE id = ?", ASSIGNMENT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(assignment_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_assignment).transpose()
    }

    async fn find_active_assignment(
        &self,
        volunteer_id: &str,
        drive_id: &str,
    ) -> ApiResult<Option<Assignment>> {
        let query = format!(
            "SELECT {} FROM assignments
             WHERE volunteer_id = ? AND drive_id = ? AND status <> 'cancelled'",
            ASSIGNMENT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(volunteer_id)
            .bind(drive_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_assignment).transpose()
    }

    async fn record_batch_audit(&self, audit: &BatchAudit) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO batch_audits
                (batch_id, drive_id, actor_id, assigned_count, waitlisted_count,
                 none_count, failed_count, started_at, finished_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&audit.batch_id)
        .bind(&audit.drive_id)
        .bind(&audit.actor_id)
        .bind(audit.assigned_count)
        .bind(audit.waitlisted_count)
        .bind(audit.none_count)
        .bind(audit.failed_count)
        .bind(&audit.started_at)
        .bind(&audit.finished_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_capacity_override(
        &self,
        duty_slot_id: &str,
        manual_capacity_override: Option<u32>,
    ) -> ApiResult<DutySlot> {
        self.update_capacity_override(duty_slot_id, manual_capacity_override)
            .await?;

        self.get_duty_slot(duty_slot_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Duty slot {} not found", duty_slot_id)))
    }
}
