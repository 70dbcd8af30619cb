use crate::domain::entities::{BatchAudit, Drive, DutySlot, Registration};
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::Database;
use sqlx::Row;

// Record management for drives, slots and registrations is owned by the
// surrounding system; these writes exist for seeding and operator tooling.
impl Database {
    pub async fn insert_drive(&self, drive: &Drive) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO drives (id, name, starts_at, ends_at, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&drive.id)
        .bind(&drive.name)
        .bind(&drive.starts_at)
        .bind(&drive.ends_at)
        .bind(&drive.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_duty_slot(&self, slot: &DutySlot) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO duty_slots
                (id, drive_id, name, base_capacity, manual_capacity_override, sort_order, version, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&slot.id)
        .bind(&slot.drive_id)
        .bind(&slot.name)
        .bind(slot.base_capacity as i64)
        .bind(slot.manual_capacity_override.map(|value| value as i64))
        .bind(slot.sort_order)
        .bind(&slot.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_registration(&self, registration: &Registration) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO drive_registrations (drive_id, volunteer_id, registered_at)
             VALUES (?, ?, ?)",
        )
        .bind(&registration.drive_id)
        .bind(&registration.volunteer_id)
        .bind(&registration.registered_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Sets or clears the administrative capacity override.
    /// Bumps the slot version so it serializes with capacity-guarded writes.
    pub async fn update_capacity_override(
        &self,
        duty_slot_id: &str,
        manual_capacity_override: Option<u32>,
    ) -> ApiResult<()> {
        sqlx::query(
            "UPDATE duty_slots SET manual_capacity_override = ?, version = version + 1
             WHERE id = ?",
        )
        .bind(manual_capacity_override.map(|value| value as i64))
        .bind(duty_slot_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Capacity override for duty slot {} set to {:?}",
            duty_slot_id,
            manual_capacity_override
        );

        Ok(())
    }

    pub async fn list_batch_audits(&self, drive_id: &str) -> ApiResult<Vec<BatchAudit>> {
        let rows = sqlx::query(
            "SELECT batch_id, drive_id, actor_id, assigned_count, waitlisted_count,
                    none_count, failed_count, started_at, finished_at
             FROM batch_audits WHERE drive_id = ? ORDER BY started_at ASC",
        )
        .bind(drive_id)
        .fetch_all(&self.pool)
        .await?;

        let mut audits = Vec::with_capacity(rows.len());
        for row in rows {
            audits.push(BatchAudit {
                batch_id: row.try_get("batch_id")?,
                drive_id: row.try_get("drive_id")?,
                actor_id: row.try_get("actor_id")?,
                assigned_count: row.try_get("assigned_count")?,
                waitlisted_count: row.try_get("waitlisted_count")?,
                none_count: row.try_get("none_count")?,
                failed_count: row.try_get("failed_count")?,
                started_at: row.try_get("started_at")?,
                finished_at: row.try_get("finished_at")?,
            });
        }
        Ok(audits)
    }
}
