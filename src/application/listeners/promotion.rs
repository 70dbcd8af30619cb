use crate::application::services::WaitlistPromoter;
use crate::domain::entities::AssignmentOutcome;
use crate::domain::events::RosterEvent;
use crate::domain::ports::event_bus::EventBus;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::shared::utils::now_timestamp;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;

/// Starts the background task that promotes waitlisted volunteers whenever
/// capacity is freed.
///
/// The subscription is taken before the task is spawned so an event published
/// right after this returns is not missed.
pub fn spawn_promotion_listener(
    event_bus: Arc<dyn EventBus>,
    promoter: WaitlistPromoter,
) -> JoinHandle<()> {
    let mut receiver = event_bus.subscribe();

    tokio::spawn(async move {
        tracing::info!("Promotion listener started");

        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(RosterEvent::CapacityFreed {
                    drive_id,
                    duty_slot_id,
                    timestamp,
                }) => {
                    tracing::debug!(
                        "Capacity freed on duty slot {} in drive {} at {}",
                        duty_slot_id,
                        drive_id,
                        timestamp
                    );
                    if let Err(e) =
                        handle_capacity_freed(event_bus.as_ref(), &promoter, &drive_id).await
                    {
                        tracing::error!("Promotion run for drive {} failed: {}", drive_id, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    // Lagged receiver: some events were dropped, keep consuming
                    tracing::warn!("Promotion listener skipped events: {}", e);
                }
            }
        }

        tracing::info!("Promotion listener stopped");
    })
}

/// Runs promotion for the drive and announces every volunteer that moved up
pub async fn handle_capacity_freed(
    event_bus: &dyn EventBus,
    promoter: &WaitlistPromoter,
    drive_id: &str,
) -> ApiResult<()> {
    let report = promoter.promote(drive_id).await?;

    for result in report.promoted() {
        if let (
            Some(volunteer_id),
            AssignmentOutcome::Assigned {
                assignment_id,
                duty_slot_name,
                ..
            },
        ) = (&result.volunteer_id, &result.outcome)
        {
            event_bus.publish(RosterEvent::VolunteerPromoted {
                assignment_id: assignment_id.clone(),
                volunteer_id: volunteer_id.clone(),
                drive_id: drive_id.to_string(),
                duty_slot_name: duty_slot_name.clone(),
                timestamp: now_timestamp(),
            })?;
        }
    }

    Ok(())
}
