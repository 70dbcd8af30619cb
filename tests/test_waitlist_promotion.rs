// Integration tests for waitlist promotion and cancellation
use dutyroster::domain::entities::{AssignmentOutcome, AssignmentStatus};
use dutyroster::domain::ports::assignment_store::AssignmentStore;
use dutyroster::infrastructure::http::middleware::ApiError;
use std::sync::Arc;

mod helpers;
use helpers::*;

fn assignment_id(outcome: &AssignmentOutcome) -> String {
    outcome
        .assignment_id()
        .expect("outcome should carry an assignment")
        .to_string()
}

#[tokio::test]
async fn test_waitlisted_volunteer_promoted_after_cancellation() {
    let db = setup_test_db().await;
    let drive = create_test_drive(&db, "Community Garden").await;
    let slot = create_test_slot(&db, &drive.id, "Planting", 2, 0).await;
    let store = store_of(&db);
    let engine = engine_for(store.clone());
    let promoter = promoter_for(store.clone());
    let cancellation = cancellation_for(store.clone(), event_bus());

    let v1 = engine.assign("v1", &drive.id).await.unwrap();
    assert!(v1.is_assigned());
    assert!(engine.assign("v2", &drive.id).await.unwrap().is_assigned());
    let v3 = engine.assign("v3", &drive.id).await.unwrap();
    assert!(v3.is_waitlisted());

    // Nothing freed yet
    let report = promoter.promote(&drive.id).await.unwrap();
    assert_eq!(report.promoted().count(), 0);
    assert!(report.results.is_empty());
    assert_eq!(count_status(&db, &slot.id, "waitlisted").await, 1);

    cancellation
        .cancel_assignment(&assignment_id(&v1), "coordinator")
        .await
        .unwrap();

    let report = promoter.promote(&drive.id).await.unwrap();
    let promoted: Vec<_> = report.promoted().collect();
    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].volunteer_id.as_deref(), Some("v3"));

    let v3_row = store
        .get_assignment(&assignment_id(&v3))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(v3_row.status, AssignmentStatus::Assigned);
    assert_eq!(count_status(&db, &slot.id, "assigned").await, 2);
}

#[tokio::test]
async fn test_promotion_is_first_in_first_out() {
    let db = setup_test_db().await;
    let drive = create_test_drive(&db, "Toy Drive").await;
    let slot = create_test_slot(&db, &drive.id, "Wrapping", 1, 0).await;
    let store = store_of(&db);
    let engine = engine_for(store.clone());
    let promoter = promoter_for(store.clone());
    let cancellation = cancellation_for(store.clone(), event_bus());

    let holder = engine.assign("holder", &drive.id).await.unwrap();
    for volunteer in ["t1", "t2", "t3"] {
        assert!(engine.assign(volunteer, &drive.id).await.unwrap().is_waitlisted());
    }

    cancellation
        .cancel_assignment(&assignment_id(&holder), "coordinator")
        .await
        .unwrap();
    let report = promoter.promote(&drive.id).await.unwrap();

    let promoted: Vec<_> = report.promoted().collect();
    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].volunteer_id.as_deref(), Some("t1"));

    let waitlist = store.list_waitlisted(&slot.id).await.unwrap();
    let remaining: Vec<_> = waitlist.iter().map(|a| a.volunteer_id.as_str()).collect();
    assert_eq!(remaining, vec!["t2", "t3"]);
}

#[tokio::test]
async fn test_raised_override_promotes_several() {
    let db = setup_test_db().await;
    let drive = create_test_drive(&db, "Blood Drive").await;
    let slot = create_test_slot(&db, &drive.id, "Check-in", 1, 0).await;
    let store = store_of(&db);
    let engine = engine_for(store.clone());
    let promoter = promoter_for(store.clone());

    for volunteer in ["v1", "v2", "v3", "v4"] {
        engine.assign(volunteer, &drive.id).await.unwrap();
    }
    assert_eq!(count_status(&db, &slot.id, "waitlisted").await, 3);

    db.update_capacity_override(&slot.id, Some(3)).await.unwrap();
    let report = promoter.promote(&drive.id).await.unwrap();

    let promoted: Vec<_> = report
        .promoted()
        .filter_map(|r| r.volunteer_id.clone())
        .collect();
    assert_eq!(promoted, vec!["v2".to_string(), "v3".to_string()]);
    assert_eq!(count_status(&db, &slot.id, "assigned").await, 3);
    assert_eq!(count_status(&db, &slot.id, "waitlisted").await, 1);
}

#[tokio::test]
async fn test_cancelling_waitlisted_entry_frees_no_capacity() {
    let db = setup_test_db().await;
    let drive = create_test_drive(&db, "Toy Drive").await;
    let slot = create_test_slot(&db, &drive.id, "Wrapping", 1, 0).await;
    let store = store_of(&db);
    let engine = engine_for(store.clone());
    let promoter = promoter_for(store.clone());
    let cancellation = cancellation_for(store.clone(), event_bus());

    engine.assign("v1", &drive.id).await.unwrap();
    let v2 = engine.assign("v2", &drive.id).await.unwrap();
    engine.assign("v3", &drive.id).await.unwrap();

    let cancelled = cancellation
        .cancel_assignment(&assignment_id(&v2), "v2")
        .await
        .unwrap();
    assert_eq!(cancelled.status, AssignmentStatus::Cancelled);

    let report = promoter.promote(&drive.id).await.unwrap();
    assert_eq!(report.promoted().count(), 0);
    assert_eq!(count_status(&db, &slot.id, "assigned").await, 1);

    // v3 moved up the queue
    let again = engine.assign("v3", &drive.id).await.unwrap();
    match again {
        AssignmentOutcome::Waitlisted { position, .. } => assert_eq!(position, Some(1)),
        other => panic!("expected waitlisted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_waitlisted_volunteer_not_moved_to_other_slot() {
    let db = setup_test_db().await;
    let drive = create_test_drive(&db, "River Cleanup").await;
    let boats = create_test_slot(&db, &drive.id, "Boats", 1, 0).await;
    let store = store_of(&db);
    let engine = engine_for(store.clone());
    let promoter = promoter_for(store.clone());

    engine.assign("v1", &drive.id).await.unwrap();
    let waiting = engine.assign("v2", &drive.id).await.unwrap();
    assert!(waiting.is_waitlisted());

    // A new slot with room appears later
    let banks = create_test_slot(&db, &drive.id, "Banks", 5, 1).await;
    let report = promoter.promote(&drive.id).await.unwrap();

    assert_eq!(report.promoted().count(), 0);
    assert_eq!(count_status(&db, &boats.id, "waitlisted").await, 1);
    assert_eq!(count_status(&db, &banks.id, "assigned").await, 0);
}

#[tokio::test]
async fn test_promotion_retries_lost_race() {
    let db = setup_test_db().await;
    let drive = create_test_drive(&db, "Book Swap").await;
    let slot = create_test_slot(&db, &drive.id, "Tables", 1, 0).await;
    let engine = engine_for(store_of(&db));

    let holder = engine.assign("v1", &drive.id).await.unwrap();
    engine.assign("v2", &drive.id).await.unwrap();
    cancellation_for(store_of(&db), event_bus())
        .cancel_assignment(&assignment_id(&holder), "coordinator")
        .await
        .unwrap();

    let faulty = Arc::new(FaultStore::new(store_of(&db)).with_conflicts(1));
    let promoter = promoter_for(faulty as Arc<dyn AssignmentStore>);
    let report = promoter.promote(&drive.id).await.unwrap();

    assert_eq!(report.promoted().count(), 1);
    assert_eq!(report.failures().count(), 0);
    assert_eq!(count_status(&db, &slot.id, "assigned").await, 1);
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let db = setup_test_db().await;
    let drive = create_test_drive(&db, "Toy Drive").await;
    create_test_slot(&db, &drive.id, "Wrapping", 1, 0).await;
    let store = store_of(&db);
    let engine = engine_for(store.clone());
    let cancellation = cancellation_for(store.clone(), event_bus());

    let outcome = engine.assign("v1", &drive.id).await.unwrap();
    let id = assignment_id(&outcome);

    let first = cancellation.cancel_assignment(&id, "v1").await.unwrap();
    let second = cancellation.cancel_assignment(&id, "v1").await.unwrap();
    assert_eq!(first.status, AssignmentStatus::Cancelled);
    assert_eq!(second.status, AssignmentStatus::Cancelled);
    assert_eq!(first.updated_at, second.updated_at);

    // Cancelled volunteers can sign up again
    let fresh = engine.assign("v1", &drive.id).await.unwrap();
    assert!(fresh.is_assigned());
    assert_ne!(fresh.assignment_id(), Some(id.as_str()));
    assert_eq!(count_rows(&db, "v1", &drive.id).await, 2);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let db = setup_test_db().await;
    let store = store_of(&db);

    assert!(matches!(
        promoter_for(store.clone()).promote("no-such-drive").await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        cancellation_for(store, event_bus())
            .cancel_assignment("no-such-assignment", "admin")
            .await,
        Err(ApiError::NotFound(_))
    ));
}
