use dutyroster::infrastructure::persistence::Database;
use std::ops::Deref;
use tempfile::TempDir;

/// File-backed SQLite database that lives as long as this handle
pub struct TestDb {
    pub db: Database,
    _dir: TempDir,
}

impl Deref for TestDb {
    type Target = Database;

    fn deref(&self) -> &Database {
        &self.db
    }
}

pub async fn setup_test_db() -> TestDb {
    // File-based SQLite so pooled connections share one database (unique dir per test)
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("roster.db").display());

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    TestDb { db, _dir: dir }
}
