//! Repository tests against a migrated PostgreSQL database.
//!
//! Each test gets its own database via `sqlx::test`, so writes in one test
//! never leak into another. `DATABASE_URL` must point at a reachable server.

use participium_core::models::{Category, ReportStatus};
use participium_core::AppError;
use participium_db::{NewReport, OfficerRepository, PhotoRepository, ReportRepository};
use sqlx::PgPool;

fn sample_report(title: &str) -> NewReport {
    NewReport {
        title: title.to_string(),
        description: "The light on the corner has been out for a week".to_string(),
        category: Category::PublicLighting,
        latitude: 45.07,
        longitude: 7.69,
        anonymous: false,
        reporter: Some("user-42".to_string()),
    }
}

async fn insert_photo(photos: &PhotoRepository, id: &str) {
    photos
        .create(
            id,
            1024,
            1024,
            &format!("photos/{}", id),
            &format!("http://localhost:3000/photos/photos/{}", id),
            "pothole.jpg",
            "image/jpeg",
        )
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn reused_photo_id_conflicts_and_leaves_original_untouched(pool: PgPool) {
    let photos = PhotoRepository::new(pool);

    let original = photos
        .create(
            "photo-1",
            1024,
            512,
            "photos/photo-1",
            "http://localhost:3000/photos/photos/photo-1",
            "pothole.jpg",
            "image/jpeg",
        )
        .await
        .unwrap();

    let err = photos
        .create(
            "photo-1",
            2048,
            0,
            "photos/photo-1-other",
            "http://localhost:3000/photos/photos/photo-1-other",
            "other.jpg",
            "image/png",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The losing insert must not have altered the reserved session.
    let row = photos.get("photo-1").await.unwrap().unwrap();
    assert_eq!(row.declared_length, original.declared_length);
    assert_eq!(row.received_offset, original.received_offset);
    assert_eq!(row.storage_key, original.storage_key);
    assert_eq!(row.filename, original.filename);
}

#[sqlx::test(migrations = "../../migrations")]
async fn assignment_on_empty_department_fails_without_writing(pool: PgPool) {
    let officers = OfficerRepository::new(pool.clone());
    let reports = ReportRepository::new(pool);

    let report = reports.create(sample_report("Dark street"), &[]).await.unwrap();

    let err = officers
        .least_loaded_in_department("public_lighting")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoOfficersAvailable(ref d) if d == "public_lighting"));

    // Selection failed before any assignment, so the report is untouched.
    let unchanged = reports.get(report.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, ReportStatus::PendingApproval);
    assert!(unchanged.assigned_officer_id.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn least_loaded_officer_wins(pool: PgPool) {
    let officers = OfficerRepository::new(pool.clone());
    let reports = ReportRepository::new(pool);

    let busy = officers
        .create("alice", "alice@example.org", "roads")
        .await
        .unwrap();
    let idle = officers
        .create("bob", "bob@example.org", "roads")
        .await
        .unwrap();

    for title in ["Pothole A", "Pothole B"] {
        let report = reports.create(sample_report(title), &[]).await.unwrap();
        reports.assign(report.id, busy.id).await.unwrap();
    }

    let picked = officers.least_loaded_in_department("roads").await.unwrap();
    assert_eq!(picked.id, idle.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn terminal_reports_do_not_count_toward_load(pool: PgPool) {
    let officers = OfficerRepository::new(pool.clone());
    let reports = ReportRepository::new(pool);

    let rejected_only = officers
        .create("alice", "alice@example.org", "roads")
        .await
        .unwrap();
    let active = officers
        .create("bob", "bob@example.org", "roads")
        .await
        .unwrap();

    let done = reports.create(sample_report("Fixed already"), &[]).await.unwrap();
    reports.assign(done.id, rejected_only.id).await.unwrap();
    reports.reject(done.id, "duplicate of an earlier report").await.unwrap();

    let open = reports.create(sample_report("Still broken"), &[]).await.unwrap();
    reports.assign(open.id, active.id).await.unwrap();

    // alice carries only a rejected report, so her effective load is zero.
    let picked = officers.least_loaded_in_department("roads").await.unwrap();
    assert_eq!(picked.id, rejected_only.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn abandoned_sweep_spares_claimed_and_recent_photos(pool: PgPool) {
    let photos = PhotoRepository::new(pool.clone());
    let reports = ReportRepository::new(pool.clone());

    insert_photo(&photos, "stale-unclaimed").await;
    insert_photo(&photos, "stale-claimed").await;
    insert_photo(&photos, "fresh-unclaimed").await;

    reports
        .create(sample_report("With photo"), &["stale-claimed".to_string()])
        .await
        .unwrap();

    sqlx::query("UPDATE photos SET created_at = NOW() - interval '48 hours' WHERE id = ANY($1)")
        .bind(vec!["stale-unclaimed".to_string(), "stale-claimed".to_string()])
        .execute(&pool)
        .await
        .unwrap();

    let swept = photos.delete_abandoned(24).await.unwrap();
    assert_eq!(swept, vec!["photos/stale-unclaimed".to_string()]);

    assert!(photos.get("stale-unclaimed").await.unwrap().is_none());
    assert!(photos.get("stale-claimed").await.unwrap().is_some());
    assert!(photos.get("fresh-unclaimed").await.unwrap().is_some());
}
