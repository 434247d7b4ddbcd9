use participium_core::models::{Category, Report, ReportStatus};
use participium_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

/// Fields required to create a report.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub latitude: f64,
    pub longitude: f64,
    pub anonymous: bool,
    pub reporter: Option<String>,
}

/// Repository for citizen-submitted reports.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a report and claim its photos in one transaction.
    ///
    /// Claiming sets `report_id` on photos that are still unclaimed; if any
    /// referenced id is unknown or already belongs to another report the
    /// transaction rolls back. Whether the photos finished uploading is not
    /// checked here; that race stays open by design.
    pub async fn create(&self, new: NewReport, photo_ids: &[String]) -> Result<Report, AppError> {
        let mut tx = self.pool.begin().await?;

        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (
                id, title, description, category, latitude, longitude,
                anonymous, reporter, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending_approval')
            RETURNING id, title, description, category, latitude, longitude,
                      anonymous, reporter, status, assigned_officer_id,
                      rejection_reason, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.category)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.anonymous)
        .bind(&new.reporter)
        .fetch_one(&mut *tx)
        .await?;

        let claimed = sqlx::query(
            r#"
            UPDATE photos
            SET report_id = $1, updated_at = NOW()
            WHERE id = ANY($2) AND report_id IS NULL
            "#,
        )
        .bind(report.id)
        .bind(photo_ids)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() != photo_ids.len() as u64 {
            // tx dropped here rolls everything back
            return Err(AppError::InvalidInput(
                "One or more photo ids are unknown or already attached to a report".to_string(),
            ));
        }

        tx.commit().await?;

        tracing::info!(
            report_id = %report.id,
            category = ?report.category,
            photos = photo_ids.len(),
            "Report created"
        );

        Ok(report)
    }

    /// Get a report by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, title, description, category, latitude, longitude,
                   anonymous, reporter, status, assigned_officer_id,
                   rejection_reason, created_at, updated_at
            FROM reports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }

    /// List reports, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<ReportStatus>) -> Result<Vec<Report>, AppError> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, title, description, category, latitude, longitude,
                   anonymous, reporter, status, assigned_officer_id,
                   rejection_reason, created_at, updated_at
            FROM reports
            WHERE $1::report_status IS NULL OR status = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    /// Assign the report to an officer and mark it assigned.
    pub async fn assign(&self, id: Uuid, officer_id: Uuid) -> Result<Report, AppError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports
            SET assigned_officer_id = $2, status = 'assigned', updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, category, latitude, longitude,
                      anonymous, reporter, status, assigned_officer_id,
                      rejection_reason, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(officer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report not found: {}", id)))?;

        Ok(report)
    }

    /// Mark the report rejected with the given reason.
    pub async fn reject(&self, id: Uuid, reason: &str) -> Result<Report, AppError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports
            SET status = 'rejected', rejection_reason = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, category, latitude, longitude,
                      anonymous, reporter, status, assigned_officer_id,
                      rejection_reason, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report not found: {}", id)))?;

        Ok(report)
    }
}
