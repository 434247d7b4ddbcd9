use participium_core::models::Officer;
use participium_core::AppError;
use sqlx::PgPool;

use super::is_unique_violation;

/// Repository for municipality officers.
#[derive(Clone)]
pub struct OfficerRepository {
    pool: PgPool,
}

impl OfficerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        username: &str,
        email: &str,
        department: &str,
    ) -> Result<Officer, AppError> {
        let officer = sqlx::query_as::<_, Officer>(
            r#"
            INSERT INTO officers (id, username, email, department)
            VALUES (gen_random_uuid(), $1, $2, $3)
            RETURNING id, username, email, department, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(department)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Officer username already in use: {}", username))
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(officer)
    }

    /// List officers, optionally filtered by department.
    pub async fn list(&self, department: Option<&str>) -> Result<Vec<Officer>, AppError> {
        let officers = sqlx::query_as::<_, Officer>(
            r#"
            SELECT id, username, email, department, created_at
            FROM officers
            WHERE $1::text IS NULL OR department = $1
            ORDER BY username
            "#,
        )
        .bind(department)
        .fetch_all(&self.pool)
        .await?;

        Ok(officers)
    }

    /// Pick the officer in the department with the fewest non-terminal
    /// assigned reports. The tie-break among equally loaded officers is
    /// whatever row the planner returns first; callers must not rely on it.
    pub async fn least_loaded_in_department(
        &self,
        department: &str,
    ) -> Result<Officer, AppError> {
        let officer = sqlx::query_as::<_, Officer>(
            r#"
            SELECT o.id, o.username, o.email, o.department, o.created_at
            FROM officers o
            LEFT JOIN reports r
              ON r.assigned_officer_id = o.id
             AND r.status NOT IN ('resolved', 'rejected')
            WHERE o.department = $1
            GROUP BY o.id, o.username, o.email, o.department, o.created_at
            ORDER BY COUNT(r.id) ASC
            LIMIT 1
            "#,
        )
        .bind(department)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NoOfficersAvailable(department.to_string()))?;

        Ok(officer)
    }
}
