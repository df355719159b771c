use sqlx::{PgConnection, PgPool};

use crate::database::changeset::{insert_returning, update_returning, Changeset, SqlValue};
use crate::database::listing::{fetch_page, ListQuery, Page};
use crate::database::records::{
    breakdown, count_all, count_since, delete_by_id, exists, find_by_id, find_for_update,
};
use crate::database::uniqueness::{ensure_unique, UniqueKey};
use crate::dto::enrollment_dto::{
    CreateEnrollmentPayload, EnrollmentListQuery, UpdateEnrollmentPayload, STATUS_ENROLLED,
    STATUS_IN_PROGRESS,
};
use crate::dto::stats_dto::EnrollmentStats;
use crate::error::{Error, Result};
use crate::models::course::Course;
use crate::models::enrollment::Enrollment;
use crate::utils::time::{days_ago, now};
use crate::utils::validation::{ENROLLMENT_STATUSES, PAYMENT_STATUSES};

const TABLE: &str = "enrollments";
const ENTITY: &str = "Enrollment";

#[derive(Clone)]
pub struct EnrollmentService {
    pool: PgPool,
}

fn pair_key(course_id: i32, candidate_id: i32) -> UniqueKey {
    UniqueKey::pair(
        "course_id, candidate_id",
        ("course_id", SqlValue::Int(Some(course_id))),
        ("candidate_id", SqlValue::Int(Some(candidate_id))),
    )
}

async fn ensure_candidate(conn: &mut PgConnection, candidate_id: i32) -> Result<()> {
    if exists(conn, "candidates", candidate_id).await? {
        Ok(())
    } else {
        Err(Error::not_found("Candidate"))
    }
}

impl EnrollmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enrolls a candidate; fees default to the course price when not given.
    pub async fn create(&self, payload: CreateEnrollmentPayload, caller_id: i32) -> Result<Enrollment> {
        let (course_id, candidate_id) = (payload.course_id, payload.candidate_id);

        let mut tx = self.pool.begin().await?;
        let course = find_by_id::<Course>(&mut tx, "courses", course_id)
            .await?
            .ok_or_else(|| Error::not_found("Course"))?;
        ensure_candidate(&mut tx, candidate_id).await?;
        ensure_unique(&mut tx, TABLE, &[pair_key(course_id, candidate_id)], None).await?;

        let at = now();
        let mut changes = payload.into_changeset(caller_id, course.price, at)?;
        changes.value("enrollment_date", at);
        let enrollment: Enrollment = insert_returning(&mut tx, TABLE, &changes).await?;
        tx.commit().await?;

        tracing::info!(
            enrollment_id = enrollment.id,
            course_id,
            candidate_id,
            status = %enrollment.status,
            "Candidate enrolled"
        );
        Ok(enrollment)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Enrollment> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))
    }

    pub async fn list(&self, query: EnrollmentListQuery) -> Result<Page<Enrollment>> {
        let list = ListQuery::new(query.page())
            .text_eq("status", query.status)
            .text_eq("payment_status", query.payment_status)
            .int_eq("course_id", query.course_id)
            .int_eq("candidate_id", query.candidate_id);
        fetch_page(&self.pool, TABLE, "enrollment_date DESC, id DESC", &list).await
    }

    /// Applies the progress rules against the locked row, so concurrent
    /// completions stamp `completed_at` once.
    pub async fn update(&self, id: i32, payload: UpdateEnrollmentPayload) -> Result<Enrollment> {
        let mut tx = self.pool.begin().await?;
        let existing = find_for_update::<Enrollment>(&mut tx, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;

        let at = now();
        let mut changes: Changeset = payload.into_changeset(&existing.status, at)?;
        changes.touch(at);

        if changes.contains("course_id") || changes.contains("candidate_id") {
            let course_id = changes
                .get("course_id")
                .and_then(SqlValue::as_int)
                .unwrap_or(existing.course_id);
            let candidate_id = changes
                .get("candidate_id")
                .and_then(SqlValue::as_int)
                .unwrap_or(existing.candidate_id);
            if course_id != existing.course_id && !exists(&mut tx, "courses", course_id).await? {
                return Err(Error::not_found("Course"));
            }
            if candidate_id != existing.candidate_id {
                ensure_candidate(&mut tx, candidate_id).await?;
            }
            ensure_unique(&mut tx, TABLE, &[pair_key(course_id, candidate_id)], Some(id)).await?;
        }

        let enrollment = update_returning::<Enrollment>(&mut tx, TABLE, id, &changes)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        tx.commit().await?;

        if enrollment.status != existing.status {
            tracing::info!(
                enrollment_id = id,
                from = %existing.status,
                to = %enrollment.status,
                "Enrollment status changed"
            );
        }
        tracing::info!(enrollment_id = id, columns = changes.len(), "Enrollment updated");
        Ok(enrollment)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if !delete_by_id(&mut tx, TABLE, id).await? {
            return Err(Error::not_found(ENTITY));
        }
        tx.commit().await?;
        tracing::info!(enrollment_id = id, "Enrollment deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<EnrollmentStats> {
        let average: Option<f64> = sqlx::query_scalar(&format!(
            "SELECT AVG(progress)::FLOAT8 FROM {} WHERE status IN ('{}', '{}')",
            TABLE, STATUS_ENROLLED, STATUS_IN_PROGRESS
        ))
        .fetch_one(&self.pool)
        .await?;

        Ok(EnrollmentStats {
            total_enrollments: count_all(&self.pool, TABLE).await?,
            status_breakdown: breakdown(&self.pool, TABLE, "status", ENROLLMENT_STATUSES).await?,
            payment_breakdown: breakdown(&self.pool, TABLE, "payment_status", PAYMENT_STATUSES).await?,
            recent_enrollments: count_since(&self.pool, TABLE, "enrollment_date", days_ago(30)).await?,
            average_progress: round_two(average.unwrap_or(0.0)),
            generated_at: now(),
        })
    }
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_is_rounded_to_two_places() {
        assert_eq!(round_two(33.333_333), 33.33);
        assert_eq!(round_two(66.666_7), 66.67);
        assert_eq!(round_two(0.0), 0.0);
    }
}
