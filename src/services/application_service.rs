use sqlx::{PgConnection, PgPool};

use crate::database::changeset::{insert_returning, update_returning, Changeset, SqlValue};
use crate::database::listing::{fetch_page, ListQuery, Page};
use crate::database::records::{
    breakdown, count_all, count_since, delete_by_id, exists, find_by_id, find_for_update,
};
use crate::database::uniqueness::{ensure_unique, UniqueKey};
use crate::dto::application_dto::{
    ApplicationListQuery, CreateApplicationPayload, UpdateApplicationPayload,
};
use crate::dto::stats_dto::ApplicationStats;
use crate::error::{Error, Result};
use crate::models::application::JobApplication;
use crate::utils::time::{days_ago, now};
use crate::utils::validation::{APPLICATION_STATUSES, PRIORITIES};

const TABLE: &str = "job_applications";
const ENTITY: &str = "Job application";

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

/// A candidate applies to a given job at most once.
fn pair_key(job_id: i32, candidate_id: i32) -> UniqueKey {
    UniqueKey::pair(
        "job_id, candidate_id",
        ("job_id", SqlValue::Int(Some(job_id))),
        ("candidate_id", SqlValue::Int(Some(candidate_id))),
    )
}

async fn ensure_parents(conn: &mut PgConnection, changes: &Changeset) -> Result<()> {
    if let Some(job_id) = changes.get("job_id").and_then(SqlValue::as_int) {
        if !exists(&mut *conn, "jobs", job_id).await? {
            return Err(Error::not_found("Job"));
        }
    }
    if let Some(candidate_id) = changes.get("candidate_id").and_then(SqlValue::as_int) {
        if !exists(&mut *conn, "candidates", candidate_id).await? {
            return Err(Error::not_found("Candidate"));
        }
    }
    Ok(())
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateApplicationPayload, caller_id: i32) -> Result<JobApplication> {
        let (job_id, candidate_id) = (payload.job_id, payload.candidate_id);
        let mut changes = payload.into_changeset(caller_id)?;
        changes.value("applied_at", now());

        let mut tx = self.pool.begin().await?;
        ensure_parents(&mut tx, &changes).await?;
        ensure_unique(&mut tx, TABLE, &[pair_key(job_id, candidate_id)], None).await?;
        let application: JobApplication = insert_returning(&mut tx, TABLE, &changes).await?;
        tx.commit().await?;

        tracing::info!(
            application_id = application.id,
            job_id,
            candidate_id,
            "Job application submitted"
        );
        Ok(application)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<JobApplication> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))
    }

    pub async fn list(&self, query: ApplicationListQuery) -> Result<Page<JobApplication>> {
        let list = ListQuery::new(query.page())
            .text_eq("status", query.status)
            .text_eq("priority", query.priority)
            .int_eq("job_id", query.job_id)
            .int_eq("candidate_id", query.candidate_id);
        fetch_page(&self.pool, TABLE, "applied_at DESC, id DESC", &list).await
    }

    pub async fn update(&self, id: i32, payload: UpdateApplicationPayload) -> Result<JobApplication> {
        let mut changes = payload.into_changeset()?;
        changes.touch(now());

        let mut tx = self.pool.begin().await?;
        let existing = find_for_update::<JobApplication>(&mut tx, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        ensure_parents(&mut tx, &changes).await?;
        if changes.contains("job_id") || changes.contains("candidate_id") {
            let job_id = changes.get("job_id").and_then(SqlValue::as_int).unwrap_or(existing.job_id);
            let candidate_id = changes
                .get("candidate_id")
                .and_then(SqlValue::as_int)
                .unwrap_or(existing.candidate_id);
            ensure_unique(&mut tx, TABLE, &[pair_key(job_id, candidate_id)], Some(id)).await?;
        }
        let application = update_returning::<JobApplication>(&mut tx, TABLE, id, &changes)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        tx.commit().await?;

        tracing::info!(application_id = id, columns = changes.len(), "Job application updated");
        Ok(application)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if !delete_by_id(&mut tx, TABLE, id).await? {
            return Err(Error::not_found(ENTITY));
        }
        tx.commit().await?;
        tracing::info!(application_id = id, "Job application deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<ApplicationStats> {
        Ok(ApplicationStats {
            total_applications: count_all(&self.pool, TABLE).await?,
            status_breakdown: breakdown(&self.pool, TABLE, "status", APPLICATION_STATUSES).await?,
            priority_breakdown: breakdown(&self.pool, TABLE, "priority", PRIORITIES).await?,
            recent_applications: count_since(&self.pool, TABLE, "applied_at", days_ago(30)).await?,
            generated_at: now(),
        })
    }
}
