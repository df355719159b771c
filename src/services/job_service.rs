use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::changeset::{insert_returning, update_returning, Changeset};
use crate::database::listing::{fetch_page, ListQuery, Page};
use crate::database::records::{find_by_id, find_for_update};
use crate::dto::job_dto::{CreateJobPayload, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::Job;
use crate::utils::time::now;

const TABLE: &str = "jobs";
const ENTITY: &str = "Job";
const CLOSED: &str = "closed";
const DEFAULT_LIST_STATUS: &str = "active";

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

/// Jobs keep a separate `last_updated` column that moves with `updated_at`.
fn stamp(changes: &mut Changeset, at: DateTime<Utc>) {
    changes.touch(at);
    changes.value("last_updated", at);
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateJobPayload, caller_id: i32) -> Result<Job> {
        let changes = payload.into_changeset(caller_id)?;
        let mut tx = self.pool.begin().await?;
        let job: Job = insert_returning(&mut tx, TABLE, &changes).await?;
        tx.commit().await?;

        tracing::info!(job_id = job.id, company = %job.company_name, "Job posted");
        Ok(job)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Job> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))
    }

    pub async fn list(&self, query: JobListQuery) -> Result<Page<Job>> {
        let status = match query.status.as_deref() {
            Some("all") => None,
            Some(s) => Some(s.to_string()),
            None => Some(DEFAULT_LIST_STATUS.to_string()),
        };
        let list = ListQuery::new(query.page())
            .text_eq("status", status)
            .text_eq("job_type", query.job_type)
            .text_eq("work_mode", query.work_mode)
            .text_eq("priority", query.priority)
            .search(&["company_name"], query.company_name)
            .search(&["city"], query.city)
            .search(&["job_title", "job_description", "company_name", "role"], query.search)
            .range("salary_min", query.salary_min, None)
            .range("salary_max", None, query.salary_max);
        fetch_page(&self.pool, TABLE, "date_posted DESC, id DESC", &list).await
    }

    pub async fn update(&self, id: i32, payload: UpdateJobPayload) -> Result<Job> {
        let mut changes = payload.into_changeset()?;
        stamp(&mut changes, now());
        self.write(id, changes).await
    }

    /// Closing keeps the posting and its applications.
    pub async fn delete(&self, id: i32) -> Result<Job> {
        let mut changes = Changeset::new();
        changes.value("status", CLOSED.to_string());
        stamp(&mut changes, now());
        let job = self.write(id, changes).await?;
        tracing::info!(job_id = id, "Job closed");
        Ok(job)
    }

    async fn write(&self, id: i32, changes: Changeset) -> Result<Job> {
        let mut tx = self.pool.begin().await?;
        find_for_update::<Job>(&mut tx, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        let job = update_returning::<Job>(&mut tx, TABLE, id, &changes)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        tx.commit().await?;

        tracing::info!(job_id = id, columns = changes.len(), "Job updated");
        Ok(job)
    }
}
