use sqlx::PgPool;

use crate::database::changeset::{insert_returning, update_returning};
use crate::database::listing::{fetch_page, ListQuery, Page};
use crate::database::records::{breakdown, count_all, count_since, delete_by_id, find_by_id, find_for_update};
use crate::database::uniqueness::{ensure_unique, UniqueKey};
use crate::dto::candidate_dto::{CandidateListQuery, CreateCandidatePayload, UpdateCandidatePayload};
use crate::dto::stats_dto::CandidateStats;
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::utils::crypto::hash_password;
use crate::utils::time::{days_ago, now};
use crate::utils::validation::{CANDIDATE_STATUSES, PRIORITIES};

const TABLE: &str = "candidates";
const ENTITY: &str = "Candidate";
const UNIQUE_COLUMNS: &[&str] = &["email", "phone_number"];

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
}

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateCandidatePayload) -> Result<Candidate> {
        let hashed = hash_password(&payload.password)?;
        let changes = payload.into_changeset(hashed)?;

        let mut tx = self.pool.begin().await?;
        ensure_unique(&mut tx, TABLE, &UniqueKey::from_changes(&changes, UNIQUE_COLUMNS), None).await?;
        let candidate: Candidate = insert_returning(&mut tx, TABLE, &changes).await?;
        tx.commit().await?;

        tracing::info!(candidate_id = candidate.id, "Candidate created");
        Ok(candidate)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Candidate> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))
    }

    pub async fn list(&self, query: CandidateListQuery) -> Result<Page<Candidate>> {
        let list = ListQuery::new(query.page())
            .text_eq("status", query.status)
            .text_eq("priority", query.priority)
            .search(&["full_name", "email", "phone_number"], query.search)
            .range("total_experience_years", query.experience_min, query.experience_max);
        fetch_page(&self.pool, TABLE, "created_at DESC, id DESC", &list).await
    }

    pub async fn update(&self, id: i32, payload: UpdateCandidatePayload) -> Result<Candidate> {
        let hashed = match payload.new_password()? {
            Some(plain) => Some(hash_password(plain)?),
            None => None,
        };
        let mut changes = payload.into_changeset(hashed)?;
        changes.touch(now());

        let mut tx = self.pool.begin().await?;
        find_for_update::<Candidate>(&mut tx, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        ensure_unique(&mut tx, TABLE, &UniqueKey::from_changes(&changes, UNIQUE_COLUMNS), Some(id)).await?;
        let candidate = update_returning::<Candidate>(&mut tx, TABLE, id, &changes)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        tx.commit().await?;

        tracing::info!(candidate_id = id, columns = changes.len(), "Candidate updated");
        Ok(candidate)
    }

    /// Hard delete; applications and enrollments of the candidate cascade.
    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if !delete_by_id(&mut tx, TABLE, id).await? {
            return Err(Error::not_found(ENTITY));
        }
        tx.commit().await?;
        tracing::info!(candidate_id = id, "Candidate deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<CandidateStats> {
        Ok(CandidateStats {
            total_candidates: count_all(&self.pool, TABLE).await?,
            status_breakdown: breakdown(&self.pool, TABLE, "status", CANDIDATE_STATUSES).await?,
            priority_breakdown: breakdown(&self.pool, TABLE, "priority", PRIORITIES).await?,
            recent_candidates: count_since(&self.pool, TABLE, "created_at", days_ago(30)).await?,
            generated_at: now(),
        })
    }
}
