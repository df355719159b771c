use sqlx::PgPool;

use crate::database::changeset::{insert_returning, update_returning};
use crate::database::listing::{fetch_page, ListQuery, Page};
use crate::database::records::{breakdown, count_all, count_since, delete_by_id, find_by_id, find_for_update};
use crate::database::uniqueness::{ensure_unique, UniqueKey};
use crate::dto::enquiry_dto::{CreateEnquiryPayload, EnquiryListQuery, UpdateEnquiryPayload};
use crate::dto::stats_dto::EnquiryStats;
use crate::error::{Error, Result};
use crate::models::enquiry::Enquiry;
use crate::utils::time::{days_ago, now};
use crate::utils::validation::{ENQUIRY_STATUSES, PRIORITIES};

const TABLE: &str = "enquiries";
const ENTITY: &str = "Enquiry";
const UNIQUE_COLUMNS: &[&str] = &["email", "mobile"];

#[derive(Clone)]
pub struct EnquiryService {
    pool: PgPool,
}

impl EnquiryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateEnquiryPayload) -> Result<Enquiry> {
        let changes = payload.into_changeset()?;
        let mut tx = self.pool.begin().await?;
        ensure_unique(&mut tx, TABLE, &UniqueKey::from_changes(&changes, UNIQUE_COLUMNS), None).await?;
        let enquiry: Enquiry = insert_returning(&mut tx, TABLE, &changes).await?;
        tx.commit().await?;

        tracing::info!(enquiry_id = enquiry.id, "Enquiry received");
        Ok(enquiry)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Enquiry> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))
    }

    pub async fn list(&self, query: EnquiryListQuery) -> Result<Page<Enquiry>> {
        let list = ListQuery::new(query.page())
            .search(&["name", "email", "mobile"], query.search)
            .text_eq("status", query.status)
            .text_eq("priority", query.priority)
            .search(&["technology"], query.technology)
            .range("pass_out_year", query.year_min, query.year_max);
        fetch_page(&self.pool, TABLE, "created_at DESC, id DESC", &list).await
    }

    pub async fn update(&self, id: i32, payload: UpdateEnquiryPayload) -> Result<Enquiry> {
        let mut changes = payload.into_changeset()?;
        changes.touch(now());

        let mut tx = self.pool.begin().await?;
        find_for_update::<Enquiry>(&mut tx, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        ensure_unique(&mut tx, TABLE, &UniqueKey::from_changes(&changes, UNIQUE_COLUMNS), Some(id)).await?;
        let enquiry = update_returning::<Enquiry>(&mut tx, TABLE, id, &changes)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        tx.commit().await?;

        tracing::info!(enquiry_id = id, columns = changes.len(), "Enquiry updated");
        Ok(enquiry)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if !delete_by_id(&mut tx, TABLE, id).await? {
            return Err(Error::not_found(ENTITY));
        }
        tx.commit().await?;
        tracing::info!(enquiry_id = id, "Enquiry deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<EnquiryStats> {
        Ok(EnquiryStats {
            total_enquiries: count_all(&self.pool, TABLE).await?,
            status_breakdown: breakdown(&self.pool, TABLE, "status", ENQUIRY_STATUSES).await?,
            priority_breakdown: breakdown(&self.pool, TABLE, "priority", PRIORITIES).await?,
            year_breakdown: breakdown(&self.pool, TABLE, "pass_out_year", &[]).await?,
            recent_enquiries: count_since(&self.pool, TABLE, "created_at", days_ago(30)).await?,
            generated_at: now(),
        })
    }
}
