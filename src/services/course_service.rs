use sqlx::PgPool;

use crate::database::changeset::{insert_returning, update_returning, Changeset};
use crate::database::listing::{fetch_page, ListQuery, Page};
use crate::database::records::{find_by_id, find_for_update};
use crate::dto::course_dto::{CourseListQuery, CreateCoursePayload, UpdateCoursePayload};
use crate::error::{Error, Result};
use crate::models::course::Course;
use crate::utils::time::now;

const TABLE: &str = "courses";
const ENTITY: &str = "Course";
const ARCHIVED: &str = "archived";

/// Lists show published courses unless a status filter is given; `all` lifts it.
const DEFAULT_LIST_STATUS: &str = "published";

#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateCoursePayload) -> Result<Course> {
        let changes = payload.into_changeset()?;
        let mut tx = self.pool.begin().await?;
        let course: Course = insert_returning(&mut tx, TABLE, &changes).await?;
        tx.commit().await?;

        tracing::info!(course_id = course.id, name = %course.name, "Course created");
        Ok(course)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Course> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))
    }

    pub async fn list(&self, query: CourseListQuery) -> Result<Page<Course>> {
        let status = match query.status.as_deref() {
            Some("all") => None,
            Some(s) => Some(s.to_string()),
            None => Some(DEFAULT_LIST_STATUS.to_string()),
        };
        let list = ListQuery::new(query.page())
            .text_eq("status", status)
            .text_eq("category", query.category)
            .text_eq("level", query.level)
            .search(&["name", "description", "instructor"], query.search)
            .range("price", query.price_min, query.price_max);
        fetch_page(&self.pool, TABLE, "created_at DESC, id DESC", &list).await
    }

    pub async fn update(&self, id: i32, payload: UpdateCoursePayload) -> Result<Course> {
        let mut changes = payload.into_changeset()?;
        changes.touch(now());
        self.write(id, changes).await
    }

    /// Courses are archived rather than removed so enrollments keep their course.
    pub async fn delete(&self, id: i32) -> Result<Course> {
        let mut changes = Changeset::new();
        changes.value("status", ARCHIVED.to_string());
        changes.touch(now());
        let course = self.write(id, changes).await?;
        tracing::info!(course_id = id, "Course archived");
        Ok(course)
    }

    async fn write(&self, id: i32, changes: Changeset) -> Result<Course> {
        let mut tx = self.pool.begin().await?;
        find_for_update::<Course>(&mut tx, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        let course = update_returning::<Course>(&mut tx, TABLE, id, &changes)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        tx.commit().await?;

        tracing::info!(course_id = id, columns = changes.len(), "Course updated");
        Ok(course)
    }
}
