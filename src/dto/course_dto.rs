use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::changeset::Changeset;
use crate::database::listing::PageParams;
use crate::dto::patch::Patch;
use crate::error::Result;
use crate::models::course::Course;
use crate::utils::json_field::{self, StringList};
use crate::utils::validation::{
    ensure_min, ensure_non_blank, ensure_one_of, ensure_optional_one_of, COURSE_CATEGORIES,
    COURSE_LEVELS, COURSE_STATUSES,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCoursePayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub category: String,
    #[validate(length(min = 1, max = 100))]
    pub duration: String,
    pub level: String,
    #[validate(range(min = 0))]
    pub price: i32,
    pub icon: Option<String>,
    pub icon_name: Option<String>,
    pub career_path: Option<String>,
    pub instructor: Option<String>,
    pub topics: Option<StringList>,
    pub skills: Option<StringList>,
    pub projects: Option<StringList>,
    pub prerequisites: Option<StringList>,
    pub syllabus: Option<StringList>,
    pub enrolled_students: Option<StringList>,
    pub students_count: Option<String>,
    pub status: Option<String>,
}

impl CreateCoursePayload {
    pub fn into_changeset(self) -> Result<Changeset> {
        ensure_one_of("category", &self.category, COURSE_CATEGORIES)?;
        ensure_one_of("level", &self.level, COURSE_LEVELS)?;
        ensure_optional_one_of("status", self.status.as_deref(), COURSE_STATUSES)?;
        ensure_min("price", self.price, 0)?;

        let mut changes = Changeset::new();
        changes.value("name", self.name);
        changes.value("description", self.description);
        changes.value("category", self.category);
        changes.value("duration", self.duration);
        changes.value("level", self.level);
        changes.value("price", self.price);
        changes.optional("icon", self.icon);
        changes.optional("icon_name", self.icon_name);
        changes.optional("career_path", self.career_path);
        changes.optional("instructor", self.instructor);
        changes.list("topics", self.topics)?;
        changes.list("skills", self.skills)?;
        changes.list("projects", self.projects)?;
        changes.list("prerequisites", self.prerequisites)?;
        changes.list("syllabus", self.syllabus)?;
        changes.list("enrolled_students", self.enrolled_students)?;
        changes.optional("students_count", self.students_count);
        changes.value("status", self.status.unwrap_or_else(|| "published".to_string()));
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateCoursePayload {
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub category: Patch<String>,
    pub duration: Patch<String>,
    pub level: Patch<String>,
    pub price: Patch<i32>,
    pub icon: Patch<String>,
    pub icon_name: Patch<String>,
    pub career_path: Patch<String>,
    pub instructor: Patch<String>,
    pub topics: Patch<StringList>,
    pub skills: Patch<StringList>,
    pub projects: Patch<StringList>,
    pub prerequisites: Patch<StringList>,
    pub syllabus: Patch<StringList>,
    pub enrolled_students: Patch<StringList>,
    pub students_count: Patch<String>,
    pub status: Patch<String>,
}

impl UpdateCoursePayload {
    pub fn into_changeset(self) -> Result<Changeset> {
        if let Some(name) = self.name.value() {
            ensure_non_blank("name", name)?;
        }
        ensure_optional_one_of("category", self.category.value().map(String::as_str), COURSE_CATEGORIES)?;
        ensure_optional_one_of("level", self.level.value().map(String::as_str), COURSE_LEVELS)?;
        ensure_optional_one_of("status", self.status.value().map(String::as_str), COURSE_STATUSES)?;
        if let Some(price) = self.price.value() {
            ensure_min("price", *price, 0)?;
        }

        let mut changes = Changeset::new();
        changes.patch_required("name", self.name)?;
        changes.patch_required("description", self.description)?;
        changes.patch_required("category", self.category)?;
        changes.patch_required("duration", self.duration)?;
        changes.patch_required("level", self.level)?;
        changes.patch_required("price", self.price)?;
        changes.patch("icon", self.icon);
        changes.patch("icon_name", self.icon_name);
        changes.patch("career_path", self.career_path);
        changes.patch("instructor", self.instructor);
        changes.patch_list("topics", self.topics)?;
        changes.patch_list("skills", self.skills)?;
        changes.patch_list("projects", self.projects)?;
        changes.patch_list("prerequisites", self.prerequisites)?;
        changes.patch_list("syllabus", self.syllabus)?;
        changes.patch_list("enrolled_students", self.enrolled_students)?;
        changes.patch("students_count", self.students_count);
        changes.patch_required("status", self.status)?;
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub search: Option<String>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
}

impl CourseListQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub duration: String,
    pub level: String,
    pub price: i32,
    pub icon: Option<String>,
    pub icon_name: Option<String>,
    pub career_path: Option<String>,
    pub instructor: Option<String>,
    pub topics: Option<StringList>,
    pub skills: Option<StringList>,
    pub projects: Option<StringList>,
    pub prerequisites: Option<StringList>,
    pub syllabus: Option<StringList>,
    pub enrolled_students: Option<StringList>,
    pub students_count: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Course> for CourseResponse {
    type Error = crate::error::Error;

    fn try_from(c: Course) -> Result<Self> {
        Ok(Self {
            topics: json_field::decode("topics", c.topics.as_deref())?,
            skills: json_field::decode("skills", c.skills.as_deref())?,
            projects: json_field::decode("projects", c.projects.as_deref())?,
            prerequisites: json_field::decode("prerequisites", c.prerequisites.as_deref())?,
            syllabus: json_field::decode("syllabus", c.syllabus.as_deref())?,
            enrolled_students: json_field::decode("enrolled_students", c.enrolled_students.as_deref())?,
            id: c.id,
            name: c.name,
            description: c.description,
            category: c.category,
            duration: c.duration,
            level: c.level,
            price: c.price,
            icon: c.icon,
            icon_name: c.icon_name,
            career_path: c.career_path,
            instructor: c.instructor,
            students_count: c.students_count,
            status: c.status,
            created_at: c.created_at,
            updated_at: c.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::changeset::SqlValue;
    use crate::error::Error;
    use serde_json::json;

    fn create_body() -> serde_json::Value {
        json!({
            "name": "Full Stack Web",
            "description": "HTML to deployment",
            "category": "web",
            "duration": "6 months",
            "level": "beginner",
            "price": 499,
            "topics": ["HTML", "CSS"],
        })
    }

    #[test]
    fn create_defaults_status_and_encodes_lists() {
        let payload: CreateCoursePayload = serde_json::from_value(create_body()).unwrap();
        let changes = payload.into_changeset().unwrap();
        assert_eq!(changes.text("status"), Some("published"));
        assert_eq!(changes.text("topics"), Some(r#"["HTML","CSS"]"#));
        assert_eq!(changes.get("skills"), Some(&SqlValue::Text(None)));
    }

    #[test]
    fn create_rejects_unknown_category() {
        let mut body = create_body();
        body["category"] = json!("cooking");
        let payload: CreateCoursePayload = serde_json::from_value(body).unwrap();
        assert!(matches!(payload.into_changeset(), Err(Error::Invalid(_))));
    }

    #[test]
    fn update_touches_only_supplied_columns() {
        let payload: UpdateCoursePayload =
            serde_json::from_value(json!({ "level": "advanced", "icon": null })).unwrap();
        let changes = payload.into_changeset().unwrap();
        let mut columns: Vec<_> = changes.columns().collect();
        columns.sort();
        assert_eq!(columns, vec!["icon", "level"]);
    }

    #[test]
    fn update_rejects_null_name_and_bad_status() {
        let payload: UpdateCoursePayload = serde_json::from_value(json!({ "name": null })).unwrap();
        assert!(payload.into_changeset().is_err());

        let payload: UpdateCoursePayload =
            serde_json::from_value(json!({ "status": "deleted" })).unwrap();
        assert!(payload.into_changeset().is_err());
    }

    #[test]
    fn update_rejects_unknown_keys() {
        let parsed = serde_json::from_value::<UpdateCoursePayload>(json!({ "colour": "red" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn response_decodes_null_lists_as_none() {
        let now = Utc::now();
        let course = Course {
            id: 1,
            name: "Data".into(),
            description: "SQL".into(),
            category: "data".into(),
            duration: "3 months".into(),
            level: "beginner".into(),
            price: 0,
            icon: None,
            icon_name: None,
            career_path: None,
            instructor: None,
            topics: Some(r#"["SQL"]"#.into()),
            skills: None,
            projects: None,
            prerequisites: None,
            syllabus: None,
            enrolled_students: None,
            students_count: Some("500+".into()),
            status: "published".into(),
            created_at: now,
            updated_at: now,
        };
        let resp = CourseResponse::try_from(course).unwrap();
        assert_eq!(resp.topics, Some(vec!["SQL".to_string()]));
        assert_eq!(resp.skills, None);
    }
}
