use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use codexa_backend::{
    config::{AdminBootstrap, Config, LogFormat},
    database::pool::{create_pool, run_migrations},
    routes,
    utils::token::issue_token,
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "crud_flow_secret";

struct Harness {
    app: Router,
    admin_token: String,
}

/// Connects to `DATABASE_URL`; `None` skips the test when it is not set.
async fn harness() -> Option<Harness> {
    dotenvy::dotenv().ok();
    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping database flow test");
            return None;
        }
    };
    let config = Config {
        server_address: "127.0.0.1:0".into(),
        database_url,
        database_max_connections: 5,
        database_acquire_timeout_secs: 5,
        jwt_secret: SECRET.into(),
        jwt_expiry_minutes: 60,
        log_format: LogFormat::Pretty,
        admin: None,
    };
    let pool = create_pool(&config).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");

    let state = AppState::new(pool, config);
    let admin = state
        .user_service
        .ensure_admin(&AdminBootstrap {
            email: format!("admin_{}@example.com", Uuid::new_v4().simple()),
            mobile: unique_digits(),
            password: "admin-secret".into(),
        })
        .await
        .expect("bootstrap admin");
    let admin_token = format!("Bearer {}", issue_token(admin.id, true, SECRET, 60).unwrap());

    Some(Harness {
        app: routes::router(state),
        admin_token,
    })
}

fn unique_digits() -> String {
    format!("{:012}", Uuid::new_v4().as_u128() % 1_000_000_000_000)
}

impl Harness {
    async fn call(&self, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
        self.call_as(&self.admin_token, method, uri, body).await
    }

    async fn call_as(
        &self,
        token: &str,
        method: &str,
        uri: &str,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, token)
            .header(header::CONTENT_TYPE, "application/json");
        let req = match body {
            Some(b) => builder.body(Body::from(b.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null))
    }

    /// Registers a regular account and logs it in; returns its id and bearer header.
    async fn register_user(&self) -> (i64, String) {
        let email = format!("user_{}@example.com", Uuid::new_v4().simple());
        let (status, user) = self
            .call(
                "POST",
                "/auth/register",
                Some(json!({ "email": email, "mobile": unique_digits(), "password": "user-secret" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", user);
        let token = self.login(&email).await;
        (user["id"].as_i64().unwrap(), token)
    }

    async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/auth/login",
                Some(json!({ "email": email, "password": "user-secret" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        format!("Bearer {}", body["access_token"].as_str().unwrap())
    }

    async fn create_job(&self) -> JsonValue {
        let (status, body) = self
            .call(
                "POST",
                "/jobs",
                Some(json!({
                    "job_title": "Backend Engineer",
                    "job_description": "Build services",
                    "job_type": "full-time",
                    "work_mode": "remote",
                    "industry": "Software",
                    "department": "Engineering",
                    "role": "Developer",
                    "company_name": format!("Acme {}", Uuid::new_v4().simple()),
                    "location": "Bengaluru",
                    "city": "Bengaluru",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }

    async fn create_enquiry(&self, email: &str, mobile: &str) -> (StatusCode, JsonValue) {
        self.call(
            "POST",
            "/enquiries",
            Some(json!({
                "name": "Kiran",
                "email": email,
                "mobile": mobile,
                "pass_out_year": 2023,
                "technology": ["rust"],
            })),
        )
        .await
    }

    async fn create_course(&self, price: i32) -> JsonValue {
        let (status, body) = self
            .call(
                "POST",
                "/courses",
                Some(json!({
                    "name": format!("Course {}", Uuid::new_v4().simple()),
                    "description": "Systems programming",
                    "category": "devops",
                    "duration": "6 weeks",
                    "level": "intermediate",
                    "price": price,
                    "topics": ["ownership", "lifetimes"],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }

    async fn create_candidate(&self, email: &str, phone: &str) -> (StatusCode, JsonValue) {
        self.call(
            "POST",
            "/candidates",
            Some(json!({
                "full_name": "Asha Verma",
                "email": email,
                "phone_number": phone,
                "address": "12 Lake Road",
                "pincode": "560001",
                "password": "candidate-pass",
                "primary_skills": ["rust", "sql"],
            })),
        )
        .await
    }
}

#[tokio::test]
async fn duplicate_candidate_email_conflicts() {
    let Some(h) = harness().await else { return };
    let email = format!("cand_{}@example.com", Uuid::new_v4().simple());

    let (status, body) = h.create_candidate(&email, &unique_digits()).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["primary_skills"], json!(["rust", "sql"]));
    assert!(body.get("hashed_password").is_none());

    let (status, body) = h.create_candidate(&email.to_uppercase(), &unique_digits()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn partial_update_touches_only_supplied_fields() {
    let Some(h) = harness().await else { return };
    let course = h.create_course(250).await;
    let id = course["id"].as_i64().unwrap();

    let (status, updated) = h
        .call("PUT", &format!("/courses/{}", id), Some(json!({ "instructor": "Ravi" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["instructor"], "Ravi");
    assert_eq!(updated["topics"], course["topics"]);
    assert_eq!(updated["price"], 250);

    let (status, cleared) = h
        .call("PATCH", &format!("/courses/{}/topics", id), Some(json!({ "value": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["topics"].is_null());

    let (status, _) = h
        .call("PATCH", &format!("/courses/{}/name", id), Some(json!({ "value": null })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn enrollment_completion_is_stamped_once() {
    let Some(h) = harness().await else { return };
    let course = h.create_course(120).await;
    let email = format!("enrol_{}@example.com", Uuid::new_v4().simple());
    let (_, candidate) = h.create_candidate(&email, &unique_digits()).await;

    let (status, enrollment) = h
        .call(
            "POST",
            "/enrollments",
            Some(json!({ "course_id": course["id"], "candidate_id": candidate["id"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", enrollment);
    assert_eq!(enrollment["total_fees"], 12_000);
    assert_eq!(enrollment["status"], "enrolled");
    let id = enrollment["id"].as_i64().unwrap();

    let (_, started) = h
        .call("PUT", &format!("/enrollments/{}", id), Some(json!({ "progress": 30 })))
        .await;
    assert_eq!(started["status"], "in_progress");
    assert!(started["completed_at"].is_null());

    let (_, done) = h
        .call("PUT", &format!("/enrollments/{}", id), Some(json!({ "progress": 150 })))
        .await;
    assert_eq!(done["progress"], 100);
    assert_eq!(done["status"], "completed");
    let completed_at = done["completed_at"].clone();
    assert!(!completed_at.is_null());

    let (_, again) = h
        .call("PUT", &format!("/enrollments/{}", id), Some(json!({ "progress": 100 })))
        .await;
    assert_eq!(again["completed_at"], completed_at);

    let (status, _) = h
        .call(
            "POST",
            "/enrollments",
            Some(json!({ "course_id": course["id"], "candidate_id": candidate["id"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_pagination_and_missing_records() {
    let Some(h) = harness().await else { return };
    h.create_course(10).await;
    h.create_course(20).await;

    let (status, page) = h.call("GET", "/courses?status=all&limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert_eq!(page["pagination"]["limit"], 1);
    assert_eq!(page["pagination"]["has_next"], true);

    let (status, page) = h.call("GET", "/courses?limit=500", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["limit"], 100);

    let (status, body) = h.call("DELETE", "/candidates/2147483000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = h
        .call(
            "POST",
            "/applications",
            Some(json!({ "job_id": 2147483000, "candidate_id": 2147483000 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn soft_deleted_course_is_archived() {
    let Some(h) = harness().await else { return };
    let course = h.create_course(75).await;
    let id = course["id"].as_i64().unwrap();

    let (status, archived) = h.call("DELETE", &format!("/courses/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(archived["status"], "archived");

    let (status, fetched) = h.call("GET", &format!("/courses/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "archived");
}

#[tokio::test]
async fn regular_users_are_held_to_their_role() {
    let Some(h) = harness().await else { return };
    let (user_id, token) = h.register_user().await;
    let (other_id, _) = h.register_user().await;

    for uri in ["/users", "/users/stats", "/candidates", "/enquiries/stats"] {
        let (status, body) = h.call_as(&token, "GET", uri, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["code"], "FORBIDDEN");
    }

    let (status, _) = h
        .call_as(&token, "POST", "/courses", Some(json!({ "name": "Rust", "price": 10 })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h.call_as(&token, "GET", &format!("/users/{}", other_id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, me) = h.call_as(&token, "GET", &format!("/users/{}", user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["is_admin"], false);

    let (status, _) = h
        .call_as(&token, "PUT", "/auth/me", Some(json!({ "is_admin": true })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = h
        .call_as(
            &token,
            "PUT",
            &format!("/users/{}", user_id),
            Some(json!({ "is_active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h
        .call(
            "PATCH",
            &format!("/users/{}/favourite_colour", user_id),
            Some(json!({ "value": "teal" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn live_tokens_follow_account_changes() {
    let Some(h) = harness().await else { return };
    let (user_id, _) = h.register_user().await;
    let (status, promoted) = h
        .call("PATCH", &format!("/users/{}/is_admin", user_id), Some(json!({ "value": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let email = promoted["email"].as_str().unwrap().to_string();
    let token = h.login(&email).await;

    let (status, _) = h.call_as(&token, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h
        .call("PATCH", &format!("/users/{}/is_admin", user_id), Some(json!({ "value": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.call_as(&token, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = h.call_as(&token, "GET", "/candidates/stats", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .call("PATCH", &format!("/users/{}/is_active", user_id), Some(json!({ "value": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = h.call_as(&token, "GET", "/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = h.call("DELETE", &format!("/users/{}", user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.call_as(&token, "GET", "/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_keys_conflict_for_every_entity() {
    let Some(h) = harness().await else { return };

    let email = format!("dup_{}@example.com", Uuid::new_v4().simple());
    let mobile = unique_digits();
    let register = |email: String, mobile: String| {
        json!({ "email": email, "mobile": mobile, "password": "user-secret" })
    };
    let (status, _) = h
        .call("POST", "/auth/register", Some(register(email.clone(), mobile.clone())))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let cases = [
        ("user email", register(email.to_uppercase(), unique_digits())),
        ("user mobile", register(format!("other_{}", email), mobile.clone())),
    ];
    for (label, body) in cases {
        let (status, body) = h.call("POST", "/auth/register", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT, "{}: {}", label, body);
        assert_eq!(body["code"], "CONFLICT");
    }

    let (status, _) = h.create_enquiry(&email, &mobile).await;
    assert_eq!(status, StatusCode::CREATED);
    for (label, dup_email, dup_mobile) in [
        ("enquiry email", email.clone(), unique_digits()),
        ("enquiry mobile", format!("other_{}", email), mobile.clone()),
    ] {
        let (status, body) = h.create_enquiry(&dup_email, &dup_mobile).await;
        assert_eq!(status, StatusCode::CONFLICT, "{}: {}", label, body);
    }

    let job = h.create_job().await;
    let candidate_email = format!("pair_{}@example.com", Uuid::new_v4().simple());
    let (_, candidate) = h.create_candidate(&candidate_email, &unique_digits()).await;
    let application = json!({ "job_id": job["id"], "candidate_id": candidate["id"] });
    let (status, body) = h.call("POST", "/applications", Some(application.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "applied");
    let (status, _) = h.call("POST", "/applications", Some(application)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let course = h.create_course(90).await;
    let enrollment = json!({ "course_id": course["id"], "candidate_id": candidate["id"] });
    let (status, body) = h.call("POST", "/enrollments", Some(enrollment.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["progress"], 0);
    let (status, _) = h.call("POST", "/enrollments", Some(enrollment)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn deleting_missing_records_is_not_found() {
    let Some(h) = harness().await else { return };
    for collection in [
        "users",
        "courses",
        "candidates",
        "jobs",
        "enquiries",
        "applications",
        "enrollments",
    ] {
        let (status, body) = h.call("DELETE", &format!("/{}/2147483000", collection), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}: {}", collection, body);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
