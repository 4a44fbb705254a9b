//! Integration tests for the enrollment lifecycle

use anyhow::Result;
use backoffice::config::AppConfig;
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{TestApp, count_rows, insert_course, spawn_test_app};

async fn enroll(app: &TestApp, token: &str, body: Value) -> Result<reqwest::Response> {
    Ok(app
        .client
        .post(app.endpoint("/api/enrollments"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?)
}

async fn end(app: &TestApp, token: &str, id: &str) -> Result<reqwest::Response> {
    Ok(app
        .client
        .post(app.endpoint(&format!("/api/enrollments/{id}/end")))
        .bearer_auth(token)
        .send()
        .await?)
}

#[tokio::test]
async fn enroll_end_and_purge() -> Result<()> {
    let app = spawn_test_app(AppConfig::default()).await?;
    let token = app.admin_token().await?;
    let student_id = app.create_student(&token, "ana@x.com").await?;
    let course_id = insert_course(&app.db, "English B1", "1200.50").await?;
    let pair = json!({ "studentId": student_id, "courseId": course_id });

    let response = enroll(&app, &token, pair.clone()).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await?;
    let id = created["id"].as_str().expect("enrollment id").to_string();
    assert_eq!(created["isActive"], true);
    assert!(created["endDate"].is_null());

    let response = enroll(&app, &token, pair.clone()).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "ENROLLMENT_ALREADY_ACTIVE");
    assert_eq!(count_rows(&app.db, "enrollments").await?, 1);

    let response = end(&app, &token, &id).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = end(&app, &token, &id).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "ENROLLMENT_ALREADY_ENDED");

    let ended: Value = app
        .client
        .get(app.endpoint(&format!("/api/enrollments/{id}")))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ended["isActive"], false);
    assert!(ended["endDate"].is_string());

    let response = app
        .client
        .delete(app.endpoint(&format!("/api/enrollments/{id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .client
        .get(app.endpoint(&format!("/api/enrollments/{id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "ENROLLMENT_NOT_FOUND");

    app.handle.shutdown().await
}

#[tokio::test]
async fn ended_pair_can_be_enrolled_again() -> Result<()> {
    let app = spawn_test_app(AppConfig::default()).await?;
    let token = app.admin_token().await?;
    let student_id = app.create_student(&token, "ana@x.com").await?;
    let course_id = insert_course(&app.db, "French A1", "900").await?;
    let pair = json!({ "studentId": student_id, "courseId": course_id });

    let first: Value = enroll(&app, &token, pair.clone()).await?.json().await?;
    let first_id = first["id"].as_str().expect("enrollment id").to_string();

    let response = app
        .client
        .post(app.endpoint(&format!("/api/enrollments/{first_id}/end")))
        .bearer_auth(&token)
        .json(&json!({ "endDate": "2026-02-28T00:00:00Z" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = enroll(&app, &token, pair).await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let active: Vec<Value> = app
        .client
        .get(app.endpoint(&format!(
            "/api/enrollments?studentId={student_id}&activeOnly=true"
        )))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(active.len(), 1);
    assert_ne!(active[0]["id"], first["id"]);

    let all: Vec<Value> = app
        .client
        .get(app.endpoint(&format!("/api/enrollments?courseId={course_id}")))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(all.len(), 2);

    app.handle.shutdown().await
}

#[tokio::test]
async fn bad_references_are_validation_failures() -> Result<()> {
    let app = spawn_test_app(AppConfig::default()).await?;
    let token = app.admin_token().await?;
    let student_id = app.create_student(&token, "ana@x.com").await?;
    let course_id = insert_course(&app.db, "English B1", "1200.50").await?;

    let cases = [
        (json!({ "courseId": course_id }), "studentId", "missing_reference"),
        (json!({ "studentId": student_id }), "courseId", "missing_reference"),
        (
            json!({ "studentId": Uuid::new_v4(), "courseId": course_id }),
            "studentId",
            "unknown_reference",
        ),
        (
            json!({ "studentId": student_id, "courseId": Uuid::new_v4() }),
            "courseId",
            "unknown_reference",
        ),
    ];

    for (body, field, rule) in cases {
        let response = enroll(&app, &token, body).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: Value = response.json().await?;
        assert_eq!(error["code"], "VALIDATION_FAILED");
        assert_eq!(error["details"]["field"], field);
        assert_eq!(error["details"]["rule"], rule);
    }

    assert_eq!(count_rows(&app.db, "enrollments").await?, 0);

    let response = end(&app, &token, &Uuid::new_v4().to_string()).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.handle.shutdown().await
}
