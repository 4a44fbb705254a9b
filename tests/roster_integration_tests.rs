//! Integration tests for the student and teacher rosters

use anyhow::Result;
use backoffice::config::AppConfig;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{count_rows, insert_course, spawn_test_app};

#[tokio::test]
async fn duplicate_student_email_conflicts_after_normalization() -> Result<()> {
    let app = spawn_test_app(AppConfig::default()).await?;
    let token = app.admin_token().await?;

    let response = app
        .client
        .post(app.endpoint("/api/students"))
        .bearer_auth(&token)
        .json(&json!({ "firstName": "Ana", "lastName": "Pérez", "email": "ana@x.com" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .expect("location header");
    let created: Value = response.json().await?;
    assert_eq!(location, format!("/api/students/{}", created["id"].as_str().unwrap()));

    let response = app
        .client
        .post(app.endpoint("/api/students"))
        .bearer_auth(&token)
        .json(&json!({ "firstName": "Ana", "lastName": "P", "email": "  ANA@X.COM " }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "EMAIL_ALREADY_EXISTS");

    assert_eq!(count_rows(&app.db, "students").await?, 1);

    app.handle.shutdown().await
}

#[tokio::test]
async fn student_lifecycle() -> Result<()> {
    let app = spawn_test_app(AppConfig::default()).await?;
    let token = app.admin_token().await?;
    let id = app.create_student(&token, "luis@x.com").await?;

    let response = app
        .client
        .put(app.endpoint(&format!("/api/students/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "firstName": "Luis", "lastName": "Gómez", "email": "LUIS@x.com" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let student: Value = app
        .client
        .get(app.endpoint(&format!("/api/students/{id}")))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(student["firstName"], "Luis");
    assert_eq!(student["email"], "luis@x.com");

    let response = app
        .client
        .delete(app.endpoint(&format!("/api/students/{id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .client
        .get(app.endpoint(&format!("/api/students/{id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "STUDENT_NOT_FOUND");

    app.handle.shutdown().await
}

#[tokio::test]
async fn invalid_person_payloads_are_rejected() -> Result<()> {
    let app = spawn_test_app(AppConfig::default()).await?;
    let token = app.admin_token().await?;

    for (payload, field) in [
        (json!({ "firstName": " ", "lastName": "Pérez", "email": "a@x.com" }), "firstName"),
        (json!({ "firstName": "Ana", "lastName": "Pérez", "email": "not-an-email" }), "email"),
    ] {
        let response = app
            .client
            .post(app.endpoint("/api/teachers"))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await?;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["details"]["field"], field);
    }

    assert_eq!(count_rows(&app.db, "teachers").await?, 0);

    app.handle.shutdown().await
}

#[tokio::test]
async fn teachers_are_listed_by_last_then_first_name() -> Result<()> {
    let app = spawn_test_app(AppConfig::default()).await?;
    let token = app.admin_token().await?;

    for (first, last, email) in [
        ("Zoe", "Alvarez", "zoe@x.com"),
        ("Carla", "Mendez", "carla@x.com"),
        ("Ana", "Alvarez", "ana@x.com"),
    ] {
        let response = app
            .client
            .post(app.endpoint("/api/teachers"))
            .bearer_auth(&token)
            .json(&json!({ "firstName": first, "lastName": last, "email": email }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let teachers: Vec<Value> = app
        .client
        .get(app.endpoint("/api/teachers"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let names: Vec<&str> = teachers
        .iter()
        .filter_map(|teacher| teacher["email"].as_str())
        .collect();
    assert_eq!(names, ["ana@x.com", "zoe@x.com", "carla@x.com"]);

    app.handle.shutdown().await
}

#[tokio::test]
async fn referenced_rows_cannot_be_deleted() -> Result<()> {
    let app = spawn_test_app(AppConfig::default()).await?;
    let token = app.admin_token().await?;
    let student_id = app.create_student(&token, "eva@x.com").await?;
    let course_id = insert_course(&app.db, "English B1", "1200.50").await?;

    let response = app
        .client
        .post(app.endpoint("/api/enrollments"))
        .bearer_auth(&token)
        .json(&json!({ "studentId": student_id, "courseId": course_id }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    for path in [
        format!("/api/students/{student_id}"),
        format!("/api/courses/{course_id}"),
    ] {
        let response = app
            .client
            .delete(app.endpoint(&path))
            .bearer_auth(&token)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::CONFLICT, "{path}");
        let body: Value = response.json().await?;
        assert_eq!(body["code"], "REFERENCED_BY_OTHER_RECORDS");
    }

    assert_eq!(count_rows(&app.db, "students").await?, 1);
    assert_eq!(count_rows(&app.db, "courses").await?, 1);

    app.handle.shutdown().await
}
