//! Test utilities for database and HTTP testing.
//!
//! Sets up in-memory SQLite databases with migrations applied and spawns the
//! full application on a random local port.

#![allow(dead_code)]

use anyhow::{Context, Result};
use backoffice::{
    config::{AppConfig, DEV_ADMIN_PASSWORD},
    seeds::bootstrap_admin,
    server::{AppState, create_app},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement, Value};
use serde_json::{Value as Json, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use uuid::Uuid;

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Inserts a course row directly. Prices go in as SQL literals.
pub async fn insert_course(db: &DatabaseConnection, name: &str, monthly_price: &str) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let stmt = Statement::from_sql_and_values(
        db.get_database_backend(),
        format!(
            "INSERT INTO courses (id, name, monthly_price, created_at) \
             VALUES (?, ?, {monthly_price}, '2026-01-05T09:00:00+00:00')"
        ),
        [Value::Uuid(Some(Box::new(id))), name.into()],
    );
    db.execute(stmt).await?;
    Ok(id)
}

/// Counts rows in `table`.
pub async fn count_rows(db: &DatabaseConnection, table: &str) -> Result<i64> {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await?
        .context("count query returned no row")?;
    Ok(row.try_get("", "n")?)
}

pub struct TestServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<Result<()>>>,
}

impl TestServerHandle {
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.join_handle.take() {
            handle.await.context("server task join failed")??;
        }

        Ok(())
    }
}

impl Drop for TestServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub struct TestApp {
    pub url: String,
    pub db: std::sync::Arc<DatabaseConnection>,
    pub client: reqwest::Client,
    pub handle: TestServerHandle,
}

impl TestApp {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    /// Logs in as the seeded admin and returns the bearer token.
    pub async fn admin_token(&self) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint("/api/auth/login"))
            .json(&json!({ "username": "admin", "password": DEV_ADMIN_PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(response.status() == 200, "login failed: {}", response.status());

        let body: Json = response.json().await?;
        body["accessToken"]
            .as_str()
            .map(str::to_string)
            .context("login response has no accessToken")
    }

    /// Creates a student through the API and returns its id.
    pub async fn create_student(&self, token: &str, email: &str) -> Result<Uuid> {
        let response = self
            .client
            .post(self.endpoint("/api/students"))
            .bearer_auth(token)
            .json(&json!({ "firstName": "Ana", "lastName": "Pérez", "email": email }))
            .send()
            .await?;
        anyhow::ensure!(response.status() == 201, "create student failed: {}", response.status());

        let body: Json = response.json().await?;
        let id = body["id"].as_str().context("student response has no id")?;
        Ok(Uuid::parse_str(id)?)
    }
}

/// Spawns the application with a migrated database and the admin seeded.
pub async fn spawn_test_app(config: AppConfig) -> Result<TestApp> {
    let db = setup_test_db().await?;
    bootstrap_admin(&db, &config).await?;

    let state = AppState::new(config, db)?;
    let db = state.db.clone();
    let app = create_app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        let _ = ready_tx.send(());

        server.await.context("axum server error")
    });

    ready_rx.await.context("server task to signal readiness")?;

    Ok(TestApp {
        url: format!("http://{addr}"),
        db,
        client: reqwest::Client::new(),
        handle: TestServerHandle {
            shutdown_tx: Some(shutdown_tx),
            join_handle: Some(server_task),
        },
    })
}
