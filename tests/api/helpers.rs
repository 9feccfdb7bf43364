use chrono::{DateTime, Duration, Utc};
use couponverse::authentication::{Clock, SessionGate, StaticAccount};
use couponverse::configuration::{DatabaseSettings, Settings};
use couponverse::startup::Application;
use couponverse::telemetry::{get_tracing_subscriber, init_tracing_subscriber};
use fake::faker::internet::en::Password;
use fake::faker::name::en::Name;
use fake::Fake;
use once_cell::sync::Lazy;
use secrecy::Secret;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let test_name = "test_app";
    let default_log_level = "debug";
    if std::env::var("TEST_LOG").is_ok() {
        init_tracing_subscriber(get_tracing_subscriber(
            test_name,
            default_log_level,
            std::io::stdout,
        ));
    } else {
        init_tracing_subscriber(get_tracing_subscriber(
            test_name,
            default_log_level,
            std::io::sink,
        ));
    }
});

/// Wall clock that only moves when a test says so.
pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub struct TestAdmin {
    pub username: String,
    pub password: String,
}

impl TestAdmin {
    pub fn generate() -> Self {
        Self {
            username: Name().fake(),
            password: Password(8..20).fake(),
        }
    }
}

pub struct TestApp {
    pub addr: String,
    pub pg_pool: PgPool,
    pub api_client: reqwest::Client,
    pub admin: TestAdmin,
    pub clock: Arc<TestClock>,
}

impl TestApp {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(&format!("{}{}", self.addr, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}{}", self.addr, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_login(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/api/login", body).await
    }

    pub async fn login_as_admin(&self) {
        let response = self
            .post_login(&serde_json::json!({
                "username": &self.admin.username,
                "password": &self.admin.password
            }))
            .await;
        assert_eq!(response.status().as_u16(), 200, "admin login failed");
    }

    pub async fn post_logout(&self) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/logout", self.addr))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_coupons(&self, category: Option<&str>) -> reqwest::Response {
        let mut request = self.api_client.get(&format!("{}/api/coupons", self.addr));
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn post_coupon(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/api/coupons", body).await
    }

    pub async fn post_subscribe(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/api/subscribe", body).await
    }

    pub async fn post_admin_coupon(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/api/admin/coupons", body).await
    }

    pub async fn put_coupon_status(
        &self,
        id: impl std::fmt::Display,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.api_client
            .put(&format!("{}/api/admin/coupons/{}", self.addr, id))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    // `id` is whatever lands in the URL segment, not necessarily a number
    pub async fn delete_coupon(&self, id: impl std::fmt::Display) -> reqwest::Response {
        self.api_client
            .delete(&format!("{}/api/admin/coupons/{}", self.addr, id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Submits a pending coupon through the public endpoint and returns its id.
    pub async fn submit_coupon(&self, store_name: &str, category: &str) -> i64 {
        let response = self
            .post_coupon(&serde_json::json!({
                "store_name": store_name,
                "description": "desc",
                "code": "CODE",
                "category": category,
                "discount_amount": "10%",
                "expiry_date": "2025-01-01"
            }))
            .await;
        assert_eq!(response.status().as_u16(), 200);
        created_id(response).await
    }

    /// Inserts an approved coupon through the admin endpoint, session required.
    pub async fn approved_coupon(&self, store_name: &str, category: &str) -> i64 {
        let response = self
            .post_admin_coupon(&serde_json::json!({
                "store_name": store_name,
                "description": "desc",
                "code": "CODE",
                "category": category,
                "discount_amount": "10%",
                "expiry_date": "2025-01-01"
            }))
            .await;
        assert_eq!(response.status().as_u16(), 200);
        created_id(response).await
    }

    pub async fn coupon_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM coupons")
            .fetch_one(&self.pg_pool)
            .await
            .expect("Failed to count coupons")
    }

    pub async fn subscriber_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM subscribers")
            .fetch_one(&self.pg_pool)
            .await
            .expect("Failed to count subscribers")
    }

    pub async fn coupon_status(&self, id: i64) -> String {
        sqlx::query_scalar::<_, String>("SELECT status FROM coupons WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pg_pool)
            .await
            .expect("Failed to fetch coupon status")
    }
}

pub async fn created_id(response: reqwest::Response) -> i64 {
    let body: serde_json::Value = response.json().await.expect("Response is not JSON");
    body["data"]["id"].as_i64().expect("Response has no created id")
}

/// Ids listed in a `{"message": "success", "data": [...]}` body, in order.
pub async fn listed_ids(response: reqwest::Response) -> Vec<i64> {
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.expect("Response is not JSON");
    assert_eq!(body["message"], "success");
    body["data"]
        .as_array()
        .expect("Response has no data array")
        .iter()
        .map(|record| record["id"].as_i64().unwrap())
        .collect()
}

pub async fn error_message(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.expect("Response is not JSON");
    body["error"]
        .as_str()
        .expect("Response has no error message")
        .to_owned()
}

pub async fn spawn_app() -> TestApp {
    // Lazy mean only run when it is called
    // once_cell make sure it is only run once on entire program lifetime
    Lazy::force(&TRACING);

    let settings = {
        let mut settings = Settings::get_configuration().expect("Failed to read configuration");
        // Use port 0 to ask the OS to pick a random free port
        settings.application.port = 0;
        settings.application.seed_catalog = false;
        settings.database.database_name = Uuid::new_v4().to_string();
        settings
    };

    let pg_pool = configure_database(&settings.database).await;

    let admin = TestAdmin::generate();
    let clock = Arc::new(TestClock(Mutex::new(Utc::now())));
    let account = StaticAccount::new(admin.username.clone(), &Secret::new(admin.password.clone()))
        .expect("Failed to prepare the test administrator");
    let session_gate = SessionGate::new(Arc::new(account), clock.clone(), settings.session.ttl());

    let app = Application::build(pg_pool.clone(), settings, session_gate)
        .await
        .expect("Failed to build application");
    let addr = format!("http://127.0.0.1:{}", app.port());

    // tokio::test tears the background server down with the runtime
    let _ = tokio::spawn(app.run_until_terminated());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap();

    TestApp {
        addr,
        pg_pool,
        api_client,
        admin,
        clock,
    }
}

// Every test gets a brand new database so tests cannot see each other's rows
async fn configure_database(database: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect_with(&database.get_pg_options())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, database.database_name).as_str())
        .await
        .expect("Failed to create database");

    let pg_pool = PgPool::connect_with(database.get_pg_options_with_db())
        .await
        .expect("Failed to connect to Postgres");
    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .expect("Failed to migrate the database");

    pg_pool
}
