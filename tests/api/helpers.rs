use async_trait::async_trait;
use reqwest::Response;
use sqlx::{migrate, Connection, Executor, PgConnection, PgPool, Row};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use uuid::Uuid;

use subscription_aggregator::{
    config::{get_configuration, DatabaseSettings},
    domain::{
        cost_filter::CostFilter,
        subscription::{NewSubscription, Subscription},
    },
    startup::Application,
    storage::{PostgresSubscriptionStore, StoreError, SubscriptionStore},
    telemetry::{get_subscriber, init_subscriber},
};

static TRACING: Once = Once::new();

// Set TEST_LOG to see the application logs while running the tests
fn init_tracing() {
    TRACING.call_once(|| {
        let name = String::from("test");
        let env_filter = String::from("debug");

        if std::env::var("TEST_LOG").is_ok() {
            init_subscriber(get_subscriber(name, env_filter, std::io::stdout));
        } else {
            init_subscriber(get_subscriber(name, env_filter, std::io::sink));
        }
    });
}

/// Postgres store that counts the cost queries reaching the database.
pub struct CountingStore {
    inner: PostgresSubscriptionStore,
    total_cost_queries: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: PostgresSubscriptionStore) -> Self {
        Self {
            inner,
            total_cost_queries: AtomicUsize::new(0),
        }
    }

    pub fn total_cost_queries(&self) -> usize {
        self.total_cost_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionStore for CountingStore {
    async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> Result<i64, StoreError> {
        self.inner.create_subscription(subscription).await
    }

    async fn read_subscription(&self, id: i64) -> Result<Subscription, StoreError> {
        self.inner.read_subscription(id).await
    }

    async fn update_subscription(
        &self,
        id: i64,
        subscription: &NewSubscription,
    ) -> Result<(), StoreError> {
        self.inner.update_subscription(id, subscription).await
    }

    async fn delete_subscription(&self, id: i64) -> Result<(), StoreError> {
        self.inner.delete_subscription(id).await
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, StoreError> {
        self.inner.list_subscriptions().await
    }

    async fn total_cost(&self, filter: &CostFilter) -> Result<i64, StoreError> {
        self.total_cost_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.total_cost(filter).await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub store: Arc<CountingStore>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        init_tracing();

        let mut config = get_configuration().expect("Missing configuration file.");
        let db_test_name = format!("db_{}", Uuid::new_v4().to_string().replace('-', "_"));

        // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
        // take into account: when port is 0, the OS will search for the first available port
        config.set_app_port(0);

        let db_pool = configure_db(&mut config.database, db_test_name).await;
        let store = Arc::new(CountingStore::new(PostgresSubscriptionStore::new(
            db_pool.clone(),
        )));

        let application = Application::build_with_store(config, store.clone())
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            db_pool,
            store,
            api_client: reqwest::Client::new(),
        }
    }

    pub async fn stored_count(&self) -> i64 {
        sqlx::query("SELECT COUNT(*) AS count FROM subscriptions")
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to count subscriptions.")
            .get("count")
    }

    pub async fn post_subscription(&self, body: &serde_json::Value) -> Response {
        self.api_client
            .post(&format!("{}/api/v1/subscription", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_subscription(&self, id: &str) -> Response {
        self.api_client
            .get(&format!("{}/api/v1/subscription/{}", self.address, id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put_subscription(&self, body: &serde_json::Value) -> Response {
        self.api_client
            .put(&format!("{}/api/v1/subscription/update", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_subscription(&self, id: &str) -> Response {
        self.api_client
            .delete(&format!("{}/api/v1/subscription/delete/{}", self.address, id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn list_subscriptions(&self) -> Response {
        self.api_client
            .get(&format!("{}/api/v1/subscriptions", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_api_doc(&self) -> Response {
        self.api_client
            .get(&format!("{}/api/v1/openapi.json", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_total_cost(&self, parameters: &[(&str, &str)]) -> Response {
        self.api_client
            .get(&format!("{}/api/v1/subscriptions/cost", self.address))
            .query(parameters)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Creates a subscription and returns its id, failing the test on any non-201 answer.
    pub async fn create_subscription(&self, body: serde_json::Value) -> i64 {
        let response = self.post_subscription(&body).await;

        assert_eq!(201, response.status().as_u16());

        let created: serde_json::Value = response.json().await.unwrap();

        created["id"].as_i64().expect("Missing id in response.")
    }
}

pub async fn configure_db(db_config: &mut DatabaseSettings, db_test_name: String) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect_with(&db_config.get_server_options())
        .await
        .expect("Failed to connect to Postgres.");

    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, db_test_name))
        .await
        .expect("Failed to create database.");

    connection
        .close()
        .await
        .expect("Failed to close connection.");

    // Execute migrations
    db_config.set_name(db_test_name);

    let db_pool = PgPool::connect_with(db_config.get_db_options())
        .await
        .expect("Failed to connect to the test database.");

    migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations.");

    db_pool
}

