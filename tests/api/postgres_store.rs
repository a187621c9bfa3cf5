use chrono::NaiveDate;
use claim::{assert_matches, assert_ok};
use std::sync::Arc;
use uuid::Uuid;

use crate::helpers::configure_db;
use subscription_aggregator::{
    aggregation::{AggregationService, ServiceError},
    config::get_configuration,
    domain::subscription::SubscriptionRequest,
    storage::{PostgresSubscriptionStore, SubscriptionStore},
};

struct TestDatabase {
    service: AggregationService,
    store: Arc<PostgresSubscriptionStore>,
}

impl TestDatabase {
    async fn spawn() -> TestDatabase {
        let mut config = get_configuration().expect("Missing configuration file.");
        let db_test_name = format!("db_{}", Uuid::new_v4().to_string().replace('-', "_"));
        let db_pool = configure_db(&mut config.database, db_test_name).await;
        let store = Arc::new(PostgresSubscriptionStore::new(db_pool));

        TestDatabase {
            service: AggregationService::new(store.clone()),
            store,
        }
    }

    async fn create(&self, price: i32, user_id: Uuid, start: &str, end: Option<&str>) -> i64 {
        self.service
            .create_subscription(&request(0, price, user_id, start, end))
            .await
            .expect("Failed to create subscription.")
    }

    async fn total_cost(
        &self,
        from: &str,
        to: &str,
        user_id: Option<Uuid>,
        service_name: Option<&str>,
    ) -> i64 {
        self.service
            .total_cost(
                month(from),
                month(to),
                user_id,
                service_name.map(String::from),
            )
            .await
            .expect("Failed to compute total cost.")
    }
}

fn month(value: &str) -> NaiveDate {
    let (month, year) = value.split_once('-').unwrap();

    NaiveDate::from_ymd_opt(year.parse().unwrap(), month.parse().unwrap(), 1).unwrap()
}

fn request(
    id: i64,
    price: i32,
    user_id: Uuid,
    start: &str,
    end: Option<&str>,
) -> SubscriptionRequest {
    SubscriptionRequest {
        id,
        service_name: String::from("Netflix"),
        price,
        user_id,
        start_date: start.to_string(),
        end_date: end.map(String::from),
    }
}

#[tokio::test]
async fn created_subscription_is_read_back() {
    let db = TestDatabase::spawn().await;
    let user_id = Uuid::new_v4();

    let id = db.create(499, user_id, "08-2025", None).await;
    let subscription = db.service.read_subscription(id).await.unwrap();

    assert_eq!(subscription.service_name, "Netflix");
    assert_eq!(subscription.price, 499);
    assert_eq!(subscription.user_id, user_id);
    assert_eq!(subscription.start_date, month("08-2025"));
    assert_eq!(subscription.end_date, None);
}

#[tokio::test]
async fn missing_rows_are_reported_as_not_found() {
    let db = TestDatabase::spawn().await;

    assert_matches!(db.service.read_subscription(1).await, Err(ServiceError::NotFound));
    assert_matches!(db.service.delete_subscription(1).await, Err(ServiceError::NotFound));
    assert_matches!(
        db.service
            .update_subscription(&request(1, 100, Uuid::new_v4(), "01-2023", None))
            .await,
        Err(ServiceError::NotFound)
    );
}

#[tokio::test]
async fn update_and_delete_change_the_stored_rows() {
    let db = TestDatabase::spawn().await;
    let user_id = Uuid::new_v4();
    let id = db.create(100, user_id, "01-2023", None).await;

    assert_ok!(
        db.service
            .update_subscription(&request(id, 150, user_id, "02-2023", Some("04-2023")))
            .await
    );

    let updated = db.service.read_subscription(id).await.unwrap();
    assert_eq!(updated.price, 150);
    assert_eq!(updated.end_date, Some(month("04-2023")));

    assert_ok!(db.service.delete_subscription(id).await);
    assert!(db.service.list_subscriptions().await.unwrap().is_empty());
}

#[tokio::test]
async fn total_cost_follows_the_overlap_rule() {
    let db = TestDatabase::spawn().await;
    let user_id = Uuid::new_v4();
    db.create(100, user_id, "01-2023", Some("06-2023")).await;
    db.create(200, user_id, "05-2023", None).await;

    assert_eq!(db.total_cost("05-2023", "05-2023", None, None).await, 300);
    assert_eq!(db.total_cost("03-2023", "03-2023", None, None).await, 100);
    assert_eq!(db.total_cost("01-2024", "02-2024", None, None).await, 200);
    assert_eq!(db.total_cost("07-2022", "12-2022", None, None).await, 0);
}

#[tokio::test]
async fn window_strictly_containing_a_subscription_does_not_count_it() {
    let db = TestDatabase::spawn().await;
    db.create(100, Uuid::new_v4(), "03-2023", Some("06-2023"))
        .await;

    assert_eq!(db.total_cost("01-2023", "12-2023", None, None).await, 0);
    // Either end of the window landing on the start month selects the row.
    assert_eq!(db.total_cost("03-2023", "12-2023", None, None).await, 100);
    assert_eq!(db.total_cost("01-2023", "03-2023", None, None).await, 100);
}

#[tokio::test]
async fn total_cost_accepts_every_filter_combination() {
    let db = TestDatabase::spawn().await;
    let user_id = Uuid::new_v4();
    db.create(100, user_id, "01-2023", None).await;
    db.create(300, Uuid::new_v4(), "01-2023", None).await;

    assert_eq!(db.total_cost("01-2023", "01-2023", None, None).await, 400);
    assert_eq!(db.total_cost("01-2023", "01-2023", Some(user_id), None).await, 100);
    assert_eq!(
        db.total_cost("01-2023", "01-2023", None, Some("Netflix")).await,
        400
    );
    assert_eq!(
        db.total_cost("01-2023", "01-2023", Some(user_id), Some("Netflix"))
            .await,
        100
    );
    assert_eq!(
        db.total_cost("01-2023", "01-2023", None, Some("Spotify")).await,
        0
    );
}

#[tokio::test]
async fn closed_store_rejects_queries() {
    let db = TestDatabase::spawn().await;

    db.store.close().await;

    assert_matches!(db.service.list_subscriptions().await, Err(ServiceError::Store(_)));
}
