use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::config::DatabaseSettings;
use crate::domain::cost_filter::CostFilter;
use crate::domain::subscription::{NewSubscription, Subscription};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("subscription not found")]
    NotFound,
    #[error("failed to execute query")]
    Database(#[from] sqlx::Error),
}

/// Persistence operations on subscriptions.
///
/// Implementations must report a missing row with `StoreError::NotFound` so that callers can
/// tell it apart from transport or database failures.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> Result<i64, StoreError>;

    async fn read_subscription(&self, id: i64) -> Result<Subscription, StoreError>;

    async fn update_subscription(
        &self,
        id: i64,
        subscription: &NewSubscription,
    ) -> Result<(), StoreError>;

    async fn delete_subscription(&self, id: i64) -> Result<(), StoreError>;

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, StoreError>;

    async fn total_cost(&self, filter: &CostFilter) -> Result<i64, StoreError>;

    /// Releases the underlying connections. Called once, on shutdown.
    async fn close(&self);
}

pub struct PostgresSubscriptionStore {
    db_pool: PgPool,
}

impl PostgresSubscriptionStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    pub fn connect_lazy(config: &DatabaseSettings) -> Self {
        let db_pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect_lazy_with(config.get_db_options());

        Self::new(db_pool)
    }
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    #[tracing::instrument(
        name = "Insert a new subscription into the database",
        skip(self, subscription)
    )]
    async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query(
            r#"
            INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(subscription.service_name.as_ref())
        .bind(subscription.price.value())
        .bind(subscription.user_id)
        .bind(subscription.period.start().as_date())
        .bind(subscription.period.end().map(|end| end.as_date()))
        .fetch_one(&self.db_pool)
        .await
        .map_err(log_query_error)?
        .try_get("id")?;

        Ok(id)
    }

    #[tracing::instrument(name = "Fetch a subscription from the database", skip(self))]
    async fn read_subscription(&self, id: i64) -> Result<Subscription, StoreError> {
        sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, service_name, price, user_id, start_date, end_date
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(log_query_error)?
        .ok_or(StoreError::NotFound)
    }

    #[tracing::instrument(
        name = "Update a subscription in the database",
        skip(self, subscription)
    )]
    async fn update_subscription(
        &self,
        id: i64,
        subscription: &NewSubscription,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET service_name = $1, price = $2, user_id = $3, start_date = $4, end_date = $5
            WHERE id = $6
            "#,
        )
        .bind(subscription.service_name.as_ref())
        .bind(subscription.price.value())
        .bind(subscription.user_id)
        .bind(subscription.period.start().as_date())
        .bind(subscription.period.end().map(|end| end.as_date()))
        .bind(id)
        .execute(&self.db_pool)
        .await
        .map_err(log_query_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    #[tracing::instrument(name = "Delete a subscription from the database", skip(self))]
    async fn delete_subscription(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .map_err(log_query_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    #[tracing::instrument(name = "Fetch all subscriptions from the database", skip(self))]
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, StoreError> {
        let subscriptions = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, service_name, price, user_id, start_date, end_date
            FROM subscriptions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .map_err(log_query_error)?;

        Ok(subscriptions)
    }

    #[tracing::instrument(
        name = "Sum subscription prices in the database",
        skip(self, filter),
        fields(
            from = %filter.window.from(),
            to = %filter.window.to(),
        )
    )]
    async fn total_cost(&self, filter: &CostFilter) -> Result<i64, StoreError> {
        let total: i64 = total_cost_query(filter)
            .build()
            .fetch_one(&self.db_pool)
            .await
            .map_err(log_query_error)?
            .try_get("total_cost")?;

        Ok(total)
    }

    async fn close(&self) {
        self.db_pool.close().await;
    }
}

/// Builds the total cost query. SQL fragments and their bind parameters are pushed together,
/// so placeholders stay numbered `$1..$n` whichever optional filters are present.
///
/// A row matches when `from` or `to` falls inside `[start_date, end_date or today]`, or when
/// either of them equals `start_date`. A window that strictly contains a subscription's
/// whole period does not match.
fn total_cost_query(filter: &CostFilter) -> QueryBuilder<'static, Postgres> {
    let (from, to) = (filter.window.from(), filter.window.to());
    let mut query = QueryBuilder::new(
        "SELECT COALESCE(SUM(price), 0)::BIGINT AS total_cost FROM subscriptions WHERE ((",
    );

    query
        .push_bind(from)
        .push(" BETWEEN start_date AND COALESCE(end_date, CURRENT_DATE)) OR (")
        .push_bind(to)
        .push(" BETWEEN start_date AND COALESCE(end_date, CURRENT_DATE)) OR (")
        .push_bind(from)
        .push(" = start_date OR ")
        .push_bind(to)
        .push(" = start_date))");

    if let Some(user_id) = filter.user_id {
        query.push(" AND user_id = ").push_bind(user_id);
    }

    if let Some(service_name) = &filter.service_name {
        query
            .push(" AND service_name = ")
            .push_bind(service_name.clone());
    }

    query
}

fn log_query_error(err: sqlx::Error) -> sqlx::Error {
    tracing::error!("Failed to execute query: {:?}", err);
    err
}
