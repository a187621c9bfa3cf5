use chrono::NaiveDate;
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::cost_filter::CostFilter;
use crate::domain::period::{CostWindow, DateRangeError};
use crate::domain::subscription::{
    NewSubscription, Subscription, SubscriptionRequest, ValidationError,
};
use crate::storage::{StoreError, SubscriptionStore};

#[derive(thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    MalformedInput(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    DateRange(#[from] DateRangeError),
    #[error("subscription not found")]
    NotFound,
    #[error("failed to access the subscriptions store")]
    Store(#[source] sqlx::Error),
}

impl std::fmt::Debug for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;

        if let Some(source) = self.source() {
            write!(f, "\nCaused by:\n\t{}", source)?;
        }

        Ok(())
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::DateFormat(message) => ServiceError::MalformedInput(message),
            ValidationError::InvalidField(message) => ServiceError::InvalidInput(message),
            ValidationError::DateRange(err) => ServiceError::DateRange(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ServiceError::NotFound,
            StoreError::Database(err) => ServiceError::Store(err),
        }
    }
}

/// Validates subscription requests and cost queries before handing them to the store.
///
/// Holds no state besides the store handle, so a single instance is shared by every worker.
pub struct AggregationService {
    store: Arc<dyn SubscriptionStore>,
}

impl AggregationService {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(
        name = "Creating a new subscription",
        skip(self, request),
        fields(
            service_name = %request.service_name,
            user_id = %request.user_id
        )
    )]
    pub async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<i64, ServiceError> {
        let subscription = NewSubscription::try_from(request)?;

        Ok(self.store.create_subscription(&subscription).await?)
    }

    #[tracing::instrument(name = "Reading a subscription", skip(self))]
    pub async fn read_subscription(&self, id: i64) -> Result<Subscription, ServiceError> {
        Ok(self.store.read_subscription(id).await?)
    }

    #[tracing::instrument(
        name = "Updating a subscription",
        skip(self, request),
        fields(subscription_id = %request.id)
    )]
    pub async fn update_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<(), ServiceError> {
        let subscription = NewSubscription::try_from(request)?;

        if request.id == 0 {
            return Err(ServiceError::InvalidInput(String::from(
                "missing subscription id",
            )));
        }

        Ok(self
            .store
            .update_subscription(request.id, &subscription)
            .await?)
    }

    #[tracing::instrument(name = "Deleting a subscription", skip(self))]
    pub async fn delete_subscription(&self, id: i64) -> Result<(), ServiceError> {
        Ok(self.store.delete_subscription(id).await?)
    }

    #[tracing::instrument(name = "Listing subscriptions", skip(self))]
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ServiceError> {
        Ok(self.store.list_subscriptions().await?)
    }

    /// Sums the prices of subscriptions active between `from` and `to`. Both dates are moved
    /// to the first day of their month before the range is checked.
    #[tracing::instrument(name = "Computing total cost", skip(self))]
    pub async fn total_cost(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        user_id: Option<Uuid>,
        service_name: Option<String>,
    ) -> Result<i64, ServiceError> {
        let filter = CostFilter {
            window: CostWindow::new(from, to)?,
            user_id,
            service_name,
        };

        Ok(self.store.total_cost(&filter).await?)
    }
}
