use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::billing_month::BillingMonth;
use crate::domain::period::{ActivePeriod, DateRangeError};
use crate::domain::price::Price;
use crate::domain::service_name::ServiceName;

/// A subscription as it is persisted. Both dates always fall on the first day of a month.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Subscription {
    pub id: i64,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Wire representation of a subscription. Dates travel as `MM-YYYY` strings and an `id` of
/// zero means the subscription has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionRequest {
    #[serde(default)]
    pub id: i64,
    #[schema(example = "Netflix")]
    pub service_name: String,
    #[schema(example = 499)]
    pub price: i32,
    pub user_id: Uuid,
    #[schema(example = "08-2025")]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

#[derive(Debug)]
pub struct NewSubscription {
    pub service_name: ServiceName,
    pub price: Price,
    pub user_id: Uuid,
    pub period: ActivePeriod,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid date format: {0}")]
    DateFormat(String),
    #[error("{0}")]
    InvalidField(String),
    #[error(transparent)]
    DateRange(#[from] DateRangeError),
}

impl TryFrom<&SubscriptionRequest> for NewSubscription {
    type Error = ValidationError;

    fn try_from(request: &SubscriptionRequest) -> Result<Self, Self::Error> {
        let start =
            BillingMonth::parse(&request.start_date).map_err(ValidationError::DateFormat)?;
        let end = request
            .end_date
            .as_deref()
            .map(BillingMonth::parse)
            .transpose()
            .map_err(ValidationError::DateFormat)?;
        let service_name = ServiceName::parse(request.service_name.clone())
            .map_err(ValidationError::InvalidField)?;
        let price = Price::parse(request.price).map_err(ValidationError::InvalidField)?;
        let period = ActivePeriod::new(start, end)?;

        Ok(NewSubscription {
            service_name,
            price,
            user_id: request.user_id,
            period,
        })
    }
}

impl From<Subscription> for SubscriptionRequest {
    fn from(subscription: Subscription) -> Self {
        SubscriptionRequest {
            id: subscription.id,
            service_name: subscription.service_name,
            price: subscription.price,
            user_id: subscription.user_id,
            start_date: BillingMonth::from_date(subscription.start_date).to_string(),
            end_date: subscription
                .end_date
                .map(|date| BillingMonth::from_date(date).to_string()),
        }
    }
}
