use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::aggregation::{AggregationService, ServiceError};
use crate::domain::billing_month::BillingMonth;
use crate::routes::ErrorResponse;

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalCostParameters {
    /// First month of the window, `MM-YYYY`.
    #[param(example = "01-2023")]
    pub from: Option<String>,
    /// Last month of the window, `MM-YYYY`.
    #[param(example = "12-2023")]
    pub to: Option<String>,
    /// Owning user of the subscriptions to sum.
    pub id: Option<String>,
    pub service_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TotalCostResponse {
    pub total_cost: i64,
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/cost",
    tag = "subscriptions",
    params(TotalCostParameters),
    responses(
        (status = 200, description = "Sum of the matching subscription prices", body = TotalCostResponse),
        (status = 400, description = "Missing, malformed or inverted window", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "Computing total cost handler", skip(service))]
pub async fn handle_total_cost(
    parameters: web::Query<TotalCostParameters>,
    service: web::Data<AggregationService>,
) -> Result<HttpResponse, ServiceError> {
    let parameters = parameters.into_inner();

    let (from, to) = match (non_empty(parameters.from), non_empty(parameters.to)) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            return Err(ServiceError::MalformedInput(String::from(
                "missing from or to parameter",
            )))
        }
    };
    let from = parse_month(&from, "invalid from parameter")?;
    let to = parse_month(&to, "invalid to parameter")?;
    let user_id = non_empty(parameters.id)
        .map(|id| Uuid::parse_str(&id))
        .transpose()
        .map_err(|_| ServiceError::MalformedInput(String::from("invalid id")))?;
    let service_name = parameters
        .service_name
        .filter(|name| !name.trim().is_empty());

    let total_cost = service
        .total_cost(from, to, user_id, service_name)
        .await?;

    Ok(HttpResponse::Ok().json(TotalCostResponse { total_cost }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn parse_month(value: &str, message: &str) -> Result<NaiveDate, ServiceError> {
    BillingMonth::parse(value)
        .map(|month| month.as_date())
        .map_err(|_| ServiceError::MalformedInput(String::from(message)))
}
