use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::aggregation::{AggregationService, ServiceError};
use crate::domain::subscription::SubscriptionRequest;
use crate::routes::{ErrorResponse, StatusResponse};

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CreatedSubscription {
    pub id: i64,
}

#[utoipa::path(
    post,
    path = "/api/v1/subscription",
    tag = "subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = CreatedSubscription),
        (status = 400, description = "Malformed or invalid subscription", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    name = "Creating a new subscription handler",
    skip(body, service),
    fields(
        service_name = %body.service_name,
        user_id = %body.user_id
    )
)]
pub async fn handle_create_subscription(
    body: web::Json<SubscriptionRequest>,
    service: web::Data<AggregationService>,
) -> Result<HttpResponse, ServiceError> {
    let id = service.create_subscription(&body).await?;

    Ok(HttpResponse::Created().json(CreatedSubscription { id }))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscription/{id}",
    tag = "subscriptions",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Stored subscription", body = SubscriptionRequest),
        (status = 400, description = "Non-numeric id", body = ErrorResponse),
        (status = 404, description = "Unknown subscription", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "Reading a subscription handler", skip(service))]
pub async fn handle_read_subscription(
    path: web::Path<i64>,
    service: web::Data<AggregationService>,
) -> Result<HttpResponse, ServiceError> {
    let subscription = service.read_subscription(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(SubscriptionRequest::from(subscription)))
}

#[utoipa::path(
    put,
    path = "/api/v1/subscription/update",
    tag = "subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Subscription replaced", body = StatusResponse),
        (status = 400, description = "Malformed or invalid subscription", body = ErrorResponse),
        (status = 404, description = "Unknown subscription", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    name = "Updating a subscription handler",
    skip(body, service),
    fields(subscription_id = %body.id)
)]
pub async fn handle_update_subscription(
    body: web::Json<SubscriptionRequest>,
    service: web::Data<AggregationService>,
) -> Result<HttpResponse, ServiceError> {
    service.update_subscription(&body).await?;

    Ok(HttpResponse::Ok().json(StatusResponse::success()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/subscription/delete/{id}",
    tag = "subscriptions",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription deleted", body = StatusResponse),
        (status = 400, description = "Non-numeric id", body = ErrorResponse),
        (status = 404, description = "Unknown subscription", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "Deleting a subscription handler", skip(service))]
pub async fn handle_delete_subscription(
    path: web::Path<i64>,
    service: web::Data<AggregationService>,
) -> Result<HttpResponse, ServiceError> {
    service.delete_subscription(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(StatusResponse::success()))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Every stored subscription", body = Vec<SubscriptionRequest>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "Listing subscriptions handler", skip(service))]
pub async fn handle_list_subscriptions(
    service: web::Data<AggregationService>,
) -> Result<HttpResponse, ServiceError> {
    let subscriptions: Vec<SubscriptionRequest> = service
        .list_subscriptions()
        .await?
        .into_iter()
        .map(SubscriptionRequest::from)
        .collect();

    Ok(HttpResponse::Ok().json(subscriptions))
}
