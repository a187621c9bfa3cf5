use utoipa::OpenApi;

use super::error::{ErrorResponse, StatusResponse};
use super::subscriptions::{self, CreatedSubscription};
use super::total_cost::{self, TotalCostResponse};
use crate::domain::subscription::SubscriptionRequest;

/// OpenAPI document of the `/api/v1` routes, served next to the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Subscription aggregation service API",
        description = "Manages user subscriptions and computes their cost over a range of months."
    ),
    paths(
        subscriptions::handle_create_subscription,
        subscriptions::handle_read_subscription,
        subscriptions::handle_update_subscription,
        subscriptions::handle_delete_subscription,
        subscriptions::handle_list_subscriptions,
        total_cost::handle_total_cost,
    ),
    components(schemas(
        SubscriptionRequest,
        CreatedSubscription,
        StatusResponse,
        ErrorResponse,
        TotalCostResponse
    )),
    tags((name = "subscriptions", description = "Subscription records and cost aggregation"))
)]
pub struct ApiDoc;
