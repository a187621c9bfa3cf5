use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::aggregation::ServiceError;

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: String::from("success"),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::DateRange(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ServiceError::Store(_) = self {
            tracing::error!("Request failed: {:?}", self);
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

// Extractor failures happen before any handler runs, so they are reported as client errors
// with the same body shape as the service errors.
pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    bad_request(err)
}

pub fn path_error_handler(err: PathError, _: &HttpRequest) -> actix_web::Error {
    bad_request(err)
}

pub fn query_error_handler(err: QueryPayloadError, _: &HttpRequest) -> actix_web::Error {
    bad_request(err)
}

fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    tracing::warn!("Rejected malformed request: {}", err);

    let response = HttpResponse::BadRequest().json(ErrorResponse {
        error: err.to_string(),
    });

    InternalError::from_response(err, response).into()
}
