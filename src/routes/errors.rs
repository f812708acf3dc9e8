use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::http::StatusCode;
use actix_web::{
    HttpResponse,
    ResponseError,
};
use custom_error::custom_error;

use crate::authentication::AuthError;
use crate::domain::MalformedInput;
use crate::services::ServiceError;

custom_error! {
///! Error inside route handler
pub RouteError
    InvalidBody{source:MalformedInput} = "Invalid body data: {source}",
    InvalidRequest{message:String} = "{message}",
    Unauthenticated{source:AuthError} = "{source}",
    Service{source:ServiceError} = "{source}",
}

#[derive(serde::Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl RouteError {
    fn code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "validation_error",
            StatusCode::UNAUTHORIZED => "unauthorized",
            StatusCode::FORBIDDEN => "forbidden",
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::CONFLICT => "conflict",
            _ => "internal",
        }
    }
}

impl ResponseError for RouteError {
    fn status_code(&self) -> StatusCode {
        match self {
            RouteError::InvalidBody { .. } | RouteError::InvalidRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            RouteError::Unauthenticated { source } => match source {
                AuthError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
                AuthError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RouteError::Service { source } => match source {
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::AccessDenied(_) => StatusCode::FORBIDDEN,
                ServiceError::ValidationFailure(_) => StatusCode::BAD_REQUEST,
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{:?}", self);
            "Internal server error".to_string()
        } else {
            tracing::warn!("{}", self);
            self.to_string()
        };
        let mut response = HttpResponse::build(status_code);
        if status_code == StatusCode::UNAUTHORIZED {
            response.insert_header((WWW_AUTHENTICATE, r#"Basic realm="newsletter-lists""#));
        }
        response.json(ErrorBody {
            code: self.code(),
            message,
        })
    }
}
