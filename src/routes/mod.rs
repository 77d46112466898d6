use crate::helper::admin_helpers::AdminHelperError;
use crate::helper::public_helpers::CatalogError;
use crate::helper::submission_helpers::SubmissionError;
use actix_web::HttpResponse;
use serde_json::json;

pub mod admin;
pub mod public;
pub mod reader;

fn failure(mut builder: actix_web::HttpResponseBuilder, message: &str) -> HttpResponse {
    builder.json(json!({ "success": false, "error": message }))
}

/// Maps the submission taxonomy onto HTTP. Storage faults are logged here and
/// reach the caller only as an opaque 500.
pub(crate) fn submission_error_response(e: &SubmissionError, context: &str) -> HttpResponse {
    match e {
        SubmissionError::Validation(msg) => failure(HttpResponse::BadRequest(), msg),
        SubmissionError::NotFound => failure(HttpResponse::NotFound(), "Submission not found"),
        SubmissionError::AlreadyProcessed => failure(HttpResponse::Conflict(), "Submission already processed"),
        SubmissionError::Persistence(cause) => {
            log::error!("{}: {}", context, cause);
            failure(HttpResponse::InternalServerError(), context)
        }
    }
}

pub(crate) fn catalog_error_response(e: &CatalogError, context: &str) -> HttpResponse {
    match e {
        CatalogError::NotFound => failure(HttpResponse::NotFound(), "Not found"),
        CatalogError::Persistence(cause) => {
            log::error!("{}: {}", context, cause);
            failure(HttpResponse::InternalServerError(), context)
        }
    }
}

pub(crate) fn admin_error_response(e: &AdminHelperError, context: &str) -> HttpResponse {
    match e {
        AdminHelperError::Validation(msg) => failure(HttpResponse::BadRequest(), msg),
        AdminHelperError::NotFound => failure(HttpResponse::NotFound(), "Not found"),
        AdminHelperError::Persistence(cause) => {
            log::error!("{}: {}", context, cause);
            failure(HttpResponse::InternalServerError(), context)
        }
    }
}

pub(crate) fn bad_request(message: &str) -> HttpResponse {
    failure(HttpResponse::BadRequest(), message)
}
