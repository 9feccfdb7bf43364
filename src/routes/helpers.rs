use crate::routes::ApiError;
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::HttpRequest;

const SUCCESS: &str = "success";

#[derive(serde::Serialize)]
pub struct Listing<T> {
    message: &'static str,
    data: Vec<T>,
}

impl<T> Listing<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            message: SUCCESS,
            data,
        }
    }
}

#[derive(serde::Serialize)]
pub struct CreatedId {
    pub id: i64,
}

#[derive(serde::Serialize)]
pub struct Created {
    message: &'static str,
    data: CreatedId,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<&'static str>,
}

impl Created {
    pub fn new(id: i64) -> Self {
        Self {
            message: SUCCESS,
            data: CreatedId { id },
            info: None,
        }
    }

    pub fn with_info(mut self, info: &'static str) -> Self {
        self.info = Some(info);
        self
    }
}

/// Outcome of a by-id mutation. `changes` is 0 when the id did not exist.
#[derive(serde::Serialize)]
pub struct Changes {
    message: &'static str,
    changes: u64,
}

impl Changes {
    pub fn new(changes: u64) -> Self {
        Self {
            message: SUCCESS,
            changes,
        }
    }
}

#[derive(serde::Serialize)]
pub struct Message {
    pub message: &'static str,
}

// Bad JSON bodies get the same `{"error": ..}` shape as every other failure
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(error.to_string()).into()
}

pub fn query_error_handler(error: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(error.to_string()).into()
}
