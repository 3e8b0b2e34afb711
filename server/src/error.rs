use lan_share::{AppError, DeviceError, StorageError};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use tracing::warn;

/// Error returned by every route: a status plus a short plain-text body.
#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub message: String,
}

impl ApiError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(Status::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Status::InternalServerError, message)
    }

    /// Upload failures: bad input is the client's fault, anything else is
    /// ours.
    pub fn from_upload(err: StorageError) -> Self {
        match err {
            StorageError::EmptyUpload => Self::bad_request("please attach at least one file"),
            StorageError::FileTooLarge { .. } => {
                Self::new(Status::PayloadTooLarge, err.to_string())
            }
            other => {
                warn!(error = %other, "unable to store upload");
                Self::internal("unable to store files")
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => Self::not_found("transfer not found"),
            StorageError::Unauthorized => Self::forbidden("invalid token"),
            _ => Self::bad_request("unable to process request"),
        }
    }
}

impl From<DeviceError> for ApiError {
    fn from(err: DeviceError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Storage(e) => e.into(),
            AppError::Device(e) => e.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        (self.status, self.message).respond_to(req)
    }
}
