use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use homestay_core::{AuthError, BookingError, DatabaseError, PaymentError};

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or invalid credential, or insufficient role. Both collapse
    /// into one message, so a caller cannot learn which guard failed.
    #[error("unauthorized access")]
    Unauthorized,
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Room is not available")]
    RoomUnavailable,
    #[error("Room still has bookings")]
    RoomOccupied,
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound {
                resource: _,
                identifier: _,
            } => StatusCode::NOT_FOUND,
            Self::Conflict {
                resource: _,
                field: _,
                value: _,
            } => StatusCode::CONFLICT,
            Self::RoomUnavailable => StatusCode::CONFLICT,
            Self::RoomOccupied => StatusCode::CONFLICT,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.as_status_code(), self.to_string()).into_response()
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Unauthenticated => Self::Unauthorized,
            AuthError::Forbidden => Self::Unauthorized,
            AuthError::Db(e) => e.into(),
        }
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<BookingError> for ServerError {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::InvalidPrice => Self::InvalidInput("Booking price must be positive"),
            BookingError::RoomUnavailable => Self::RoomUnavailable,
            BookingError::RoomOccupied => Self::RoomOccupied,
            BookingError::Forbidden => Self::Unauthorized,
            BookingError::Db(e) => e.into(),
        }
    }
}

impl From<PaymentError> for ServerError {
    fn from(value: PaymentError) -> Self {
        match value {
            PaymentError::InvalidAmount => Self::InvalidInput("Amount must be at least 1"),
            PaymentError::InvalidCurrency => Self::InvalidInput("Currency must not be empty"),
            PaymentError::Upstream(e) => Self::Unknown(e),
        }
    }
}
