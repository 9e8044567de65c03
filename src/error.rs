use thiserror::Error;

/// Reasons a backend can reject an order submission.
///
/// Each well-known reason maps to a message suitable for direct display.
/// The raw backend payload is carried in `Other` and is only shown to the
/// user when no friendlier mapping exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    Duplicate,
    ConstraintViolation,
    PermissionDenied,
    Other(String),
}

impl RejectionReason {
    pub fn user_message(&self) -> String {
        match self {
            Self::Duplicate => "This order was already submitted.".to_string(),
            Self::ConstraintViolation => {
                "The order could not be saved. Please check the details and try again.".to_string()
            }
            Self::PermissionDenied => {
                "You are not allowed to place this order.".to_string()
            }
            Self::Other(raw) => raw.clone(),
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate => write!(f, "duplicate"),
            Self::ConstraintViolation => write!(f, "constraint violation"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("invalid price: {0}")]
    InvalidPrice(rust_decimal::Decimal),

    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error("no order to track")]
    MissingOrder,

    #[error("backend rejected the request: {0}")]
    BackendRejection(RejectionReason),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CheckoutError {
    /// Whether a retry could plausibly succeed without user intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }

    /// Human-readable message for the UI. Raw backend errors are only
    /// passed through when no friendlier mapping exists.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::InvalidPhone(_) => {
                "Please enter a valid phone number, e.g. 992 90 123 45 67.".to_string()
            }
            Self::InvalidPrice(_) => "This product has no valid price.".to_string(),
            Self::UnknownProduct(_) => "This product is no longer available.".to_string(),
            Self::MissingOrder => "There is no order to track.".to_string(),
            Self::BackendRejection(reason) => reason.user_message(),
            Self::BackendUnavailable(_) => {
                "The service is temporarily unavailable. Please try again.".to_string()
            }
            Self::Storage(_) | Self::Snapshot(_) | Self::Csv(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
