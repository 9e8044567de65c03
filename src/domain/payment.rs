use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a gateway payment, as recorded by the backend.
///
/// The status moves monotonically toward a terminal state but may also
/// legitimately never resolve (abandoned payment). `completed` and
/// `confirmed` are both success terminals and are treated identically by
/// the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Confirmed,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Confirmed | Self::Failed | Self::Cancelled
        )
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Completed | Self::Confirmed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// Backend-held record tracking a gateway transaction. Read-only from this
/// crate's perspective; the gateway webhook mutates it server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub order_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of looking up the payment record for an order.
///
/// `NotYetCreated` is an expected condition immediately after the gateway
/// redirect, before the webhook has landed. It is deliberately not an error
/// so that callers cannot conflate it with a hard failure; transient
/// failures travel in the `Err` arm of the port's `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentLookup {
    Found(PaymentRecord),
    NotYetCreated,
}
