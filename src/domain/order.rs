use crate::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tajikistan country code; phone numbers normalize to `992` + 9 digits.
pub const PHONE_COUNTRY_PREFIX: &str = "992";
const PHONE_DIGITS: usize = 12;
const LOCAL_PHONE_DIGITS: usize = 9;

/// A one-click purchase intent for a single product + chosen variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneClickOrder {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: Decimal,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
}

impl OneClickOrder {
    /// Validates the order and normalizes the phone number in place.
    ///
    /// Errors are distinct per field so the UI can report them precisely:
    /// a missing product reference, a non-positive price, or a phone number
    /// that does not normalize.
    pub fn normalized(mut self) -> Result<Self> {
        if self.product_id.trim().is_empty() {
            return Err(CheckoutError::Validation(
                "order is missing a product reference".to_string(),
            ));
        }
        if self.unit_price <= Decimal::ZERO {
            return Err(CheckoutError::InvalidPrice(self.unit_price));
        }
        self.phone = normalize_phone(&self.phone)?;
        Ok(self)
    }
}

/// Normalizes a raw phone number to a fixed 12-digit string with the `992`
/// country prefix. Accepts formatting characters and bare 9-digit local
/// numbers; anything else is a validation error.
pub fn normalize_phone(raw: &str) -> Result<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if digits.len() == PHONE_DIGITS && digits.starts_with(PHONE_COUNTRY_PREFIX) {
        return Ok(digits);
    }
    if digits.len() == LOCAL_PHONE_DIGITS {
        return Ok(format!("{PHONE_COUNTRY_PREFIX}{digits}"));
    }
    Err(CheckoutError::InvalidPhone(raw.to_string()))
}
