//! Customer contact and shipping details.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};

/// Contact and shipping fields entered at checkout.
///
/// Serialized flat into the `POST /orders` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ShippingDetails {
    pub customer_name: String,
    pub customer_email: String,
    /// 10-digit mobile number.
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    /// 6-digit postal code.
    pub shipping_pincode: String,
}

impl ShippingDetails {
    /// Trim surrounding whitespace from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            customer_name: self.customer_name.trim().to_string(),
            customer_email: self.customer_email.trim().to_string(),
            customer_phone: self.customer_phone.trim().to_string(),
            shipping_address: self.shipping_address.trim().to_string(),
            shipping_city: self.shipping_city.trim().to_string(),
            shipping_state: self.shipping_state.trim().to_string(),
            shipping_pincode: self.shipping_pincode.trim().to_string(),
        }
    }

    /// Check that the form is complete and well formed.
    ///
    /// Returns the first problem found as a message fit to show the customer.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let required = [
            (&self.customer_name, "Name"),
            (&self.customer_email, "Email"),
            (&self.customer_phone, "Phone"),
            (&self.shipping_address, "Address"),
            (&self.shipping_city, "City"),
            (&self.shipping_state, "State"),
            (&self.shipping_pincode, "Pincode"),
        ];
        for (value, label) in required {
            if value.trim().is_empty() {
                return Err(invalid(format!("{label} is required")));
            }
        }

        if !is_email(self.customer_email.trim()) {
            return Err(invalid("Please enter a valid email address"));
        }
        if !is_digits(self.customer_phone.trim(), 10) {
            return Err(invalid("Phone number must be 10 digits"));
        }
        if !is_digits(self.shipping_pincode.trim(), 6) {
            return Err(invalid("Pincode must be 6 digits"));
        }
        Ok(())
    }

    /// Check if [`validate`](Self::validate) passes.
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}

fn invalid(message: impl Into<String>) -> CommerceError {
    CommerceError::ValidationError(message.into())
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ShippingDetails {
        ShippingDetails {
            customer_name: "Asha Rao".to_string(),
            customer_email: "asha@example.com".to_string(),
            customer_phone: "9876543210".to_string(),
            shipping_address: "12 MG Road".to_string(),
            shipping_city: "Bengaluru".to_string(),
            shipping_state: "Karnataka".to_string(),
            shipping_pincode: "560001".to_string(),
        }
    }

    #[test]
    fn test_valid_details() {
        assert!(valid().validate().is_ok());
        assert!(valid().is_complete());
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut details = valid();
        details.shipping_city = "   ".to_string();
        assert_eq!(
            details.validate(),
            Err(CommerceError::ValidationError("City is required".to_string()))
        );
    }

    #[test]
    fn test_email_needs_both_sides() {
        for bad in ["asha", "@example.com", "asha@", "a@b@c"] {
            let mut details = valid();
            details.customer_email = bad.to_string();
            assert!(details.validate().is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn test_phone_and_pincode_lengths() {
        let mut details = valid();
        details.customer_phone = "98765".to_string();
        assert!(details.validate().is_err());

        let mut details = valid();
        details.shipping_pincode = "56000a".to_string();
        assert!(details.validate().is_err());
    }

    #[test]
    fn test_trimmed() {
        let mut details = valid();
        details.customer_name = "  Asha Rao ".to_string();
        assert_eq!(details.trimmed().customer_name, "Asha Rao");
    }

    #[test]
    fn test_serializes_flat_field_names() {
        let value = serde_json::to_value(valid()).unwrap();
        assert_eq!(value["shipping_pincode"], "560001");
        assert_eq!(value["customer_phone"], "9876543210");
    }
}
