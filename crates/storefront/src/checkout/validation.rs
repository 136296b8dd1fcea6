//! Per-step form validation.
//!
//! Checks are presence-only: an email or phone number is accepted as long
//! as it is not blank.

use std::collections::BTreeMap;

use core::fmt;

use serde::Serialize;

use super::form::{CheckoutField, CheckoutForm};
use super::machine::CheckoutStep;

/// Field-keyed validation failures, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<CheckoutField, String>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: CheckoutField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Drop the error for one field, if any.
    pub fn clear_field(&mut self, field: CheckoutField) {
        self.0.remove(&field);
    }

    #[must_use]
    pub fn contains(&self, field: CheckoutField) -> bool {
        self.0.contains_key(&field)
    }

    #[must_use]
    pub fn get(&self, field: CheckoutField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CheckoutField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

const SHIPPING_REQUIRED: [(CheckoutField, &str); 7] = [
    (CheckoutField::Email, "Email is required"),
    (CheckoutField::FirstName, "First name is required"),
    (CheckoutField::LastName, "Last name is required"),
    (CheckoutField::Phone, "Phone is required"),
    (CheckoutField::ShippingStreet, "Address is required"),
    (CheckoutField::ShippingCity, "City is required"),
    (CheckoutField::ShippingZipCode, "Zip code is required"),
];

const CARD_REQUIRED: [(CheckoutField, &str); 4] = [
    (CheckoutField::CardNumber, "Card number is required"),
    (CheckoutField::ExpiryDate, "Expiry date is required"),
    (CheckoutField::Cvv, "CVV is required"),
    (CheckoutField::CardName, "Name on card is required"),
];

/// Validate the fields a step gates on.
///
/// # Errors
///
/// Returns every missing field of the step.
pub fn validate_step(form: &CheckoutForm, step: CheckoutStep) -> Result<(), ValidationErrors> {
    let required: &[(CheckoutField, &str)] = match step {
        CheckoutStep::Shipping => &SHIPPING_REQUIRED,
        CheckoutStep::Payment if form.payment_method.requires_card_details() => &CARD_REQUIRED,
        CheckoutStep::Payment | CheckoutStep::Review | CheckoutStep::Complete => &[],
    };

    let mut errors = ValidationErrors::new();
    for (field, message) in required {
        if form.value(*field).is_empty() {
            errors.insert(*field, *message);
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gems_core::PaymentMethod;

    fn shipping_filled() -> CheckoutForm {
        let mut form = CheckoutForm::default();
        form.set(CheckoutField::Email, "not-an-email");
        form.set(CheckoutField::FirstName, "Amina");
        form.set(CheckoutField::LastName, "Benali");
        form.set(CheckoutField::Phone, "x");
        form.set(CheckoutField::ShippingStreet, "12 Rue Atlas");
        form.set(CheckoutField::ShippingCity, "Rabat");
        form.set(CheckoutField::ShippingZipCode, "10000");
        form
    }

    #[test]
    fn test_empty_form_fails_every_shipping_field() {
        let errors = validate_step(&CheckoutForm::default(), CheckoutStep::Shipping).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert_eq!(errors.get(CheckoutField::Email), Some("Email is required"));
        assert!(errors.contains(CheckoutField::ShippingStreet));
    }

    #[test]
    fn test_shipping_checks_presence_only() {
        assert!(validate_step(&shipping_filled(), CheckoutStep::Shipping).is_ok());
    }

    #[test]
    fn test_whitespace_counts_as_present() {
        let mut form = CheckoutForm::default();
        for (field, _) in &SHIPPING_REQUIRED {
            form.set(*field, " ");
        }
        assert!(validate_step(&form, CheckoutStep::Shipping).is_ok());
    }

    #[test]
    fn test_card_fields_required_only_for_card() {
        let mut form = shipping_filled();
        let errors = validate_step(&form, CheckoutStep::Payment).unwrap_err();
        assert_eq!(errors.len(), 4);

        form.payment_method = PaymentMethod::Cash;
        assert!(validate_step(&form, CheckoutStep::Payment).is_ok());
    }

    #[test]
    fn test_review_has_no_checks() {
        assert!(validate_step(&CheckoutForm::default(), CheckoutStep::Review).is_ok());
    }

    #[test]
    fn test_errors_serialize_by_form_key() {
        let errors = validate_step(&CheckoutForm::default(), CheckoutStep::Shipping).unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["shippingAddress.zipCode"], "Zip code is required");
        assert!(errors.to_string().starts_with("email: Email is required"));
    }
}
