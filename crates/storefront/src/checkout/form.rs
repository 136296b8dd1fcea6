//! Checkout form data.

use core::fmt;

use serde::{Deserialize, Serialize};

use gems_core::PaymentMethod;

const DEFAULT_COUNTRY: &str = "Morocco";

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            street: String::new(),
            city: String::new(),
            zip_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

/// Everything the shopper enters during checkout.
///
/// `same_as_billing` is recorded but the billing address is never copied
/// from the shipping address automatically.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub same_as_billing: bool,
    pub payment_method: PaymentMethod,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub card_name: String,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            shipping_address: Address::default(),
            billing_address: Address::default(),
            same_as_billing: true,
            payment_method: PaymentMethod::default(),
            card_number: String::new(),
            expiry_date: String::new(),
            cvv: String::new(),
            card_name: String::new(),
        }
    }
}

impl CheckoutForm {
    /// Current value of a text field.
    #[must_use]
    pub fn value(&self, field: CheckoutField) -> &str {
        match field {
            CheckoutField::Email => &self.email,
            CheckoutField::FirstName => &self.first_name,
            CheckoutField::LastName => &self.last_name,
            CheckoutField::Phone => &self.phone,
            CheckoutField::ShippingStreet => &self.shipping_address.street,
            CheckoutField::ShippingCity => &self.shipping_address.city,
            CheckoutField::ShippingZipCode => &self.shipping_address.zip_code,
            CheckoutField::ShippingCountry => &self.shipping_address.country,
            CheckoutField::BillingStreet => &self.billing_address.street,
            CheckoutField::BillingCity => &self.billing_address.city,
            CheckoutField::BillingZipCode => &self.billing_address.zip_code,
            CheckoutField::BillingCountry => &self.billing_address.country,
            CheckoutField::CardNumber => &self.card_number,
            CheckoutField::ExpiryDate => &self.expiry_date,
            CheckoutField::Cvv => &self.cvv,
            CheckoutField::CardName => &self.card_name,
        }
    }

    /// Overwrite a text field.
    pub fn set(&mut self, field: CheckoutField, value: impl Into<String>) {
        let slot = match field {
            CheckoutField::Email => &mut self.email,
            CheckoutField::FirstName => &mut self.first_name,
            CheckoutField::LastName => &mut self.last_name,
            CheckoutField::Phone => &mut self.phone,
            CheckoutField::ShippingStreet => &mut self.shipping_address.street,
            CheckoutField::ShippingCity => &mut self.shipping_address.city,
            CheckoutField::ShippingZipCode => &mut self.shipping_address.zip_code,
            CheckoutField::ShippingCountry => &mut self.shipping_address.country,
            CheckoutField::BillingStreet => &mut self.billing_address.street,
            CheckoutField::BillingCity => &mut self.billing_address.city,
            CheckoutField::BillingZipCode => &mut self.billing_address.zip_code,
            CheckoutField::BillingCountry => &mut self.billing_address.country,
            CheckoutField::CardNumber => &mut self.card_number,
            CheckoutField::ExpiryDate => &mut self.expiry_date,
            CheckoutField::Cvv => &mut self.cvv,
            CheckoutField::CardName => &mut self.card_name,
        };
        *slot = value.into();
    }
}

impl fmt::Debug for CheckoutForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &str| if value.is_empty() { "" } else { "[REDACTED]" };
        f.debug_struct("CheckoutForm")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone", &self.phone)
            .field("shipping_address", &self.shipping_address)
            .field("billing_address", &self.billing_address)
            .field("same_as_billing", &self.same_as_billing)
            .field("payment_method", &self.payment_method)
            .field("card_number", &redact(&self.card_number))
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &redact(&self.cvv))
            .field("card_name", &self.card_name)
            .finish()
    }
}

/// A text field of the checkout form, named by its form key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheckoutField {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "firstName")]
    FirstName,
    #[serde(rename = "lastName")]
    LastName,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "shippingAddress.street")]
    ShippingStreet,
    #[serde(rename = "shippingAddress.city")]
    ShippingCity,
    #[serde(rename = "shippingAddress.zipCode")]
    ShippingZipCode,
    #[serde(rename = "shippingAddress.country")]
    ShippingCountry,
    #[serde(rename = "billingAddress.street")]
    BillingStreet,
    #[serde(rename = "billingAddress.city")]
    BillingCity,
    #[serde(rename = "billingAddress.zipCode")]
    BillingZipCode,
    #[serde(rename = "billingAddress.country")]
    BillingCountry,
    #[serde(rename = "cardNumber")]
    CardNumber,
    #[serde(rename = "expiryDate")]
    ExpiryDate,
    #[serde(rename = "cvv")]
    Cvv,
    #[serde(rename = "cardName")]
    CardName,
}

impl CheckoutField {
    pub const ALL: [Self; 16] = [
        Self::Email,
        Self::FirstName,
        Self::LastName,
        Self::Phone,
        Self::ShippingStreet,
        Self::ShippingCity,
        Self::ShippingZipCode,
        Self::ShippingCountry,
        Self::BillingStreet,
        Self::BillingCity,
        Self::BillingZipCode,
        Self::BillingCountry,
        Self::CardNumber,
        Self::ExpiryDate,
        Self::Cvv,
        Self::CardName,
    ];

    /// The form key, e.g. `shippingAddress.street`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Phone => "phone",
            Self::ShippingStreet => "shippingAddress.street",
            Self::ShippingCity => "shippingAddress.city",
            Self::ShippingZipCode => "shippingAddress.zipCode",
            Self::ShippingCountry => "shippingAddress.country",
            Self::BillingStreet => "billingAddress.street",
            Self::BillingCity => "billingAddress.city",
            Self::BillingZipCode => "billingAddress.zipCode",
            Self::BillingCountry => "billingAddress.country",
            Self::CardNumber => "cardNumber",
            Self::ExpiryDate => "expiryDate",
            Self::Cvv => "cvv",
            Self::CardName => "cardName",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for CheckoutField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("unknown checkout field: {s}"))
    }
}
