//! The checkout step machine.
//!
//! ```text
//! Shipping (1) <-> Payment (2) <-> Review (3) --submit--> Complete
//! ```
//!
//! Forward moves are gated on validating the current step; backward moves
//! never validate. `Complete` is terminal.

use std::sync::Arc;

use core::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use gems_core::{Cart, OrderNumber, PaymentMethod};

use super::form::{CheckoutField, CheckoutForm};
use super::payment::{PaymentError, PaymentProcessor};
use super::validation::{ValidationErrors, validate_step};
use crate::cart::CartEngine;
use crate::clock::Clock;

/// A checkout stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Shipping,
    Payment,
    Review,
    Complete,
}

impl CheckoutStep {
    /// 1-based position in the flow; `Complete` is 4.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Payment => 2,
            Self::Review => 3,
            Self::Complete => 4,
        }
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Shipping => Some(Self::Payment),
            Self::Payment => Some(Self::Review),
            Self::Review | Self::Complete => None,
        }
    }

    const fn previous(self) -> Option<Self> {
        match self {
            Self::Payment => Some(Self::Shipping),
            Self::Review => Some(Self::Payment),
            Self::Shipping | Self::Complete => None,
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shipping => write!(f, "shipping"),
            Self::Payment => write!(f, "payment"),
            Self::Review => write!(f, "review"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Errors returned by checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The current step has missing fields.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The operation is not allowed from the current step.
    #[error("cannot {action} from the {step} step")]
    InvalidTransition {
        step: CheckoutStep,
        action: &'static str,
    },

    /// Checkout needs at least one cart item.
    #[error("cart is empty")]
    EmptyCart,

    /// The payment processor failed; the order was not placed.
    #[error("order submission failed: {0}")]
    SubmissionFailed(#[source] PaymentError),
}

impl CheckoutError {
    /// Message safe to show to the shopper.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation(_) => "Please fill in the required fields".to_string(),
            Self::InvalidTransition { .. } => self.to_string(),
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::SubmissionFailed(_) => {
                "Error processing the order. Please try again.".to_string()
            }
        }
    }
}

/// What the shopper sees once the order is placed. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_number: OrderNumber,
    pub email: String,
    pub total: Decimal,
    pub item_count: u64,
}

/// Drives one checkout from shipping details to a placed order.
///
/// Owns its form exclusively. The cart is snapshotted once at start; only
/// [`submit`](Self::submit) reaches back into the cart engine, to clear it.
pub struct CheckoutMachine {
    engine: Arc<CartEngine>,
    payment: Arc<dyn PaymentProcessor>,
    clock: Arc<dyn Clock>,
    cart: Cart,
    form: CheckoutForm,
    step: CheckoutStep,
    errors: ValidationErrors,
    confirmation: Option<OrderConfirmation>,
}

impl CheckoutMachine {
    /// Begin checkout over the engine's current cart.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` when there is nothing to check out.
    pub fn start(
        engine: Arc<CartEngine>,
        payment: Arc<dyn PaymentProcessor>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CheckoutError> {
        let cart = engine.cart();
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self {
            engine,
            payment,
            clock,
            cart,
            form: CheckoutForm::default(),
            step: CheckoutStep::Shipping,
            errors: ValidationErrors::new(),
            confirmation: None,
        })
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Errors from the last failed validation, minus fields edited since.
    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// The cart snapshot taken at start.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    /// Set a text field and clear its pending error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` once checkout is complete.
    pub fn update_field(
        &mut self,
        field: CheckoutField,
        value: impl Into<String>,
    ) -> Result<(), CheckoutError> {
        self.ensure_open("edit the form")?;
        self.form.set(field, value);
        self.errors.clear_field(field);
        Ok(())
    }

    /// Replace every form field at once, e.g. from a saved form file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` once checkout is complete.
    pub fn fill(&mut self, form: CheckoutForm) -> Result<(), CheckoutError> {
        self.ensure_open("edit the form")?;
        self.form = form;
        self.errors = ValidationErrors::new();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` once checkout is complete.
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.ensure_open("edit the form")?;
        self.form.payment_method = method;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` once checkout is complete.
    pub fn set_same_as_billing(&mut self, same: bool) -> Result<(), CheckoutError> {
        self.ensure_open("edit the form")?;
        self.form.same_as_billing = same;
        Ok(())
    }

    /// Validate a step, replacing the error map with the result.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with the missing fields, or `InvalidTransition`
    /// once checkout is complete.
    pub fn validate(&mut self, step: CheckoutStep) -> Result<(), CheckoutError> {
        self.ensure_open("validate")?;
        match validate_step(&self.form, step) {
            Ok(()) => {
                self.errors = ValidationErrors::new();
                Ok(())
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(CheckoutError::Validation(errors))
            }
        }
    }

    /// Move to the next step if the current one validates.
    ///
    /// # Errors
    ///
    /// Returns `Validation` and stays put when fields are missing, or
    /// `InvalidTransition` from Review (use [`submit`](Self::submit)) and
    /// Complete.
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.ensure_open("advance")?;
        let next = self.step.next().ok_or(CheckoutError::InvalidTransition {
            step: self.step,
            action: "advance",
        })?;
        self.validate(self.step)?;
        self.step = next;
        Ok(next)
    }

    /// Go back one step without validating.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from Shipping and Complete; the step is
    /// unchanged.
    pub fn retreat(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.ensure_open("go back")?;
        let previous = self.step.previous().ok_or(CheckoutError::InvalidTransition {
            step: self.step,
            action: "go back",
        })?;
        self.step = previous;
        Ok(previous)
    }

    /// Place the order.
    ///
    /// Revalidates the payment step, runs the payment processor, clears the
    /// cart and completes. A failed cart clear is logged and does not undo
    /// the confirmation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside Review, `Validation` when payment
    /// fields are missing, or `SubmissionFailed` when the processor fails.
    /// The machine stays on Review for every error.
    #[instrument(skip(self), fields(step = %self.step))]
    pub async fn submit(&mut self) -> Result<OrderConfirmation, CheckoutError> {
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::InvalidTransition {
                step: self.step,
                action: "submit",
            });
        }
        self.validate(CheckoutStep::Payment)?;

        let total = self.cart.total_price;
        if let Err(e) = self.payment.process(total, &self.form).await {
            warn!("Payment failed: {e}");
            return Err(CheckoutError::SubmissionFailed(e));
        }

        let order_number = order_number_at(self.clock.now().timestamp_millis());

        if let Err(e) = self.engine.clear().await {
            e.report();
            warn!(order_number = %order_number, "Order placed but cart was not cleared");
        }

        let confirmation = OrderConfirmation {
            order_number,
            email: self.form.email.clone(),
            total,
            item_count: self.cart.total_item_count(),
        };
        info!(order_number = %confirmation.order_number, %total, "Order placed");

        self.step = CheckoutStep::Complete;
        self.confirmation = Some(confirmation.clone());
        Ok(confirmation)
    }

    fn ensure_open(&self, action: &'static str) -> Result<(), CheckoutError> {
        if self.step == CheckoutStep::Complete {
            return Err(CheckoutError::InvalidTransition {
                step: self.step,
                action,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for CheckoutMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutMachine")
            .field("step", &self.step)
            .field("form", &self.form)
            .field("errors", &self.errors)
            .field("confirmation", &self.confirmation)
            .finish_non_exhaustive()
    }
}

/// `ORD-` followed by the last six digits of a millisecond timestamp.
fn order_number_at(millis: i64) -> OrderNumber {
    OrderNumber::new(format!("ORD-{:06}", millis.rem_euclid(1_000_000)))
}
