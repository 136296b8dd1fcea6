//! Payment processing.
//!
//! There is no payment gateway. [`SimulatedPayment`] waits a fixed latency
//! and approves every order; the delay runs on the tokio clock so tests can
//! pause time instead of sleeping.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use super::form::CheckoutForm;

/// Default latency of the simulated processor.
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_millis(2000);

/// Errors a payment processor can report.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),
}

/// Boxed future returned by [`PaymentProcessor::process`].
pub type PaymentFuture<'a> = Pin<Box<dyn Future<Output = Result<(), PaymentError>> + Send + 'a>>;

/// Takes payment for an order.
pub trait PaymentProcessor: Send + Sync {
    fn process<'a>(&'a self, amount: Decimal, form: &'a CheckoutForm) -> PaymentFuture<'a>;
}

/// Approves every payment after a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedPayment {
    delay: Duration,
}

impl SimulatedPayment {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedPayment {
    fn default() -> Self {
        Self::new(DEFAULT_PAYMENT_DELAY)
    }
}

impl PaymentProcessor for SimulatedPayment {
    fn process<'a>(&'a self, amount: Decimal, form: &'a CheckoutForm) -> PaymentFuture<'a> {
        Box::pin(async move {
            debug!(%amount, method = %form.payment_method, "Simulating payment");
            tokio::time::sleep(self.delay).await;
            Ok(())
        })
    }
}
