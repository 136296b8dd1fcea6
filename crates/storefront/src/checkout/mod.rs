//! Checkout: form, validation, payment and the step machine.

mod form;
mod machine;
mod payment;
mod validation;

pub use form::{Address, CheckoutField, CheckoutForm};
pub use machine::{CheckoutError, CheckoutMachine, CheckoutStep, OrderConfirmation};
pub use payment::{
    DEFAULT_PAYMENT_DELAY, PaymentError, PaymentFuture, PaymentProcessor, SimulatedPayment,
};
pub use validation::{ValidationErrors, validate_step};
