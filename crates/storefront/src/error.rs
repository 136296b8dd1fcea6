//! Cart errors and the user-facing outcome derived from them.
//!
//! Cart mutations return `Result<(), CartError>`; nothing here is fatal.
//! UI layers that want a flat `{success, message}` shape convert the result
//! into a [`CartOutcome`], whose message never exposes internal details.

use serde::Serialize;
use thiserror::Error;

use gems_core::ProductId;

use crate::remote::RemoteError;
use crate::storage::StorageError;

/// Errors returned by cart engine operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Guest add referenced a product the catalog does not know.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Add was called with a zero quantity.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Remote cart service call failed.
    #[error("cart service error: {0}")]
    Remote(#[from] RemoteError),

    /// Local storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Message safe to show to the shopper.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::ProductNotFound(_) => "Product not found".to_string(),
            Self::InvalidQuantity => "Quantity must be at least 1".to_string(),
            Self::Remote(RemoteError::Rejected(msg)) => msg.clone(),
            Self::Remote(RemoteError::NotConfigured) => {
                "Your cart is unavailable right now".to_string()
            }
            Self::Remote(_) => "Could not reach the cart service, please try again".to_string(),
            Self::Storage(_) => "Could not save your cart".to_string(),
        }
    }

    /// Log the error, capturing infrastructure failures to Sentry.
    pub fn report(&self) {
        if matches!(self, Self::Remote(_) | Self::Storage(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Cart operation failed"
            );
        } else {
            tracing::debug!(error = %self, "Cart operation rejected");
        }
    }
}

/// Flat success/failure shape for UI consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CartOutcome {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

impl From<Result<(), CartError>> for CartOutcome {
    fn from(result: Result<(), CartError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self {
                success: false,
                message: Some(e.message()),
            },
        }
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after login to associate errors with the shopper.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_ok() {
        let outcome = CartOutcome::from(Ok(()));
        assert!(outcome.success);
        assert_eq!(outcome.message, None);
    }

    #[test]
    fn test_outcome_hides_internals() {
        let err = CartError::Remote(RemoteError::Status {
            status: 500,
            body: "stack trace at db.rs:42".to_string(),
        });
        let outcome = CartOutcome::from(Err(err));
        assert!(!outcome.success);
        let message = outcome.message.unwrap_or_default();
        assert!(!message.contains("db.rs"));
    }

    #[test]
    fn test_rejection_message_is_passed_through() {
        let err = CartError::Remote(RemoteError::Rejected("Out of stock".to_string()));
        assert_eq!(err.message(), "Out of stock");
    }

    #[test]
    fn test_error_display() {
        let err = CartError::ProductNotFound(ProductId::new("42"));
        assert_eq!(err.to_string(), "product not found: 42");
        assert_eq!(err.message(), "Product not found");
    }
}
