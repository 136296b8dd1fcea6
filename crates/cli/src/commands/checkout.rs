//! Non-interactive checkout from a form file.

use std::path::Path;

use tracing::info;

use gems_storefront::checkout::{CheckoutError, CheckoutForm, CheckoutStep};
use gems_storefront::state::AppState;

use crate::output;

/// Read a checkout form from YAML or JSON.
///
/// JSON is a subset of YAML, so one parser handles both.
pub async fn load_form(path: &Path) -> Result<CheckoutForm, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Walk the form through every step and place the order.
pub async fn run(state: &AppState, form_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let form = load_form(Path::new(form_path))
        .await
        .inspect_err(|e| output::failure(&e.to_string()))?;
    info!(path = %form_path, "Loaded checkout form");

    let mut machine = state.start_checkout().inspect_err(|e| output::failure(&e.message()))?;
    machine.fill(form)?;

    while machine.step() != CheckoutStep::Review {
        if let Err(e) = machine.advance() {
            report(&e);
            return Err(e.into());
        }
    }

    output::cart(machine.cart());
    let confirmation = machine.submit().await.inspect_err(report)?;
    output::confirmation(&confirmation);
    Ok(())
}

fn report(e: &CheckoutError) {
    match e {
        CheckoutError::Validation(errors) => output::validation(errors),
        other => output::failure(&other.message()),
    }
}
