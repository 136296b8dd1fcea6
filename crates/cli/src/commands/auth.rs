//! Login and logout.

use gems_storefront::session::AuthError;
use gems_storefront::state::AppState;

use crate::output;

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<(), AuthError> {
    let user = state
        .login(email, password)
        .await
        .inspect_err(|e| output::failure(&e.to_string()))?;
    output::success(&format!(
        "Logged in as {} {} ({})",
        user.first_name, user.last_name, user.email
    ));
    output::cart(&state.engine().cart());
    Ok(())
}

pub async fn logout(state: &AppState) {
    state.logout().await;
    output::success("Logged out");
}
