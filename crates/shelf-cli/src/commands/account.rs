//! Account command handlers

use anyhow::{bail, Result};
use tokio::sync::watch;

use shelf_core::ActionState;

use crate::output::Output;
use crate::Auth;

/// Create an account and sign in
pub fn signup(auth: &Auth, email: String, password: String, output: &Output) -> Result<()> {
    let login = auth.subscribe_login();
    if !auth.sign_up(&email, &password) {
        bail!("{}", login_error(&login, "sign-up failed"));
    }

    output.success(&format!("Signed up as {}", email.trim().to_lowercase()));
    Ok(())
}

/// Sign in to an existing account
pub fn login(auth: &Auth, email: String, password: String, output: &Output) -> Result<()> {
    let login = auth.subscribe_login();
    if !auth.sign_in(&email, &password) {
        bail!("{}", login_error(&login, "sign-in failed"));
    }

    output.success(&format!("Signed in as {}", email.trim().to_lowercase()));
    Ok(())
}

/// Sign out and forget the local session
pub fn logout(auth: &Auth, output: &Output) -> Result<()> {
    auth.sign_out();
    output.success("Signed out");
    Ok(())
}

fn login_error(login: &watch::Receiver<ActionState>, fallback: &str) -> String {
    login
        .borrow()
        .error_message()
        .unwrap_or(fallback)
        .to_string()
}
