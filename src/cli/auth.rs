//! CLI auth command handlers.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::auth::SessionCoordinator;
use crate::error::Result;

/// Handle `stanza auth login-url`.
pub fn handle_login_url(session: &SessionCoordinator, redirect_to: Option<&str>) -> Result<()> {
    println!("🔗 Open this URL to sign in:");
    println!("{}", session.login_url(redirect_to));
    println!("Then run: stanza auth callback '<the URL you were redirected to>'");
    Ok(())
}

/// Handle `stanza auth callback <url>`.
pub async fn handle_callback(
    session: &SessionCoordinator,
    callback_url: &str,
    sync_profile: bool,
) -> Result<()> {
    let outcome = session.complete_sign_in(callback_url).await?;
    println!("✅ Signed in as {} <{}>", outcome.user.display_name(), outcome.user.email);

    if sync_profile {
        if let Err(error) = session.client().bootstrap_profile(&outcome.user).await {
            warn!(%error, "Profile sync skipped");
        }
    }
    println!("   Continue at {}", outcome.destination);
    Ok(())
}

/// Handle `stanza auth status`.
pub fn handle_status(session: &SessionCoordinator) -> Result<()> {
    println!("🔐 Session Status\n");
    let Some(tokens) = session.tokens() else {
        println!("  ❌ Not logged in");
        return Ok(());
    };

    let expiry = match tokens.access_expiry().ok().and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0)) {
        Some(expires) if expires > Utc::now() => {
            format!("✅ Logged in (access token expires {})", expires.format("%Y-%m-%d %H:%M"))
        }
        Some(_) => "⚠️  Access token expired (refresh with `stanza auth refresh`)".to_string(),
        None => "✅ Logged in (access token expiry unknown)".to_string(),
    };
    println!("  {expiry}");
    if let Some(user) = session.current_user() {
        println!("  👤 {} <{}>", user.display_name(), user.email);
    }
    Ok(())
}

/// Handle `stanza auth whoami`.
pub async fn handle_whoami(session: &SessionCoordinator) -> Result<()> {
    match session.initialize_session().await {
        Some(user) => {
            println!("{} ({})", user.display_name(), user.initials());
            println!("  id:    {}", user.id);
            println!("  email: {}", user.email);
        }
        None => println!("❌ Not logged in"),
    }
    Ok(())
}

/// Handle `stanza auth refresh`.
pub async fn handle_refresh(session: &SessionCoordinator) -> Result<()> {
    session.refresh_tokens().await?;
    println!("✅ Tokens refreshed");
    Ok(())
}

/// Handle `stanza auth logout`.
pub async fn handle_logout(session: &SessionCoordinator) -> Result<()> {
    session.logout().await;
    println!("✅ Logged out");
    Ok(())
}
