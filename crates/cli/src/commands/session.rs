//! Login, logout, and profile commands.

use url::Url;

use pomelo_client::session::SessionManager;

use super::CommandError;

/// Start or finish a login.
///
/// Without a code this prints the authorization URL to open in a browser.
/// With `--code` (or a full `--callback` URL) it exchanges the code, loads
/// the profile, and persists the session.
pub async fn login(
    manager: &mut SessionManager,
    code: Option<String>,
    callback: Option<String>,
) -> Result<(), CommandError> {
    let code = match (code, callback) {
        (Some(code), _) => Some(code),
        (None, Some(callback)) => Some(extract_code(&callback)?),
        (None, None) => None,
    };

    let Some(code) = code else {
        let request = manager.login_request();
        tracing::info!("Open this URL in a browser to log in:");
        tracing::info!("  {}", request.url);
        tracing::info!(
            "Then run: pomelo login --callback \"<URL you were redirected to>\""
        );
        return Ok(());
    };

    let user = manager.complete_login(&code).await?;
    tracing::info!("Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

/// Show the logged-in user's profile.
pub async fn me(manager: &mut SessionManager) -> Result<(), CommandError> {
    manager.ensure_initialized().await?;

    let Some(user) = manager.user() else {
        return Err(CommandError::NotLoggedIn);
    };

    tracing::info!("Profile:");
    tracing::info!("  Name:    {}", user.name);
    tracing::info!("  Email:   {}", user.email);
    tracing::info!("  Phone:   {}", user.phone);
    tracing::info!("  Points:  {}", user.point_amount);
    tracing::info!("  Account: {}", user.account_id);
    Ok(())
}

/// Log out and clear cached credentials.
pub fn logout(manager: &mut SessionManager) -> Result<(), CommandError> {
    manager.logout()?;
    tracing::info!("Logged out");
    Ok(())
}

/// Pull the `code` query parameter out of a callback URL.
///
/// A callback carrying an `error` parameter means the user or the auth
/// server denied the authorization request.
fn extract_code(callback: &str) -> Result<String, CommandError> {
    let url = Url::parse(callback)
        .map_err(|_| CommandError::MissingCode(callback.to_string()))?;

    if let Some((_, error)) = url.query_pairs().find(|(key, _)| key == "error") {
        return Err(pomelo_client::ClientError::AuthorizationDenied(error.into_owned()).into());
    }

    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| CommandError::MissingCode(callback.to_string()))
}
