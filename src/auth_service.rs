//! Login and registration: credential verification plus token minting.

use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::users::{NewUser, UserStore};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Verify credentials, refresh last-login, and mint a session token.
pub async fn login<S: UserStore>(
    ctx: &AppContext<S>,
    req: &LoginRequest,
) -> AppResult<TokenResponse> {
    if ctx.store.authenticate(&req.username, &req.password).await? {
        ctx.store.touch_login(&req.username).await?;
        let token = ctx.auth.create_token(&req.username)?;

        tracing::debug!("login succeeded");
        Ok(TokenResponse { token })
    } else {
        Err(AppError::auth("invalid username/password"))
    }
}

/// Register a new user, then log them in: last-login is refreshed and a
/// session token returned, exactly as for [`login`].
///
/// The stored credential is not part of the response.
pub async fn register<S: UserStore>(
    ctx: &AppContext<S>,
    new_user: &NewUser,
) -> AppResult<TokenResponse> {
    let user = ctx.store.create(new_user).await?;
    ctx.store.touch_login(&user.username).await?;
    let token = ctx.auth.create_token(&user.username)?;

    Ok(TokenResponse { token })
}
