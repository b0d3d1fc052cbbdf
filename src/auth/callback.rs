//! Parsing of the OAuth redirect that lands on `/auth/callback`.

use reqwest::Url;

use super::error::AuthError;
use super::token::TokenPair;
use crate::routing::post_auth_redirect;
use crate::types::User;

/// Query parameters the backend appends to the callback URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub redirect_to: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Parse a full callback URL or just its query string (with or without
    /// the leading `?`). Empty values count as absent.
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        let input = input.trim();
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(_) => {
                let query = input.split_once('?').map_or(input, |(_, q)| q);
                Url::parse(&format!("http://callback.invalid/?{query}"))
                    .map_err(|err| AuthError::Callback(format!("Invalid callback URL: {err}")))?
            }
        };

        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "access_token" => &mut params.access_token,
                "refresh_token" => &mut params.refresh_token,
                "redirectTo" => &mut params.redirect_to,
                "error" => &mut params.error,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        Ok(params)
    }

    /// The token pair, or the reason there isn't one. A provider error wins
    /// over missing tokens.
    pub fn into_tokens(self) -> Result<(TokenPair, Option<String>), AuthError> {
        if let Some(error) = self.error {
            return Err(AuthError::Callback(error));
        }
        match (self.access_token, self.refresh_token) {
            (Some(access), Some(refresh)) => Ok((TokenPair::new(access, refresh), self.redirect_to)),
            _ => Err(AuthError::MissingTokens),
        }
    }
}

/// Result of a completed sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct SignInOutcome {
    pub user: User,
    /// Where to send the user next.
    pub destination: String,
}

impl SignInOutcome {
    pub(crate) fn new(user: User, redirect_to: Option<&str>) -> Self {
        Self {
            user,
            destination: post_auth_redirect(redirect_to),
        }
    }
}
