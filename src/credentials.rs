//! Access token loading
//!
//! The token is read once at startup and handed to the provider; nothing keeps it
//! in global state.

use crate::error::{ReleaseTrainError, Result};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Environment variable consulted when the token file is missing
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Bearer token for the hosting provider. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(ReleaseTrainError::credentials("Access token is empty"));
        }
        Ok(AccessToken(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Reads the token from the first line of `path`, falling back to `GITHUB_TOKEN`.
pub fn load_access_token(path: &Path) -> Result<AccessToken> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            tracing::debug!(path = %path.display(), "read access token from file");
            AccessToken::new(contents.lines().next().unwrap_or_default()).map_err(|_| {
                ReleaseTrainError::credentials(format!(
                    "Token file '{}' does not start with a token",
                    path.display()
                ))
            })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => match std::env::var(TOKEN_ENV_VAR) {
            Ok(token) => {
                tracing::debug!("read access token from {}", TOKEN_ENV_VAR);
                AccessToken::new(token)
            }
            Err(_) => Err(ReleaseTrainError::credentials(format!(
                "You need to add the access token for GitHub in '{}' or set {}",
                path.display(),
                TOKEN_ENV_VAR
            ))),
        },
        Err(e) => Err(ReleaseTrainError::credentials(format!(
            "Cannot read token file '{}': {}",
            path.display(),
            e
        ))),
    }
}
