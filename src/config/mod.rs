// src/config/mod.rs

pub mod credentials;

use std::{collections::HashMap, fmt, time::Duration};

use tracing::debug;

use crate::cli::{AuthScheme, Cli};
use crate::{Error, Result};
pub use credentials::{
    CredentialChain, CredentialProvider, EnvCredentials, FlagCredentials, PromptCredentials,
};

pub const ENV_BASE: &str = "CONF_BASE";
pub const ENV_CONTEXT: &str = "CONF_CONTEXT";
pub const ENV_PAGE_ID: &str = "CONF_PAGE_ID";
pub const ENV_USER: &str = "CONF_USER";
pub const ENV_TOKEN: &str = "CONF_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "CONF_TIMEOUT_SECS";

pub const DEFAULT_BASE: &str = "http://localhost:8090";
pub const DEFAULT_CONTEXT: &str = "/wiki";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Read access to environment variables.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<V: AsRef<str>> EnvSource for HashMap<&str, V> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.as_ref().to_string())
    }
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Value kept verbatim, or `None` when absent or all whitespace. Used for
/// tokens, whose edges may be significant, from every provider alike.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Flag, then environment, then nothing.
fn flag_or_env(flag: &Option<String>, env: &impl EnvSource, key: &str) -> Option<String> {
    non_empty(flag.clone()).or_else(|| non_empty(env.var(key)))
}

pub struct Credentials {
    pub scheme: AuthScheme,
    /// Absent for bearer tokens.
    pub user: Option<String>,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("scheme", &self.scheme)
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Everything a run needs, resolved up front.
#[derive(Debug)]
pub struct Settings {
    pub base: String,
    pub context: String,
    pub page_id: String,
    pub credentials: Credentials,
    pub timeout: Duration,
    pub column: String,
    pub status_column: Option<String>,
    pub done_marker: String,
    pub only_done: bool,
    pub all_tables: bool,
    pub with_keys: bool,
}

impl Settings {
    /// Resolve each setting as flag > environment > default. Credentials come
    /// from `chain`, which is only consulted once the page is known.
    pub fn resolve(cli: &Cli, env: &impl EnvSource, chain: &CredentialChain) -> Result<Self> {
        let base = flag_or_env(&cli.conf_base, env, ENV_BASE)
            .unwrap_or_else(|| DEFAULT_BASE.to_string());

        // an explicitly empty context is meaningful (root deployment)
        let context = match cli.conf_context.as_deref() {
            Some(ctx) => ctx.trim().to_string(),
            None => env
                .var(ENV_CONTEXT)
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
        };

        let page_id = flag_or_env(&cli.page_id, env, ENV_PAGE_ID).ok_or_else(|| {
            Error::ConfigMissing {
                what: "page id",
                hint: format!("pass --page-id or set {ENV_PAGE_ID}"),
            }
        })?;

        let timeout_secs = match cli.timeout_secs {
            Some(secs) => secs,
            None => match non_empty(env.var(ENV_TIMEOUT_SECS)) {
                Some(raw) => raw.parse().map_err(|e| Error::ConfigInvalid {
                    what: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                    reason: format!("{e}"),
                })?,
                None => DEFAULT_TIMEOUT_SECS,
            },
        };

        let column = non_empty(Some(cli.col.clone())).ok_or_else(|| Error::ConfigMissing {
            what: "column",
            hint: "--col must not be empty".to_string(),
        })?;

        if cli.done_marker.trim().is_empty() {
            return Err(Error::ConfigInvalid {
                what: "done marker",
                value: cli.done_marker.clone(),
                reason: "must not be blank, it would match every row".to_string(),
            });
        }

        let credentials = resolve_credentials(cli.auth, chain)?;

        let settings = Settings {
            base,
            context,
            page_id,
            credentials,
            timeout: Duration::from_secs(timeout_secs),
            column,
            status_column: non_empty(cli.status_col.clone()),
            done_marker: cli.done_marker.clone(),
            only_done: cli.only_done,
            all_tables: cli.all_tables,
            with_keys: cli.with_keys,
        };
        debug!(?settings, "settings resolved");
        Ok(settings)
    }
}

fn resolve_credentials(scheme: AuthScheme, chain: &CredentialChain) -> Result<Credentials> {
    let user = match scheme {
        AuthScheme::Basic => Some(chain.user()?.ok_or_else(|| Error::ConfigMissing {
            what: "user",
            hint: format!("pass --user or set {ENV_USER}"),
        })?),
        AuthScheme::Bearer => None,
    };
    let token = chain.token()?.ok_or_else(|| Error::ConfigMissing {
        what: "token",
        hint: format!("pass --token or set {ENV_TOKEN}"),
    })?;
    Ok(Credentials {
        scheme,
        user,
        token,
    })
}
