// src/config/credentials.rs

use dialoguer::{theme::ColorfulTheme, Input, Password};
use tracing::debug;

use super::{non_blank, non_empty, EnvSource, ENV_TOKEN, ENV_USER};
use crate::{Error, Result};

/// One place a user name or token may come from.
pub trait CredentialProvider {
    fn name(&self) -> &'static str;
    fn user(&self) -> Result<Option<String>>;
    fn token(&self) -> Result<Option<String>>;
}

/// Values passed as `--user` / `--token`.
pub struct FlagCredentials {
    user: Option<String>,
    token: Option<String>,
}

impl FlagCredentials {
    pub fn new(user: Option<String>, token: Option<String>) -> Self {
        Self { user, token }
    }
}

impl CredentialProvider for FlagCredentials {
    fn name(&self) -> &'static str {
        "flag"
    }

    fn user(&self) -> Result<Option<String>> {
        Ok(non_empty(self.user.clone()))
    }

    fn token(&self) -> Result<Option<String>> {
        Ok(non_blank(self.token.clone()))
    }
}

/// `CONF_USER` / `CONF_TOKEN`, captured when the chain is built.
pub struct EnvCredentials {
    user: Option<String>,
    token: Option<String>,
}

impl EnvCredentials {
    pub fn from_env(env: &impl EnvSource) -> Self {
        Self {
            user: env.var(ENV_USER),
            token: env.var(ENV_TOKEN),
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn user(&self) -> Result<Option<String>> {
        Ok(non_empty(self.user.clone()))
    }

    fn token(&self) -> Result<Option<String>> {
        Ok(non_blank(self.token.clone()))
    }
}

/// Asks on the terminal. The token is read without echo.
pub struct PromptCredentials;

impl CredentialProvider for PromptCredentials {
    fn name(&self) -> &'static str {
        "prompt"
    }

    fn user(&self) -> Result<Option<String>> {
        let theme = ColorfulTheme::default();
        loop {
            let value: String = Input::with_theme(&theme)
                .with_prompt("ID")
                .interact_text()
                .map_err(|source| Error::Prompt {
                    what: "user",
                    source,
                })?;
            if let Some(v) = non_empty(Some(value)) {
                return Ok(Some(v));
            }
        }
    }

    fn token(&self) -> Result<Option<String>> {
        let theme = ColorfulTheme::default();
        loop {
            let value = Password::with_theme(&theme)
                .with_prompt("Password")
                .interact()
                .map_err(|source| Error::Prompt {
                    what: "token",
                    source,
                })?;
            if let Some(v) = non_blank(Some(value)) {
                return Ok(Some(v));
            }
        }
    }
}

/// Ordered providers; each field takes the first provider that yields it.
#[derive(Default)]
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// flag → environment → prompt (the prompt only when `interactive`).
    pub fn standard(
        user: Option<String>,
        token: Option<String>,
        env: &impl EnvSource,
        interactive: bool,
    ) -> Self {
        let chain = Self::new()
            .with(FlagCredentials::new(user, token))
            .with(EnvCredentials::from_env(env));
        if interactive {
            chain.with(PromptCredentials)
        } else {
            chain
        }
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn user(&self) -> Result<Option<String>> {
        for p in &self.providers {
            if let Some(v) = p.user()? {
                debug!(source = p.name(), "user resolved");
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    pub fn token(&self) -> Result<Option<String>> {
        for p in &self.providers {
            if let Some(v) = p.token()? {
                debug!(source = p.name(), "token resolved");
                return Ok(Some(v));
            }
        }
        Ok(None)
    }
}
