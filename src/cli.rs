// src/cli.rs

use clap::{Parser, ValueEnum};

pub const DEFAULT_COLUMN: &str = "반영여부";
pub const DEFAULT_DONE_MARKER: &str = "완료";

/// Print one column of a table stored on a Confluence page.
///
/// Connection settings fall back to CONF_BASE, CONF_CONTEXT, CONF_PAGE_ID,
/// CONF_USER, CONF_TOKEN and CONF_TIMEOUT_SECS when the flag is not given.
#[derive(Parser, Debug, Clone)]
#[command(name = "conftable", version, about)]
pub struct Cli {
    /// Column whose values are printed (matched whitespace- and case-insensitively)
    #[arg(long, default_value = DEFAULT_COLUMN)]
    pub col: String,

    /// Column checked by --only-done [default: same as --col]
    #[arg(long)]
    pub status_col: Option<String>,

    /// Substring that marks a row as done
    #[arg(long, default_value = DEFAULT_DONE_MARKER)]
    pub done_marker: String,

    /// Only print rows whose status cell contains the done marker
    #[arg(long)]
    pub only_done: bool,

    /// Read every table that has the column, not just the first one
    #[arg(long)]
    pub all_tables: bool,

    /// Append the row's issue keys after a tab
    #[arg(long)]
    pub with_keys: bool,

    /// Confluence base URL, e.g. https://confluence.example.com:8090
    #[arg(long)]
    pub conf_base: Option<String>,

    /// Context path the instance is mounted under, e.g. /wiki
    #[arg(long)]
    pub conf_context: Option<String>,

    #[arg(long)]
    pub page_id: Option<String>,

    #[arg(long)]
    pub user: Option<String>,

    /// Password or personal access token
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long, value_enum, default_value_t = AuthScheme::Basic)]
    pub auth: AuthScheme,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Never prompt; missing credentials are an error
    #[arg(long)]
    pub no_input: bool,
}

/// How the token is presented to Confluence.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// HTTP basic auth with user and password/token
    Basic,
    /// `Authorization: Bearer <token>` (personal access token, no user)
    Bearer,
}
