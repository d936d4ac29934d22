//! Print one column of a table stored on a Confluence page.
//!
//! The run is a straight pipeline: [`config::Settings::resolve`] →
//! [`fetch::fetch_storage_html`] → [`table::extract_tables`] →
//! [`project::project`] → [`project::write_values`].

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod project;
pub mod table;

pub use error::{Error, Result};

use std::io::Write;

use reqwest::Client;

/// Fetch, parse, project and print. Nothing is written unless every step
/// succeeds. Returns the number of values printed.
pub async fn run(settings: &config::Settings, out: &mut impl Write) -> Result<usize> {
    let client = Client::new();
    let markup = fetch::fetch_storage_html(&client, settings).await?;
    let values = project::extract_column(&markup, &project::Projection::from(settings))?;
    project::write_values(out, &values, settings.with_keys)?;
    Ok(values.len())
}
