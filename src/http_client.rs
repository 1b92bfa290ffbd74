use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::config::http_timeout_from_env;

const USER_AGENT: &str = concat!("toplines_terminal/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Builds the shared client with `timeout_secs`. Later calls return the
/// client built first.
pub fn init_http_client(timeout_secs: u64) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

pub fn http_client() -> Result<&'static Client> {
    init_http_client(http_timeout_from_env())
}
