use crate::error::Result;
use std::time::Duration;

/// Blocking HTTP client shared by the generation and notification clients.
pub fn blocking_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    // reqwest is built without a default crypto provider; a second install is a no-op error
    let _ = rustls::crypto::ring::default_provider().install_default();

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("sprig/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
