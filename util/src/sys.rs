// Copyright 2024, Blog Creator Contributors
// For licensing, see licenses/COPYRIGHT.md

use ethers::{prelude::*, providers::Provider};
use eyre::{eyre, Context, Result};
use std::time::Duration;

/// How often pending transactions are polled for a receipt.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn new_provider(url: &str) -> Result<Provider<Http>> {
    let mut provider =
        Provider::<Http>::try_from(url).wrap_err_with(|| eyre!("failed to init http provider"))?;

    provider.set_interval(POLL_INTERVAL);
    Ok(provider)
}
