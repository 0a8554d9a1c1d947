// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Thalassa CLI entrypoint.
//!
//! Serves the editor on `http://127.0.0.1:<port>/` until interrupted. Takes no flags; settings
//! come from `THALASSA_*` environment variables and log filtering from `RUST_LOG`.

use std::error::Error;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let config = thalassa::config::ServerConfig::from_env()?;
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(thalassa::server::run(config))?;
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("thalassa: {err}");
        std::process::exit(1);
    }
}
