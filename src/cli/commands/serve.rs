//! The `serve` command.

use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::info;

use crate::ampache::Gateway;
use crate::auth::AuthSettings;
use crate::config::Config;
use crate::server;

use super::open_store;

/// Serve the Ampache endpoint until Ctrl+C.
pub fn cmd_serve(
    rt: &Runtime,
    config: &Config,
    db: Option<&Path>,
    host: Option<&str>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let addr = bind_address(config, host, port);
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);
    let cleanup_interval = match config.auth.session_cleanup_interval_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    rt.block_on(async {
        let store = open_store(config, db).await?;
        let gateway = Gateway::from_store(store, AuthSettings::from(&config.auth));

        info!(
            target: "ampache::serve",
            addr = %addr,
            session_window = config.auth.session_window_secs,
            "Starting Ampache gateway"
        );
        server::run(
            gateway,
            &addr,
            config.server.public_url.clone(),
            request_timeout,
            cleanup_interval,
        )
        .await
    })
}

fn bind_address(config: &Config, host: Option<&str>, port: Option<u16>) -> String {
    let host = host.unwrap_or(&config.server.host);
    let port = port.unwrap_or(config.server.port);
    format!("{host}:{port}")
}
