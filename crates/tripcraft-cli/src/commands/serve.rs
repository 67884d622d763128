//! Web server command

use anyhow::Result;

use tripcraft_core::ai::AIClient;
use tripcraft_core::speech::SpeechClient;
use tripcraft_server::ServerConfig;

use super::open_store;

/// Start the web server
pub async fn cmd_serve(host: &str, port: u16, static_dir: Option<&str>) -> Result<()> {
    let store = open_store()?;
    let ai = AIClient::from_env();
    let speech = SpeechClient::from_env();

    let allowed_origins = std::env::var("TRIPCRAFT_ALLOWED_ORIGINS")
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    tripcraft_server::serve(
        host,
        port,
        store,
        ai,
        speech,
        static_dir,
        ServerConfig { allowed_origins },
    )
    .await
}
