use anyhow::Context;
use apanel::kernel::config::load_config;
use apanel::domain::config::PanelConfig;
use apanel_logger::Logger;
use apanel_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: PanelConfig = load_config(Some("apanel")).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.logging)?;

    Server::builder().config(cfg).build().await?.run().await
}
