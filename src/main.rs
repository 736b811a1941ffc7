//! pingdom-operator: keeps Pingdom HTTP checks in sync with HttpCheck resources

use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pingdom_operator::config::{LogFormat, OperatorArgs};
use pingdom_operator::controller::{run_controller, ControllerState};
use pingdom_operator::pingdom::{CheckServiceSlot, PingdomClient};
use pingdom_operator::rest_api::run_server;

#[tokio::main]
async fn main() {
    let args = OperatorArgs::parse();
    init_tracing(args.log_format);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(args: OperatorArgs) -> anyhow::Result<()> {
    // Credentials are checked before anything talks to the cluster
    let pingdom_config = args
        .pingdom_config()
        .context("could not get pingdom config")?;
    info!(username = %pingdom_config.username, base_url = %pingdom_config.base_url, "Pingdom config loaded");

    let pingdom = PingdomClient::new(pingdom_config).context("could not create pingdom client")?;

    let checks = CheckServiceSlot::new();
    checks
        .install(Arc::new(pingdom))
        .context("could not initialize httpcheck service")?;

    info!("Setting up Kubernetes client");
    let client = kube::Client::try_default()
        .await
        .context("unable to set up client config")?;

    let state = Arc::new(ControllerState::new(client, checks.get()?));

    tokio::select! {
        res = run_controller(state) => res.context("controller failed")?,
        res = run_server(args.metrics_addr) => res.context("metrics server failed")?,
    }

    Ok(())
}
