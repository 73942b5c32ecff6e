//! Broker binary entry point.
//!
//! Parses configuration, establishes the queue connection when the
//! queue strategy is active, and serves HTTP until Ctrl+C.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use switchboard_broker::adapters::{make_log_transport, AuthAdapter, MailAdapter};
use switchboard_broker::network::{NetworkConfig, NetworkModule};
use switchboard_broker::queue::QueueConnectionManager;
use switchboard_broker::router::ActionRouter;
use switchboard_broker::{BrokerConfig, LogTransportKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BrokerConfig::parse();
    info!(transport = ?config.log_transport, "starting broker");

    let queue = Arc::new(QueueConnectionManager::new(config.amqp_url.clone()));
    if config.log_transport == LogTransportKind::Queue {
        // Startup fails outright if the backoff budget is exhausted.
        queue.connect().await?;
    }

    let mailer = Arc::new(MailAdapter::new(config.mail_url.clone()));
    let auth = AuthAdapter::new(config.auth_url.clone(), Arc::clone(&mailer));
    let log = make_log_transport(&config, &queue);
    let router = Arc::new(ActionRouter::new(auth, log));

    let network_config = NetworkConfig {
        host: config.host.clone(),
        port: config.port,
        ..NetworkConfig::default()
    };
    let queue_for_health = (config.log_transport == LogTransportKind::Queue)
        .then(|| Arc::clone(&queue));
    let mut module = NetworkModule::new(network_config, router, queue_for_health);

    let port = module.start().await?;
    info!(port, "broker listening");

    module
        .serve(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
        })
        .await
}
