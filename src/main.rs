use anyhow::{anyhow, Result};
use dnsgate::{Config, DynPermission, PermissionByDns, SharedConfig, UdpResolverClient};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("dnsgate".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    let policy = config.policy();
    tracing::info!(
        "allowing domains that resolve to {} via {}",
        policy.target_address(),
        policy.effective_resolver()
    );
    let permission: DynPermission =
        Arc::new(PermissionByDns::new(policy, UdpResolverClient::default()));

    tracing::info!("API listening on {}", &config.api_bind_addr);
    let api_server = dnsgate::api::new(config.clone(), permission)?;
    let api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dnsgate=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}
