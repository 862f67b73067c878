// # dnsmonitor - DNS change monitor
//
// The dnsmonitor binary is responsible for:
// 1. Parsing the command line and the notification config file
// 2. Initializing logging and the runtime
// 3. Registering notification channels and building the resolver
// 4. Starting the monitor loop
//
// All monitoring logic lives in dnsmonitor-core.
//
// ## Configuration
//
// - Targets and options: command line (see `dnsmonitor --help`)
// - Channel credentials: JSON file, `~/.config/dnsmonitor.json` by default
//
// ```json
// {
//   "gotify_server": "https://gotify.example.com",
//   "gotify_token": "<application token>",
//   "pushbullet_token": "<access token>",
//   "pushbullet_device": "Phone"
// }
// ```
//
// - `DNSMONITOR_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// dnsmonitor -i 10 -d 1.1.1.1 www.example.com mx:example.com ns:example.com
// ```

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use dnsmonitor_core::{
    ChannelRegistry, Dispatcher, Monitor, MonitorConfig, MonitoredDomain, NotifyConfig,
    parse_targets,
};
use dnsmonitor_resolver_hickory::HickoryResolver;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown
/// - 1: Invalid target on the command line
/// - 2: Configuration error (config file, log level)
/// - 3: Runtime failure
#[derive(Debug, Clone, Copy)]
enum MonitorExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Malformed domain token
    InvalidTarget = 1,
    /// Configuration error
    ConfigError = 2,
    /// Runtime error (unexpected failure)
    RuntimeError = 3,
}

impl From<MonitorExitCode> for ExitCode {
    fn from(code: MonitorExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!(
                "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            );
            return MonitorExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return MonitorExitCode::ConfigError.into();
    }

    // Validate targets before anything touches the network
    let domains = match parse_targets(&cli.targets) {
        Ok(domains) => domains,
        Err(e) => {
            eprintln!("{}", e);
            return MonitorExitCode::InvalidTarget.into();
        }
    };

    let config_path = cli.config_path();
    let notify_config = match NotifyConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return MonitorExitCode::ConfigError.into();
        }
    };

    let monitor_config = MonitorConfig::new()
        .with_interval_minutes(cli.interval)
        .with_custom_resolver(cli.dns.clone());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MonitorExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_monitor(domains, monitor_config, notify_config).await {
            Ok(()) => MonitorExitCode::CleanShutdown,
            Err(e) => {
                error!("Monitor error: {:#}", e);
                MonitorExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Build the channels and resolver, then run the monitor until interrupted
async fn run_monitor(
    domains: Vec<MonitoredDomain>,
    monitor_config: MonitorConfig,
    notify_config: NotifyConfig,
) -> Result<()> {
    let registry = build_registry();
    let channels = registry
        .create_channels(&notify_config)
        .context("Failed to create notification channels")?;
    let dispatcher = Dispatcher::new(channels);

    let enabled = dispatcher.enabled_channels();
    if enabled.is_empty() {
        warn!("No notification channels configured, changes will only be logged");
    } else {
        info!("Notification channels: {}", enabled.join(", "));
    }

    let resolver = HickoryResolver::from_endpoint(monitor_config.custom_resolver.as_deref())
        .await
        .context("Failed to initialize DNS resolver")?;

    let (mut monitor, events) =
        Monitor::new(Box::new(resolver), dispatcher, domains, monitor_config)?;
    // Nothing here consumes monitor events; the log carries them
    drop(events);

    monitor.run().await?;

    info!("Monitor stopped");
    Ok(())
}

/// Register the channels compiled into this binary
fn build_registry() -> ChannelRegistry {
    #[allow(unused_mut)]
    let mut registry = ChannelRegistry::new();

    #[cfg(feature = "gotify")]
    dnsmonitor_notify_gotify::register(&mut registry);

    #[cfg(feature = "pushbullet")]
    dnsmonitor_notify_pushbullet::register(&mut registry);

    registry
}
