//! Twin Monitoring Backend - Main Entry Point

use api::{init_logging, AppState, Settings};
use detection::{DetectionConfig, DetectionEngine};
use fault_rules::RuleStore;
use notifier::{AnyNotifier, MqttNotifier, NoopNotifier, NotifierConfig};
use std::sync::Arc;
use storage::MemoryRepository;
use sweeper::{Sweeper, SweeperConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Twin Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    let settings = Settings::load()?;

    let repository = Arc::new(MemoryRepository::new());
    let rules = Arc::new(RuleStore::with_builtin_rules());

    let notifier = match &settings.mqtt {
        Some(mqtt) => {
            let mut mqtt_notifier = MqttNotifier::new(NotifierConfig {
                broker_host: mqtt.host.clone(),
                broker_port: mqtt.port,
                site_id: settings.site_id.clone(),
            });
            if let Err(err) = mqtt_notifier.connect().await {
                warn!("MQTT connect failed, notifications disabled: {}", err);
            }
            Arc::new(AnyNotifier::Mqtt(mqtt_notifier))
        }
        None => {
            info!("No MQTT broker configured, notifications disabled");
            Arc::new(AnyNotifier::Noop(NoopNotifier))
        }
    };

    let engine = Arc::new(DetectionEngine::new(
        rules.clone(),
        repository.clone(),
        notifier,
        DetectionConfig {
            history_window_secs: settings.history_window_secs,
        },
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweep = Sweeper::new(
        engine.clone(),
        repository.clone(),
        SweeperConfig {
            interval_secs: settings.sweep.interval_secs,
            lookback_secs: settings.sweep.lookback_secs,
        },
    );
    let sweep_handle = tokio::spawn(async move { sweep.run(shutdown_rx).await });

    let state = Arc::new(AppState {
        repository,
        rules,
        engine,
        version: env!("CARGO_PKG_VERSION").to_string(),
        start_time: std::time::Instant::now(),
    });

    api::run_server(state, &settings).await?;

    let _ = shutdown_tx.send(true);
    sweep_handle.await?;
    info!("Shutdown complete");
    Ok(())
}
