//! Fault Notification
//!
//! MQTT-based fan-out of newly created faults. Publishing is
//! fire-and-forget from the engine's point of view: delivery failures are
//! reported to the caller, which logs and swallows them.

use chrono::{DateTime, Utc};
use rumqttc::{AsyncClient, Event, MqttOptions, QoS};
use serde::{Deserialize, Serialize};
use std::future::Future;
use storage::FaultRecord;
use thiserror::Error;
use tracing::{debug, error, info};

/// Notification error types
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Publish sink for created faults.
///
/// No delivery guarantee is assumed; the engine treats a failed publish as
/// a logged non-event.
pub trait FaultNotifier: Send + Sync {
    fn publish_fault(
        &self,
        fault: &FaultRecord,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// MQTT broker host
    pub broker_host: String,
    /// MQTT port
    pub broker_port: u16,
    /// Site identifier included in every message envelope
    pub site_id: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            site_id: "unknown".to_string(),
        }
    }
}

/// Message envelope published for each fault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultMessage {
    pub message_type: String,
    pub site_id: String,
    pub published_at: DateTime<Utc>,
    pub fault: FaultRecord,
}

/// MQTT notifier
pub struct MqttNotifier {
    config: NotifierConfig,
    client: Option<AsyncClient>,
}

impl MqttNotifier {
    /// Create a notifier; call `connect` before publishing
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Connect to the MQTT broker and spawn the event loop handler
    pub async fn connect(&mut self) -> Result<(), NotifyError> {
        let mut options = MqttOptions::new(
            format!("twin-monitor-{}", self.config.site_id),
            &self.config.broker_host,
            self.config.broker_port,
        );
        options.set_keep_alive(std::time::Duration::from_secs(30));

        let (client, mut eventloop) = AsyncClient::new(options, 10);

        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(incoming)) => {
                        debug!("MQTT incoming: {:?}", incoming);
                    }
                    Err(e) => {
                        error!("MQTT error: {}", e);
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    }
                    _ => {}
                }
            }
        });

        self.client = Some(client);
        info!("Connected to MQTT broker: {}", self.config.broker_host);
        Ok(())
    }
}

impl FaultNotifier for MqttNotifier {
    async fn publish_fault(&self, fault: &FaultRecord) -> Result<(), NotifyError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| NotifyError::Connection("Not connected".to_string()))?;

        let message = FaultMessage {
            message_type: "fault".to_string(),
            site_id: self.config.site_id.clone(),
            published_at: Utc::now(),
            fault: fault.clone(),
        };

        let payload = serde_json::to_vec(&message)
            .map_err(|e| NotifyError::Serialization(e.to_string()))?;

        let topic = format!("models/{}/faults", fault.model_id);

        client
            .publish(&topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| NotifyError::Publish(e.to_string()))?;

        debug!("Published fault {} to {}", fault.id, topic);
        Ok(())
    }
}

/// Notifier that drops every message; used for tests and offline operation
#[derive(Debug, Default, Clone)]
pub struct NoopNotifier;

impl FaultNotifier for NoopNotifier {
    async fn publish_fault(&self, fault: &FaultRecord) -> Result<(), NotifyError> {
        debug!("Dropping notification for fault {}", fault.id);
        Ok(())
    }
}

/// Runtime-selected notifier backend
pub enum AnyNotifier {
    Mqtt(MqttNotifier),
    Noop(NoopNotifier),
}

impl FaultNotifier for AnyNotifier {
    async fn publish_fault(&self, fault: &FaultRecord) -> Result<(), NotifyError> {
        match self {
            AnyNotifier::Mqtt(mqtt) => mqtt.publish_fault(fault).await,
            AnyNotifier::Noop(noop) => noop.publish_fault(fault).await,
        }
    }
}
