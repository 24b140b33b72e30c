//! Rate Limiting Middleware using GCRA Algorithm
//!
//! IP-based rate limiting via tower_governor. GCRA gives accurate
//! enforcement without a background sweeper task.

use governor::middleware::StateInformationMiddleware;
use serde::Deserialize;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config with rate-limit headers enabled
pub type DefaultGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Seconds per replenished request
    pub per_second: u64,
    /// Max requests that can be made immediately
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 1,
            burst_size: 20,
        }
    }
}

impl RateLimitConfig {
    /// Tier for lifecycle actions (acknowledge/resolve)
    pub fn actions() -> Self {
        Self {
            per_second: 2,
            burst_size: 5,
        }
    }

    /// Tier for high-volume telemetry ingest
    pub fn ingest() -> Self {
        Self {
            per_second: 1,
            burst_size: 100,
        }
    }
}

/// Build a governor config for use with `GovernorLayer`.
///
/// Uses the peer IP as the key, so the service must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`. Responses carry
/// X-RateLimit-* headers.
pub fn create_governor_config(config: &RateLimitConfig) -> Arc<DefaultGovernorConfig> {
    Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.per_second)
            .burst_size(config.burst_size)
            .use_headers()
            .finish()
            .expect("rate limit config must be non-zero"),
    )
}
