//! Panel runtime - fetch orchestration for dashboard panels.
//!
//! Each panel moves `loading → {data | error}` and only re-enters
//! `loading` on an explicit refresh (a range-selector change or a
//! scheduler tick). A refresh joins all of its sources before publishing,
//! so a panel never renders from a partial fetch.
//!
//! Refreshes are stamped with a monotonically increasing generation.
//! When a newer refresh starts before an older one resolves, the older
//! result is discarded on arrival instead of clobbering the newer state.

use crate::aggregate::{aggregate, Aggregation};
use crate::client::ApiClient;
use crate::error::RadarError;
use crate::score::{local_risk_level, protection_level, RiskSource};
use crate::types::{now_ms, LogRecord, ProtectionLevel, RiskInsights, RiskLevel, StatsSummary, TimeRange};
use log::{error, info, warn};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

// ================================================================================================
// PANEL STATE
// ================================================================================================

/// Lifecycle of one panel's data.
#[derive(Clone, Debug)]
pub enum PanelState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> PanelState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, PanelState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            PanelState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PanelState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

// ================================================================================================
// VIEW-MODEL
// ================================================================================================

/// Everything the radar dashboard renders for one range selection.
#[derive(Clone, Debug)]
pub struct RadarSnapshot {
    pub range: TimeRange,

    /// Backend-computed outcome summary for the range.
    pub stats: StatsSummary,

    /// Client-side aggregation over the fetched records.
    pub aggregation: Aggregation,

    pub risk_level: RiskLevel,
    /// Which classifier produced `risk_level`.
    pub risk_source: RiskSource,
    pub protection_level: ProtectionLevel,

    /// Present only when the external classification was used.
    pub insights: Option<RiskInsights>,
}

impl RadarSnapshot {
    /// Build the view-model from a complete set of fetched sources,
    /// taking risk/protection from the external classification.
    pub fn from_sources(
        range: TimeRange,
        stats: StatsSummary,
        insights: RiskInsights,
        records: &[LogRecord],
    ) -> Self {
        RadarSnapshot {
            range,
            stats,
            aggregation: aggregate(records, range),
            risk_level: insights.last24h.risk_level,
            risk_source: RiskSource::External,
            protection_level: insights.protection_level,
            insights: Some(insights),
        }
    }

    /// Build the view-model without the insights collaborator, classifying
    /// risk with the local threshold fallback.
    pub fn from_local(
        range: TimeRange,
        records: &[LogRecord],
        enforcement_active: Option<bool>,
    ) -> Self {
        let aggregation = aggregate(records, range);
        let stats = aggregation.summary.clone();
        RadarSnapshot {
            range,
            risk_level: local_risk_level(&stats),
            risk_source: RiskSource::Local,
            protection_level: protection_level(enforcement_active),
            stats,
            aggregation,
            insights: None,
        }
    }
}

// ================================================================================================
// GENERATION STAMPING
// ================================================================================================

/// Monotonic counter keying in-flight refreshes.
#[derive(Debug, Default)]
pub struct Generations(AtomicU64);

impl Generations {
    /// Claim the next generation, invalidating all earlier ones.
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `generation` is still the newest.
    pub fn is_current(&self, generation: u64) -> bool {
        self.0.load(Ordering::SeqCst) == generation
    }
}

// ================================================================================================
// DASHBOARD PANEL
// ================================================================================================

/// The radar dashboard panel: owns its state and refresh orchestration.
pub struct DashboardPanel {
    client: Arc<ApiClient>,
    state: RwLock<PanelState<RadarSnapshot>>,
    generations: Generations,
}

impl DashboardPanel {
    pub fn new(client: Arc<ApiClient>) -> Self {
        DashboardPanel {
            client,
            state: RwLock::new(PanelState::Loading),
            generations: Generations::default(),
        }
    }

    /// Snapshot of the current panel state.
    pub fn state(&self) -> PanelState<RadarSnapshot> {
        self.state.read().clone()
    }

    /// Fetch all panel sources for `range` and publish the view-model.
    ///
    /// Stats, insights and logs resolve together; a failure in any of
    /// them fails the whole refresh. Transport failures land in the
    /// `Failed` state and are not returned; auth expiry additionally
    /// propagates to the caller, which owns session handling.
    ///
    /// A refresh whose generation went stale while in flight publishes
    /// nothing.
    pub async fn refresh(&self, range: TimeRange) -> Result<(), RadarError> {
        let generation = self.generations.begin();
        *self.state.write() = PanelState::Loading;

        let result = tokio::try_join!(
            self.client.fetch_stats(range),
            self.client.fetch_insights(range),
            self.client.fetch_logs(range),
        );

        if !self.generations.is_current(generation) {
            info!("discarding stale refresh (generation {})", generation);
            return Ok(());
        }

        match result {
            Ok((stats, insights, records)) => {
                let snapshot = RadarSnapshot::from_sources(range, stats, insights, &records);
                *self.state.write() = PanelState::Ready(snapshot);
                Ok(())
            }
            Err(RadarError::AuthExpired) => {
                *self.state.write() = PanelState::Failed(RadarError::AuthExpired.to_string());
                Err(RadarError::AuthExpired)
            }
            Err(err) => {
                warn!("panel refresh failed: {}", err);
                *self.state.write() = PanelState::Failed(err.to_string());
                Ok(())
            }
        }
    }
}

// ================================================================================================
// SCHEDULED REFRESH
// ================================================================================================

/// Configuration for the background panel refresh.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between refresh operations
    pub refresh_interval: Duration,
    /// Whether the scheduler is enabled
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            // Dashboards tolerate five minutes of staleness between
            // explicit range changes.
            refresh_interval: Duration::from_secs(5 * 60),
            enabled: true,
        }
    }
}

/// Background task that periodically re-runs a panel refresh.
///
/// Spawned once during dashboard initialization. Errors are logged and
/// the loop continues, with one exception: auth expiry ends the loop,
/// since every further poll would fail the same way until the session is
/// re-established.
pub struct PanelScheduler {
    panel: Arc<DashboardPanel>,
    range: RwLock<TimeRange>,
    config: SchedulerConfig,
    last_refresh_at: RwLock<u64>,
}

impl PanelScheduler {
    pub fn new(panel: Arc<DashboardPanel>, range: TimeRange, config: SchedulerConfig) -> Self {
        Self {
            panel,
            range: RwLock::new(range),
            config,
            last_refresh_at: RwLock::new(now_ms()),
        }
    }

    /// Change the range used by subsequent ticks.
    pub fn set_range(&self, range: TimeRange) {
        *self.range.write() = range;
    }

    /// Timestamp (Unix ms) of the last successful refresh, or
    /// initialization time if none has completed yet.
    pub fn last_refresh(&self) -> u64 {
        *self.last_refresh_at.read()
    }

    /// Run the refresh loop. Should be spawned as a tokio task; returns
    /// immediately when disabled in config.
    pub async fn start(self: Arc<Self>) {
        if !self.config.enabled {
            info!("scheduled panel refresh is disabled, skipping");
            return;
        }

        info!(
            "starting scheduled panel refresh with {}-second interval",
            self.config.refresh_interval.as_secs()
        );

        let mut ticker = interval(self.config.refresh_interval);

        loop {
            ticker.tick().await;
            let range = *self.range.read();
            match self.panel.refresh(range).await {
                Ok(()) => {
                    *self.last_refresh_at.write() = now_ms();
                }
                Err(RadarError::AuthExpired) => {
                    warn!("session expired, stopping scheduled panel refresh");
                    return;
                }
                Err(err) => {
                    error!("scheduled panel refresh failed: {}", err);
                }
            }
        }
    }
}
