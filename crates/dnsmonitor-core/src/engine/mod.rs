//! Monitor loop
//!
//! The Monitor is responsible for:
//! - Resolving every monitored domain once per cycle
//! - Classifying each result against the stored one
//! - Dispatching notifications on first observation and on change
//! - Keeping the per-domain state
//!
//! ## Architecture
//!
//! ```text
//!                     ┌──────────────┐
//!   interval tick ──▶ │   Monitor    │ (owns Vec<MonitoredDomain>)
//!                     └──────────────┘
//!                            │  for each domain, in order
//!         ┌──────────────────┼───────────────────┐
//!         ▼                  ▼                   ▼
//! ┌─────────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Resolver   │    │   classify   │    │  Dispatcher  │
//! │  (lookup)   │    │  (detector)  │    │ (fan-out)    │
//! └─────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Resolve the domain (errors fold into "not found")
//! 2. Compare with the last stored result
//! 3. First observation → informational notification
//! 4. Changed → change notification with old and new values
//! 5. Store the new result

use crate::config::MonitorConfig;
use crate::detector::{Observation, ResolutionResult, classify};
use crate::dispatcher::Dispatcher;
use crate::domain::{MonitoredDomain, QueryType};
use crate::error::{Error, Result};
use crate::traits::{Notification, Priority, Resolver, resolve};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Events emitted by the Monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Monitor entered the running state
    Started {
        domains_count: usize,
    },

    /// First resolution of a domain
    FirstObservation {
        name: String,
        query_type: QueryType,
        result: ResolutionResult,
    },

    /// Resolution differs from the stored result
    Changed {
        name: String,
        query_type: QueryType,
        previous: ResolutionResult,
        current: ResolutionResult,
    },

    /// Monitor stopped
    Stopped {
        reason: String,
    },
}

/// Per-cycle counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Domains resolved for the first time
    pub first_observations: usize,
    /// Domains whose result changed
    pub changed: usize,
    /// Domains whose result did not change
    pub unchanged: usize,
}

/// DNS change monitor
///
/// Owns the monitored domains and is the only writer of their state.
///
/// ## Lifecycle
///
/// 1. Create with [`Monitor::new()`] (validates config and domains)
/// 2. Start with [`Monitor::run()`]: one cycle immediately, then one per interval
/// 3. Runs until the process is interrupted
///
/// ## Timing
///
/// Domains are resolved one after another. A cycle that overruns the
/// interval is followed immediately by the next one; missed ticks are not
/// replayed.
pub struct Monitor {
    /// Resolver used for every lookup
    resolver: Box<dyn Resolver>,

    /// Notification fan-out
    dispatcher: Dispatcher,

    /// Domains in configured order
    domains: Vec<MonitoredDomain>,

    /// Interval between cycles
    interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<MonitorEvent>,

    /// Events dropped because the channel was full
    dropped_events: usize,
}

impl Monitor {
    /// Create a new monitor
    ///
    /// # Returns
    ///
    /// A tuple of (monitor, event_receiver) where event_receiver yields monitor events
    pub fn new(
        resolver: Box<dyn Resolver>,
        dispatcher: Dispatcher,
        domains: Vec<MonitoredDomain>,
        config: MonitorConfig,
    ) -> Result<(Self, mpsc::Receiver<MonitorEvent>)> {
        config.validate()?;

        if domains.is_empty() {
            return Err(Error::config("No domains to monitor"));
        }

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let monitor = Self {
            resolver,
            dispatcher,
            domains,
            interval: Duration::from_secs(config.interval_secs),
            event_tx: tx,
            dropped_events: 0,
        };

        Ok((monitor, rx))
    }

    /// Monitored domains with their current state
    pub fn domains(&self) -> &[MonitoredDomain] {
        &self.domains
    }

    /// Number of events dropped because the receiver fell behind
    ///
    /// Events sent after the receiver is dropped are discarded silently and
    /// are not counted.
    pub fn dropped_events(&self) -> usize {
        self.dropped_events
    }

    /// Run until Ctrl-C
    pub async fn run(&mut self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run until `shutdown_rx` fires (or Ctrl-C when `None`)
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(
        &mut self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.emit_event(MonitorEvent::Started {
            domains_count: self.domains.len(),
        });
        info!(
            "Checking {} domain(s) every {:?} via {}",
            self.domains.len(),
            self.interval,
            self.resolver.resolver_name()
        );

        // First tick completes immediately
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("Unable to listen for shutdown signal: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let summary = self.run_cycle().await;
                    debug!(
                        "Cycle complete: {} first, {} changed, {} unchanged",
                        summary.first_observations, summary.changed, summary.unchanged
                    );
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(MonitorEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }
            }
        }

        Ok(())
    }

    /// Resolve every domain once, in order
    pub async fn run_cycle(&mut self) -> CycleSummary {
        let mut summary = CycleSummary::default();

        for index in 0..self.domains.len() {
            match self.check_domain(index).await {
                Observation::FirstObservation => summary.first_observations += 1,
                Observation::Changed => summary.changed += 1,
                Observation::Unchanged => summary.unchanged += 1,
            }
        }

        summary
    }

    /// Resolve one domain, notify if needed and store the result
    async fn check_domain(&mut self, index: usize) -> Observation {
        let (name, query_type) = {
            let domain = &self.domains[index];
            (domain.name().to_string(), domain.query_type())
        };

        let current = resolve(self.resolver.as_ref(), query_type, &name).await;
        let observation = classify(self.domains[index].last_result(), &current);

        match observation {
            Observation::FirstObservation => {
                info!("Monitoring [{}] {}: {}", query_type, name, current);

                self.dispatcher.dispatch(Notification::new(
                    format!("Monitoring [{}] {}", query_type, name),
                    format!("status: {}", current),
                    Priority::Informational,
                ));
                self.emit_event(MonitorEvent::FirstObservation {
                    name,
                    query_type,
                    result: current.clone(),
                });
            }
            Observation::Changed => {
                let previous = self.domains[index].last_result().cloned().unwrap_or_default();
                info!("[{}] {} UPDATED ({})", query_type, name, current);

                self.dispatcher.dispatch(Notification::new(
                    format!("UPDATED [{}] {}", query_type, name),
                    format!("was: {}\nnow: {}", previous, current),
                    Priority::Change,
                ));
                self.emit_event(MonitorEvent::Changed {
                    name,
                    query_type,
                    previous,
                    current: current.clone(),
                });
            }
            Observation::Unchanged => {
                debug!("[{}] {} unchanged", query_type, name);
            }
        }

        self.domains[index].record(current);
        observation
    }

    /// Emit a monitor event
    fn emit_event(&mut self, event: MonitorEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped_events += 1;
                warn!("Event channel full, dropping event");
            }
            // No one is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
