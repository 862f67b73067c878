//! Test doubles and common utilities for monitor contract tests
//!
//! These doubles stand in for the DNS resolver and the notification
//! services so the loop can be driven deterministically.

#![allow(dead_code)]

use dnsmonitor_core::error::{Error, Result};
use dnsmonitor_core::{Notification, NotificationChannel, QueryType, Resolver};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// One scripted answer: records, or a resolver failure
#[derive(Debug, Clone)]
pub enum Answer {
    Records(Vec<&'static str>),
    Failure,
}

/// A resolver that replays scripted answers per name
///
/// The last answer for a name repeats once the script is exhausted.
#[derive(Clone, Default)]
pub struct ScriptedResolver {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Answer>>>>,
    lookups: Arc<Mutex<Vec<(QueryType, String)>>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the answers for `name`, in order
    pub fn script(self, name: &str, answers: Vec<Answer>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(name.to_string(), answers.into());
        self
    }

    /// Every lookup performed so far, in order
    pub fn lookups(&self) -> Vec<(QueryType, String)> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Resolver for ScriptedResolver {
    async fn lookup(&self, query_type: QueryType, name: &str) -> Result<Vec<String>> {
        self.lookups
            .lock()
            .unwrap()
            .push((query_type, name.to_string()));

        let answer = {
            let mut scripts = self.scripts.lock().unwrap();
            let script = scripts
                .get_mut(name)
                .ok_or_else(|| Error::resolution(format!("NXDOMAIN {}", name)))?;
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };

        match answer {
            Some(Answer::Records(records)) => {
                Ok(records.into_iter().map(str::to_string).collect())
            }
            Some(Answer::Failure) | None => Err(Error::resolution("SERVFAIL")),
        }
    }

    fn resolver_name(&self) -> &str {
        "scripted"
    }
}

/// A resolver that records when each lookup starts
///
/// Each lookup first waits for the next scripted delay, if any.
#[derive(Clone, Default)]
pub struct TimedResolver {
    delays: Arc<Mutex<VecDeque<Duration>>>,
    started: Arc<Mutex<Vec<tokio::time::Instant>>>,
}

impl TimedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stall the first lookups for `delays`, in order
    pub fn with_delays(delays: Vec<Duration>) -> Self {
        let resolver = Self::default();
        *resolver.delays.lock().unwrap() = delays.into();
        resolver
    }

    /// Whole seconds from `origin` to the start of each lookup
    pub fn started_secs_since(&self, origin: tokio::time::Instant) -> Vec<u64> {
        self.started
            .lock()
            .unwrap()
            .iter()
            .map(|at| at.duration_since(origin).as_secs())
            .collect()
    }
}

#[async_trait::async_trait]
impl Resolver for TimedResolver {
    async fn lookup(&self, _query_type: QueryType, _name: &str) -> Result<Vec<String>> {
        self.started.lock().unwrap().push(tokio::time::Instant::now());

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(vec!["192.0.2.1".to_string()])
    }

    fn resolver_name(&self) -> &str {
        "timed"
    }
}

/// A channel that forwards every notification to the test
pub struct RecordingChannel {
    name: &'static str,
    tx: mpsc::UnboundedSender<Notification>,
}

impl RecordingChannel {
    pub fn new(name: &'static str) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { name, tx }, rx)
    }
}

#[async_trait::async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let _ = self.tx.send(notification.clone());
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        self.name
    }
}

/// A channel whose every delivery fails
pub struct FailingChannel {
    attempts: Arc<AtomicUsize>,
}

impl FailingChannel {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of delivery attempts so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Create a FailingChannel that shares the counter with an existing one
    pub fn sharing_counter_with(other: &Self) -> Self {
        Self {
            attempts: Arc::clone(&other.attempts),
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for FailingChannel {
    async fn send(&self, _notification: &Notification) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::notification("failing", "service unavailable"))
    }

    fn channel_name(&self) -> &'static str {
        "failing"
    }
}

/// A channel that takes `delay` before succeeding
pub struct SlowChannel {
    delay: Duration,
}

impl SlowChannel {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for SlowChannel {
    async fn send(&self, _notification: &Notification) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "slow"
    }
}

/// Receive the next notification, or `None` after a short wait
pub async fn next_notification(
    rx: &mut mpsc::UnboundedReceiver<Notification>,
) -> Option<Notification> {
    tokio::time::timeout(Duration::from_millis(500), rx.recv())
        .await
        .ok()
        .flatten()
}

/// Assert that no notification arrives within a short wait
pub async fn assert_no_notification(rx: &mut mpsc::UnboundedReceiver<Notification>) {
    let received = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(
        !matches!(received, Ok(Some(_))),
        "unexpected notification: {:?}",
        received
    );
}
