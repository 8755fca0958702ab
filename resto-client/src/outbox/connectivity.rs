//! Online/offline signal
//!
//! [`Connectivity`] is fed by the host environment. Every offline -> online
//! transition bumps `reconnects`, so a subscriber that wakes up late still
//! sees that a reconnect happened even if the flag flipped back and forth
//! in between.
//!
//! [`ConnectivityProbe`] is one such feeder for hosts without a native
//! online event: it checks TCP reachability of the API host and publishes
//! changes. It never flushes anything itself.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectivityState {
    pub online: bool,
    /// Number of offline -> online transitions observed so far
    pub reconnects: u64,
}

#[derive(Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<ConnectivityState>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(ConnectivityState {
            online,
            reconnects: 0,
        });
        Self { tx: Arc::new(tx) }
    }

    /// Publish the current state; returns `true` if it changed
    pub fn set_online(&self, online: bool) -> bool {
        self.tx.send_if_modified(|state| {
            if state.online == online {
                return false;
            }
            state.online = online;
            if online {
                state.reconnects += 1;
            }
            true
        })
    }

    pub fn is_online(&self) -> bool {
        self.tx.borrow().online
    }

    pub fn state(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }
}

/// Periodic TCP reachability check of the API host
pub struct ConnectivityProbe {
    target: String,
    interval: Duration,
    timeout: Duration,
    connectivity: Connectivity,
    shutdown: CancellationToken,
}

impl ConnectivityProbe {
    /// Probe the host and port of `base_url`
    pub fn for_base_url(
        base_url: &str,
        interval: Duration,
        connectivity: Connectivity,
        shutdown: CancellationToken,
    ) -> ClientResult<Self> {
        let url = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("Invalid API base URL {base_url}: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| ClientError::Config(format!("API base URL has no host: {base_url}")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| ClientError::Config(format!("API base URL has no port: {base_url}")))?;

        Ok(Self {
            target: format!("{host}:{port}"),
            interval,
            timeout: interval.min(Duration::from_secs(3)),
            connectivity,
            shutdown,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    async fn check(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(&self.target)).await,
            Ok(Ok(_))
        )
    }

    pub async fn run(self) {
        tracing::info!(target_addr = %self.target, "ConnectivityProbe started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let online = self.check().await;
                    if self.connectivity.set_online(online) {
                        tracing::info!(online, "Connectivity changed");
                    }
                }
            }
        }

        tracing::info!("ConnectivityProbe stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnects_counted_on_transition_only() {
        let connectivity = Connectivity::new(false);
        assert!(!connectivity.set_online(false));
        assert!(connectivity.set_online(true));
        assert!(!connectivity.set_online(true));
        assert!(connectivity.set_online(false));
        assert!(connectivity.set_online(true));

        let state = connectivity.state();
        assert!(state.online);
        assert_eq!(state.reconnects, 2);
    }

    #[test]
    fn test_probe_target_from_url() {
        let connectivity = Connectivity::new(false);
        let probe = ConnectivityProbe::for_base_url(
            "http://localhost:1337/",
            Duration::from_secs(5),
            connectivity.clone(),
            CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(probe.target(), "localhost:1337");

        let probe = ConnectivityProbe::for_base_url(
            "https://reviews.example.com/api/",
            Duration::from_secs(5),
            connectivity.clone(),
            CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(probe.target(), "reviews.example.com:443");

        assert!(
            ConnectivityProbe::for_base_url(
                "not a url",
                Duration::from_secs(5),
                connectivity,
                CancellationToken::new()
            )
            .is_err()
        );
    }

    #[tokio::test]
    async fn test_probe_detects_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let connectivity = Connectivity::new(false);
        let shutdown = CancellationToken::new();
        let probe = ConnectivityProbe::for_base_url(
            &format!("http://{addr}/"),
            Duration::from_millis(20),
            connectivity.clone(),
            shutdown.clone(),
        )
        .unwrap();

        let mut rx = connectivity.subscribe();
        let handle = tokio::spawn(probe.run());

        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| s.online))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(connectivity.state().reconnects, 1);

        drop(listener);
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| !s.online))
            .await
            .unwrap()
            .unwrap();

        shutdown.cancel();
        handle.await.unwrap();
    }
}
