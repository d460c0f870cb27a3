use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::core::bridge::{AgentConnector, StreamBridge};
use crate::core::telephony::{StreamFlow, TelephonyResult, TelerClient};
use crate::utils::server_domain::resolve_server_domain;

/// Why a new WebSocket connection was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionLimitError {
    GlobalLimitReached,
    PerIpLimitReached,
}

/// Counts open media-stream connections, globally and per client IP.
#[derive(Debug)]
pub struct ConnectionTracker {
    total: AtomicUsize,
    per_ip: DashMap<IpAddr, u32>,
    max_total: Option<usize>,
    /// 0 disables the per-IP limit
    max_per_ip: u32,
}

impl ConnectionTracker {
    pub fn new(max_total: Option<usize>, max_per_ip: u32) -> Self {
        Self {
            total: AtomicUsize::new(0),
            per_ip: DashMap::new(),
            max_total,
            max_per_ip,
        }
    }

    pub fn try_acquire(&self, ip: IpAddr) -> Result<(), ConnectionLimitError> {
        let mut count = self.per_ip.entry(ip).or_insert(0);

        let result = if self.max_per_ip > 0 && *count >= self.max_per_ip {
            Err(ConnectionLimitError::PerIpLimitReached)
        } else if let Some(max) = self.max_total {
            self.total
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    (n < max).then_some(n + 1)
                })
                .map(|_| ())
                .map_err(|_| ConnectionLimitError::GlobalLimitReached)
        } else {
            self.total.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        if result.is_ok() {
            *count += 1;
            return result;
        }

        let unused = *count == 0;
        drop(count);
        if unused {
            self.per_ip.remove_if(&ip, |_, n| *n == 0);
        }
        result
    }

    /// Release a slot held by `ip`. Unknown IPs are ignored.
    pub fn release(&self, ip: IpAddr) {
        let emptied = match self.per_ip.get_mut(&ip) {
            Some(mut count) if *count > 0 => {
                *count -= 1;
                *count == 0
            }
            _ => return,
        };
        if emptied {
            self.per_ip.remove_if(&ip, |_, n| *n == 0);
        }

        let _ = self
            .total
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn for_ip(&self, ip: &IpAddr) -> u32 {
        self.per_ip.get(ip).map(|count| *count).unwrap_or(0)
    }
}

/// Connection slot released when dropped.
#[derive(Debug)]
pub struct ConnectionSlot {
    tracker: Arc<ConnectionTracker>,
    ip: IpAddr,
}

impl ConnectionSlot {
    /// Wrap a slot already taken with [`ConnectionTracker::try_acquire`].
    pub fn new(tracker: Arc<ConnectionTracker>, ip: IpAddr) -> Self {
        Self { tracker, ip }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.tracker.release(self.ip);
        debug!(ip = %self.ip, "Released connection slot");
    }
}

/// Shared application state.
pub struct AppState {
    pub config: ServerConfig,
    pub bridge: StreamBridge,
    pub telephony: TelerClient,
    /// Public domain the telephony provider reaches us on
    pub server_domain: String,
    pub connections: Arc<ConnectionTracker>,
}

impl AppState {
    pub async fn new(config: ServerConfig) -> TelephonyResult<Arc<Self>> {
        let bridge = StreamBridge::new(AgentConnector::new(
            config.agent_websocket_url.clone(),
            config.agent_connect_timeout(),
        ));

        let telephony = TelerClient::new(
            config.teler_api_key.clone(),
            config.teler_api_url.clone(),
            config.call_timeout(),
        )?;

        let server_domain = resolve_server_domain(&config).await;
        info!(server_domain = %server_domain, "Using public server domain");

        let connections = Arc::new(ConnectionTracker::new(
            config.max_websocket_connections,
            config.max_connections_per_ip,
        ));

        Ok(Arc::new(Self {
            config,
            bridge,
            telephony,
            server_domain,
            connections,
        }))
    }

    /// Flow descriptor for calls answered by this server.
    pub fn stream_flow(&self) -> StreamFlow {
        StreamFlow::new(
            &self.server_domain,
            self.config.stream_chunk_size,
            self.config.agent_sample_rate.clone(),
            self.config.stream_record,
        )
    }

    pub fn try_acquire_connection(&self, ip: IpAddr) -> Result<(), ConnectionLimitError> {
        self.connections.try_acquire(ip)
    }

    pub fn release_connection(&self, ip: IpAddr) {
        self.connections.release(ip)
    }

    pub fn ws_connection_count(&self) -> usize {
        self.connections.total()
    }

    pub fn ip_connection_count(&self, ip: &IpAddr) -> u32 {
        self.connections.for_ip(ip)
    }
}
