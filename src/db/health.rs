//! Connection health tracking.

use std::sync::atomic::{AtomicU8, AtomicU32, AtomicU64, Ordering};

/// Lifecycle state of the connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// No pool has been established yet
    Uninitialized = 0,
    /// Pool is live and the last health check passed
    Connected = 1,
    /// Last health check failed, reconnecting on each interval
    Degraded = 2,
    /// Intentionally shut down; terminal
    TornDown = 3,
}

impl From<u8> for ConnectionState {
    fn from(value: u8) -> Self {
        match value {
            0 => ConnectionState::Uninitialized,
            1 => ConnectionState::Connected,
            2 => ConnectionState::Degraded,
            _ => ConnectionState::TornDown,
        }
    }
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Connected => "connected",
            ConnectionState::Degraded => "degraded",
            ConnectionState::TornDown => "torn_down",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free health tracker shared by the health loop and readers.
///
/// Once `TornDown` is stored no other transition is accepted.
pub struct ConnectionHealth {
    state: AtomicU8,
    checks: AtomicU64,
    consecutive_failures: AtomicU32,
    reconnect_attempts: AtomicU64,
    reconnects: AtomicU64,
}

impl ConnectionHealth {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Uninitialized as u8),
            checks: AtomicU64::new(0),
            consecutive_failures: AtomicU32::new(0),
            reconnect_attempts: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
        }
    }

    /// Get current state
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from(self.state.load(Ordering::Acquire))
    }

    /// Mark the pool as live. Returns false if already torn down.
    pub fn set_connected(&self) -> bool {
        let was_degraded = self.state() == ConnectionState::Degraded;
        if !self.transition(ConnectionState::Connected) {
            return false;
        }
        if was_degraded {
            self.reconnects.fetch_add(1, Ordering::AcqRel);
        }
        self.consecutive_failures.store(0, Ordering::Release);
        true
    }

    /// Record a failed health check. Returns the consecutive failure count.
    pub fn set_degraded(&self) -> u32 {
        self.transition(ConnectionState::Degraded);
        self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Pool released without teardown; eligible for a fresh connect.
    pub fn set_disconnected(&self) {
        self.transition(ConnectionState::Uninitialized);
    }

    /// Enter the terminal state.
    pub fn set_torn_down(&self) {
        self.state
            .store(ConnectionState::TornDown as u8, Ordering::Release);
    }

    pub fn record_check(&self) {
        self.checks.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_reconnect_attempt(&self) {
        self.reconnect_attempts.fetch_add(1, Ordering::AcqRel);
    }

    /// Get statistics snapshot
    pub fn stats(&self) -> ConnectionStats {
        ConnectionStats {
            state: self.state(),
            checks: self.checks.load(Ordering::Acquire),
            consecutive_failures: self.consecutive_failures.load(Ordering::Acquire),
            reconnect_attempts: self.reconnect_attempts.load(Ordering::Acquire),
            reconnects: self.reconnects.load(Ordering::Acquire),
        }
    }

    fn transition(&self, next: ConnectionState) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != ConnectionState::TornDown as u8).then_some(next as u8)
            })
            .is_ok()
    }
}

impl Default for ConnectionHealth {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection health statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    pub state: ConnectionState,
    /// Health checks run since startup
    pub checks: u64,
    pub consecutive_failures: u32,
    pub reconnect_attempts: u64,
    /// Recoveries from `Degraded` back to `Connected`
    pub reconnects: u64,
}
