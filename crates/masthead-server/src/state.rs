//! Shared application state.

use crate::audit::{AuditSink, NullSink, TracingSink};
use crate::middleware::RateLimiter;
use masthead_core::config::ResolvedTeam;
use masthead_core::{AuthorizationConfig, Environment, MastheadConfig, Role};
use masthead_token::TokenEngine;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    engine: TokenEngine,
    environment: Environment,
    /// Per secret environment variable, whether it was set at startup.
    environment_info: BTreeMap<String, bool>,
    authorization: AuthorizationConfig,
    limiter: Option<RateLimiter>,
    audit: Arc<dyn AuditSink>,
    stats: GatewayStats,
}

impl AppState {
    /// Build state from configuration, choosing the audit sink it names.
    pub fn new(config: &MastheadConfig, team: ResolvedTeam) -> Self {
        let audit: Arc<dyn AuditSink> = if config.audit.enabled {
            Arc::new(TracingSink)
        } else {
            Arc::new(NullSink)
        };
        Self::with_audit_sink(config, team, audit)
    }

    /// Build state with an explicit audit sink.
    pub fn with_audit_sink(
        config: &MastheadConfig,
        team: ResolvedTeam,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let environment_info = team.environment_info();
        Self::with_engine(config, TokenEngine::sha256(team.registry), environment_info, audit)
    }

    /// Build state around an existing engine.
    ///
    /// `environment_info` maps each secret variable to whether it was set.
    pub fn with_engine(
        config: &MastheadConfig,
        engine: TokenEngine,
        environment_info: BTreeMap<String, bool>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let limiter = config
            .rate_limit
            .enabled
            .then(|| RateLimiter::new(&config.rate_limit));

        Self {
            inner: Arc::new(AppStateInner {
                engine,
                environment: config.environment,
                environment_info,
                authorization: config.authorization.clone(),
                limiter,
                audit,
                stats: GatewayStats::default(),
            }),
        }
    }

    pub fn engine(&self) -> &TokenEngine {
        &self.inner.engine
    }

    pub fn environment(&self) -> Environment {
        self.inner.environment
    }

    pub fn environment_info(&self) -> &BTreeMap<String, bool> {
        &self.inner.environment_info
    }

    pub fn authorization(&self) -> &AuthorizationConfig {
        &self.inner.authorization
    }

    pub fn limiter(&self) -> Option<&RateLimiter> {
        self.inner.limiter.as_ref()
    }

    pub fn audit(&self) -> &dyn AuditSink {
        self.inner.audit.as_ref()
    }

    pub fn stats(&self) -> &GatewayStats {
        &self.inner.stats
    }
}

/// Request counters since process start.
#[derive(Default)]
pub struct GatewayStats {
    admitted: [AtomicU64; 4],
    rejected: AtomicU64,
    denied: AtomicU64,
    rate_limited: AtomicU64,
}

impl GatewayStats {
    pub fn record_admitted(&self, role: Role) {
        self.admitted[role_index(role)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_denied(&self) {
        self.denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, tracked_clients: usize) -> StatsSnapshot {
        StatsSnapshot {
            admitted: Role::ALL
                .into_iter()
                .map(|role| (role, self.admitted[role_index(role)].load(Ordering::Relaxed)))
                .collect(),
            rejected_authentications: self.rejected.load(Ordering::Relaxed),
            denied_authorizations: self.denied.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            tracked_clients,
        }
    }
}

fn role_index(role: Role) -> usize {
    match role {
        Role::Developer => 0,
        Role::Designer => 1,
        Role::Marketing => 2,
        Role::Pm => 3,
    }
}

/// Point-in-time copy of [`GatewayStats`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Admitted requests per role.
    pub admitted: BTreeMap<Role, u64>,
    pub rejected_authentications: u64,
    pub denied_authorizations: u64,
    pub rate_limited: u64,
    pub tracked_clients: usize,
}
