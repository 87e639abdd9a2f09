//! Usage Gate
//!
//! The pipeline asks permission before analysing and reports what it did
//! afterwards. Billing and persistence live behind this trait; the crate
//! ships an unmetered gate and an in-memory daily quota.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::UsageConfig;
use crate::types::{Result, ScribeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageAction {
    Analysis,
    Export,
    Chat,
}

impl UsageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageAction::Analysis => "analysis",
            UsageAction::Export => "export",
            UsageAction::Chat => "chat",
        }
    }
}

impl std::fmt::Display for UsageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRequest {
    pub action: UsageAction,
    pub project_name: String,
    pub file_count: usize,
}

impl UsageRequest {
    pub fn new(action: UsageAction, project_name: impl Into<String>, file_count: usize) -> Self {
        Self {
            action,
            project_name: project_name.into(),
            file_count,
        }
    }
}

/// Emitted after an action completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub action: UsageAction,
    pub project_name: String,
    pub file_count: usize,
    pub occurred_at: DateTime<Utc>,
}

impl From<&UsageRequest> for UsageEvent {
    fn from(request: &UsageRequest) -> Self {
        Self {
            action: request.action,
            project_name: request.project_name.clone(),
            file_count: request.file_count,
            occurred_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait UsageGate: Send + Sync {
    async fn is_permitted(&self, request: &UsageRequest) -> Result<bool>;

    async fn record_usage(&self, event: &UsageEvent) -> Result<()>;
}

/// Permits everything and records nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct UnmeteredGate;

#[async_trait]
impl UsageGate for UnmeteredGate {
    async fn is_permitted(&self, _request: &UsageRequest) -> Result<bool> {
        Ok(true)
    }

    async fn record_usage(&self, _event: &UsageEvent) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Daily quota
// =============================================================================

#[derive(Debug, Clone)]
struct QuotaState {
    /// Quota period (UTC day)
    date: NaiveDate,
    used: HashMap<UsageAction, u32>,
}

impl QuotaState {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            used: HashMap::new(),
        }
    }

    /// Reset counters when the UTC day changed
    fn roll_over(&mut self, today: NaiveDate) {
        if today != self.date {
            debug!("Usage quota reset for {}", today);
            *self = Self::new(today);
        }
    }
}

/// Per-action daily limits, reset at UTC midnight. State is process-local.
#[derive(Debug)]
pub struct QuotaGate {
    limits: UsageConfig,
    state: Mutex<QuotaState>,
}

impl QuotaGate {
    pub fn new(limits: UsageConfig) -> Self {
        Self {
            limits,
            state: Mutex::new(QuotaState::new(Utc::now().date_naive())),
        }
    }

    fn limit(&self, action: UsageAction) -> Option<u32> {
        match action {
            UsageAction::Analysis => self.limits.analysis_limit,
            UsageAction::Export => self.limits.export_limit,
            UsageAction::Chat => self.limits.chat_limit,
        }
    }

    fn with_state<T>(&self, today: NaiveDate, f: impl FnOnce(&mut QuotaState) -> T) -> Result<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ScribeError::Config("usage quota state is poisoned".to_string()))?;
        state.roll_over(today);
        Ok(f(&mut state))
    }

    fn permitted_on(&self, action: UsageAction, today: NaiveDate) -> Result<bool> {
        let Some(limit) = self.limit(action) else {
            return Ok(true);
        };
        let used = self.with_state(today, |s| s.used.get(&action).copied().unwrap_or(0))?;
        Ok(used < limit)
    }

    fn record_on(&self, action: UsageAction, today: NaiveDate) -> Result<()> {
        self.with_state(today, |s| *s.used.entry(action).or_insert(0) += 1)
    }

    /// Remaining uses today; `None` when unlimited
    pub fn remaining(&self, action: UsageAction) -> Result<Option<u32>> {
        let Some(limit) = self.limit(action) else {
            return Ok(None);
        };
        let used = self.with_state(Utc::now().date_naive(), |s| {
            s.used.get(&action).copied().unwrap_or(0)
        })?;
        Ok(Some(limit.saturating_sub(used)))
    }
}

#[async_trait]
impl UsageGate for QuotaGate {
    async fn is_permitted(&self, request: &UsageRequest) -> Result<bool> {
        self.permitted_on(request.action, Utc::now().date_naive())
    }

    async fn record_usage(&self, event: &UsageEvent) -> Result<()> {
        self.record_on(event.action, event.occurred_at.date_naive())
    }
}

/// Gate for the configured limits
pub fn gate_from_config(config: &UsageConfig) -> Box<dyn UsageGate> {
    if config.is_unmetered() {
        Box::new(UnmeteredGate)
    } else {
        Box::new(QuotaGate::new(config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(analysis: u32) -> UsageConfig {
        UsageConfig {
            analysis_limit: Some(analysis),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unmetered_permits_everything() {
        let gate = UnmeteredGate;
        let request = UsageRequest::new(UsageAction::Analysis, "demo", 3);
        assert!(gate.is_permitted(&request).await.unwrap());
        gate.record_usage(&UsageEvent::from(&request)).await.unwrap();
    }

    #[tokio::test]
    async fn test_quota_denies_after_limit() {
        let gate = QuotaGate::new(limits(2));
        let request = UsageRequest::new(UsageAction::Analysis, "demo", 3);
        for _ in 0..2 {
            assert!(gate.is_permitted(&request).await.unwrap());
            gate.record_usage(&UsageEvent::from(&request)).await.unwrap();
        }
        assert!(!gate.is_permitted(&request).await.unwrap());
        assert_eq!(gate.remaining(UsageAction::Analysis).unwrap(), Some(0));

        // Other actions are unlimited
        let export = UsageRequest::new(UsageAction::Export, "demo", 3);
        assert!(gate.is_permitted(&export).await.unwrap());
        assert_eq!(gate.remaining(UsageAction::Export).unwrap(), None);
    }

    #[test]
    fn test_quota_resets_on_new_day() {
        let gate = QuotaGate::new(limits(1));
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let next = day.succ_opt().unwrap();

        gate.record_on(UsageAction::Analysis, day).unwrap();
        assert!(!gate.permitted_on(UsageAction::Analysis, day).unwrap());
        assert!(gate.permitted_on(UsageAction::Analysis, next).unwrap());
    }

    #[test]
    fn test_gate_from_config() {
        assert!(UsageConfig::default().is_unmetered());
        let _ = gate_from_config(&UsageConfig::default());
        let _ = gate_from_config(&limits(5));
    }
}
