use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProspectError;
use crate::intent::{ResolvedIntent, ResolvedLimits};
use crate::types::ChannelKind;

// --- Mode & status ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Daily,
    Manual,
    Test,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Daily => write!(f, "daily"),
            RunMode::Manual => write!(f, "manual"),
            RunMode::Test => write!(f, "test"),
        }
    }
}

impl RunMode {
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "daily" => RunMode::Daily,
            "test" => RunMode::Test,
            _ => RunMode::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed
                | RunStatus::CompletedWithErrors
                | RunStatus::Failed
                | RunStatus::Cancelled
        )
    }

    /// Status moves forward only: pending -> running -> terminal.
    pub fn can_transition_to(&self, to: RunStatus) -> bool {
        match self {
            RunStatus::Pending => to == RunStatus::Running || to.is_terminal(),
            RunStatus::Running => to.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Pending => write!(f, "pending"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::CompletedWithErrors => write!(f, "completed_with_errors"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// --- Statistics ---

/// Result record for one channel's execution within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelOutcomeStat {
    pub channel: ChannelKind,
    pub results: u32,
    pub error: Option<String>,
}

/// Stats from a discovery run. Owned and mutated only by the runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub channels: Vec<ChannelOutcomeStat>,
    pub total_before_dedupe: u32,
    pub total_after_dedupe: u32,
    pub companies_created: u32,
    pub companies_skipped: u32,
    pub contacts_created: u32,
    pub contacts_skipped: u32,
    pub leads_created: u32,
    pub leads_skipped: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub persist_errors: Vec<String>,
    pub duration_ms: u64,
    pub stopped_early: bool,
    pub stop_reason: Option<String>,
    pub limits: Option<ResolvedLimits>,
    /// Snapshot of the configuration the run actually used.
    pub resolved_intent: Option<ResolvedIntent>,
    /// Fatal error message, set only on the failed path.
    pub error: Option<String>,
}

impl RunStats {
    pub fn channel_errors(&self) -> impl Iterator<Item = (&ChannelKind, &str)> {
        self.channels
            .iter()
            .filter_map(|c| c.error.as_deref().map(|e| (&c.channel, e)))
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Discovery Run Complete ===")?;
        for c in &self.channels {
            match &c.error {
                Some(e) => writeln!(f, "  {}: {} results (error: {e})", c.channel, c.results)?,
                None => writeln!(f, "  {}: {} results", c.channel, c.results)?,
            }
        }
        writeln!(f, "Before dedupe:      {}", self.total_before_dedupe)?;
        writeln!(f, "After dedupe:       {}", self.total_after_dedupe)?;
        writeln!(
            f,
            "Companies:          {} created, {} skipped",
            self.companies_created, self.companies_skipped
        )?;
        writeln!(
            f,
            "Contacts:           {} created, {} skipped",
            self.contacts_created, self.contacts_skipped
        )?;
        writeln!(
            f,
            "Leads:              {} created, {} skipped",
            self.leads_created, self.leads_skipped
        )?;
        writeln!(f, "Duration:           {}ms", self.duration_ms)?;
        if self.stopped_early {
            writeln!(
                f,
                "Stopped early:      {}",
                self.stop_reason.as_deref().unwrap_or("unknown")
            )?;
        }
        if let Some(e) = &self.error {
            writeln!(f, "Error:              {e}")?;
        }
        Ok(())
    }
}

// --- Run record ---

/// The unit of execution and audit. Created once, status transitions
/// monotonically, finalized exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryRun {
    pub id: Uuid,
    pub status: RunStatus,
    pub dry_run: bool,
    pub mode: RunMode,
    pub triggered_by: String,
    pub intent_id: Option<String>,
    pub intent_name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub stats: RunStats,
}

impl DiscoveryRun {
    pub fn new(dry_run: bool, mode: RunMode, triggered_by: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: RunStatus::Pending,
            dry_run,
            mode,
            triggered_by: triggered_by.into(),
            intent_id: None,
            intent_name: None,
            started_at: Utc::now(),
            finished_at: None,
            stats: RunStats::default(),
        }
    }

    /// Transition to `to`, enforcing forward-only movement. Terminal
    /// transitions stamp `finished_at`.
    pub fn transition(&mut self, to: RunStatus) -> Result<(), ProspectError> {
        if !self.status.can_transition_to(to) {
            return Err(ProspectError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        if to.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        Ok(())
    }
}
