//! The guarded runner: owns the run lifecycle, enforces the kill switch,
//! resolves limits, tracks the wall-clock budget, invokes the aggregator,
//! hands results to the sink and finalizes run statistics exactly once.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};
use uuid::Uuid;

use prospect_common::{
    ChannelKind, Config, DiscoveryRun, IntentOverrides, ResolvedIntent, RunMode, RunStats,
    RunStatus,
};
use prospect_fetch::ContentFetcher;

use crate::aggregator::{AggregationOutcome, AggregationRequest, Aggregator};
use crate::budget::TimeBudget;
use crate::cancel::CancelToken;
use crate::intents::{self, apply_intent};
use crate::run_log::{EventKind, RunLog};
use crate::scoring::AnalysisConfig;
use crate::sink::{CandidateSink, DryRunSink, PersistOutcome};
use crate::traits::WebSearcher;

/// Result cap handed to channels for each individual search query.
const DEFAULT_RESULTS_PER_QUERY: usize = 10;

#[derive(Clone)]
pub struct RunRequest {
    pub dry_run: bool,
    pub mode: RunMode,
    pub triggered_by: String,
    /// Catalog intent to run; the default intent when absent.
    pub intent_id: Option<String>,
    pub overrides: IntentOverrides,
    /// Pre-built analysis config; derived from the resolved intent when
    /// absent and scraping is on.
    pub analysis: Option<AnalysisConfig>,
    /// Fetch and score each search result. Off means the lightweight
    /// no-scrape conversion.
    pub scrape: bool,
    pub cancel: CancelToken,
}

impl RunRequest {
    pub fn manual(triggered_by: impl Into<String>) -> Self {
        Self {
            dry_run: false,
            mode: RunMode::Manual,
            triggered_by: triggered_by.into(),
            intent_id: None,
            overrides: IntentOverrides::default(),
            analysis: None,
            scrape: true,
            cancel: CancelToken::new(),
        }
    }
}

/// What the invocation surface gets back.
#[derive(Debug)]
pub struct RunReceipt {
    pub success: bool,
    pub run_id: Uuid,
    pub status: RunStatus,
    pub dry_run: bool,
    pub stats: RunStats,
}

pub struct DiscoveryRunner {
    config: Config,
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn ContentFetcher>,
    sink: Arc<dyn CandidateSink>,
}

impl DiscoveryRunner {
    pub fn new(
        config: Config,
        searcher: Arc<dyn WebSearcher>,
        fetcher: Arc<dyn ContentFetcher>,
        sink: Arc<dyn CandidateSink>,
    ) -> Self {
        Self {
            config,
            searcher,
            fetcher,
            sink,
        }
    }

    /// Execute one discovery run. The run record is created before any
    /// work begins, so every invocation leaves an audit trail even when
    /// it is refused or fails immediately.
    pub async fn run(&self, request: RunRequest) -> RunReceipt {
        let mut run = DiscoveryRun::new(request.dry_run, request.mode, request.triggered_by.clone());
        let mut log = RunLog::new(run.id);
        info!(run_id = %run.id, mode = %run.mode, dry_run = run.dry_run, "Discovery run created");

        if !self.config.discovery_enabled {
            warn!(run_id = %run.id, "Kill switch engaged, refusing run");
            return self.finalize_failed(
                run,
                log,
                "Discovery is disabled by configuration".to_string(),
                RunStats::default(),
            );
        }

        let intent_id = request
            .intent_id
            .clone()
            .unwrap_or_else(|| intents::DEFAULT_INTENT_ID.to_string());
        let intent = match intents::intent(&intent_id) {
            Some(intent) if intent.active => intent,
            Some(_) => {
                return self.finalize_failed(
                    run,
                    log,
                    format!("Intent is not active: {intent_id}"),
                    RunStats::default(),
                );
            }
            None => {
                return self.finalize_failed(
                    run,
                    log,
                    format!("Unknown intent: {intent_id}"),
                    RunStats::default(),
                );
            }
        };

        let base_limits = match run.mode {
            RunMode::Daily => self.config.daily_limits,
            RunMode::Manual | RunMode::Test => self.config.manual_limits,
        };
        let mut resolved = apply_intent(&intent, &request.overrides, &base_limits);
        if resolved.channels.is_empty() {
            resolved.channels = self.config.default_channels.clone();
        }
        run.intent_id = Some(resolved.intent_id.clone());
        run.intent_name = Some(resolved.intent_name.clone());
        log.log(EventKind::RunCreated {
            mode: run.mode.to_string(),
            dry_run: run.dry_run,
            intent: resolved.intent_id.clone(),
        });

        let mut stats = RunStats {
            limits: Some(resolved.limits),
            resolved_intent: Some(resolved.clone()),
            ..Default::default()
        };

        let budget = TimeBudget::new(Duration::from_secs(resolved.limits.time_budget_secs));
        log.log(EventKind::BudgetCheck {
            remaining_ms: budget.remaining().as_millis() as u64,
            expired: budget.is_expired(),
        });

        if budget.is_expired() {
            info!(run_id = %run.id, "Time budget already exhausted, nothing to do");
            stats.stopped_early = true;
            stats.stop_reason = Some("Time budget exhausted before discovery started".to_string());
            stats.duration_ms = budget.elapsed().as_millis() as u64;
            return self.finalize(run, log, RunStatus::Completed, stats);
        }

        if let Err(e) = run.transition(RunStatus::Running) {
            return self.finalize_failed(run, log, e.to_string(), stats);
        }

        match self.discover_and_persist(&request, &resolved).await {
            Err(e) => {
                error!(run_id = %run.id, error = %e, "Discovery run failed");
                stats.error = Some(e.to_string());
                stats.duration_ms = budget.elapsed().as_millis() as u64;
                self.finalize(run, log, RunStatus::Failed, stats)
            }
            Ok((aggregation, persist)) => {
                for channel in &aggregation.channels {
                    log.log(EventKind::ChannelCompleted {
                        channel: channel.channel.to_string(),
                        results: channel.results,
                        error: channel.error.clone(),
                    });
                }
                log.log(EventKind::DedupeCompleted {
                    before: aggregation.total_before_dedupe,
                    after: aggregation.total_after_dedupe,
                });
                log.log(EventKind::PersistCompleted {
                    created: persist.created_total(),
                    skipped: persist.skipped_total(),
                    errors: persist.errors.len() as u32,
                });

                stats.channels = aggregation.channels;
                stats.total_before_dedupe = aggregation.total_before_dedupe;
                stats.total_after_dedupe = aggregation.total_after_dedupe;
                stats.companies_created = persist.companies_created;
                stats.companies_skipped = persist.companies_skipped;
                stats.contacts_created = persist.contacts_created;
                stats.contacts_skipped = persist.contacts_skipped;
                stats.leads_created = persist.leads_created;
                stats.leads_skipped = persist.leads_skipped;
                stats.persist_errors = persist
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", e.result_type, e.error))
                    .collect();
                stats.duration_ms = budget.elapsed().as_millis() as u64;

                // Caps are observed after the sink has already written,
                // not enforced mid-stream: the sink batch is atomic from
                // the runner's point of view.
                if persist.companies_created >= resolved.limits.max_companies {
                    stats.stopped_early = true;
                    stats.stop_reason = Some("Company limit reached".to_string());
                } else if persist.leads_created >= resolved.limits.max_leads {
                    stats.stopped_early = true;
                    stats.stop_reason = Some("Lead limit reached".to_string());
                } else if budget.is_expired() {
                    stats.stopped_early = true;
                    stats.stop_reason = Some("Time budget exceeded during discovery".to_string());
                }

                let status = if request.cancel.is_cancelled() {
                    RunStatus::Cancelled
                } else if stats
                    .channels
                    .iter()
                    .any(|c| c.channel == ChannelKind::SearchEngine && c.error.is_some())
                {
                    // "Could not run at all" on the primary source is a
                    // first-class signal, distinct from plain completion.
                    RunStatus::CompletedWithErrors
                } else {
                    RunStatus::Completed
                };
                self.finalize(run, log, status, stats)
            }
        }
    }

    async fn discover_and_persist(
        &self,
        request: &RunRequest,
        resolved: &ResolvedIntent,
    ) -> Result<(AggregationOutcome, PersistOutcome)> {
        let mut queries = resolved.queries.clone();
        queries.truncate(resolved.limits.max_queries as usize);

        let analysis = if request.scrape {
            Some(
                request
                    .analysis
                    .clone()
                    .unwrap_or_else(|| AnalysisConfig::from_intent(resolved)),
            )
        } else {
            None
        };

        let aggregator = Aggregator::new(Arc::clone(&self.searcher), Arc::clone(&self.fetcher));
        let aggregation = aggregator
            .execute(&AggregationRequest {
                channels: resolved.channels.clone(),
                queries,
                max_results_per_query: DEFAULT_RESULTS_PER_QUERY,
                analysis,
                cancel: request.cancel.clone(),
            })
            .await;

        if !aggregation.success {
            anyhow::bail!(
                "Aggregation failed: {}",
                aggregation.error.as_deref().unwrap_or("unknown error")
            );
        }

        let persist = if request.dry_run {
            DryRunSink.persist(&aggregation.results).await?
        } else {
            self.sink.persist(&aggregation.results).await?
        };

        Ok((aggregation, persist))
    }

    fn finalize(
        &self,
        mut run: DiscoveryRun,
        mut log: RunLog,
        status: RunStatus,
        stats: RunStats,
    ) -> RunReceipt {
        run.stats = stats;
        if let Err(e) = run.transition(status) {
            error!(run_id = %run.id, error = %e, "Run transition rejected");
        }
        log.log(EventKind::RunFinalized {
            status: run.status.to_string(),
            stopped_early: run.stats.stopped_early,
        });
        if let Err(e) = log.save(&self.config.data_dir, &run) {
            error!(run_id = %run.id, error = %e, "Failed to save run log");
        }
        info!(run_id = %run.id, status = %run.status, "Discovery run finalized");

        RunReceipt {
            success: run.status != RunStatus::Failed,
            run_id: run.id,
            status: run.status,
            dry_run: run.dry_run,
            stats: run.stats,
        }
    }

    fn finalize_failed(
        &self,
        run: DiscoveryRun,
        log: RunLog,
        message: String,
        mut stats: RunStats,
    ) -> RunReceipt {
        stats.error = Some(message);
        self.finalize(run, log, RunStatus::Failed, stats)
    }
}
