//! Persistence sink contract plus the two in-tree implementations: the
//! dry-run no-op and a JSONL file sink for CLI runs. The durable store
//! behind the real product is an external collaborator; anything
//! implementing [`CandidateSink`] must be idempotent and process batches
//! company -> contact -> lead so cross-references resolve within one
//! batch.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use prospect_common::{normalize_key, Candidate};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistFailure {
    pub result_type: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistOutcome {
    pub companies_created: u32,
    pub companies_skipped: u32,
    pub contacts_created: u32,
    pub contacts_skipped: u32,
    pub leads_created: u32,
    pub leads_skipped: u32,
    pub errors: Vec<PersistFailure>,
    pub success: bool,
}

impl PersistOutcome {
    pub fn created_total(&self) -> u32 {
        self.companies_created + self.contacts_created + self.leads_created
    }

    pub fn skipped_total(&self) -> u32 {
        self.companies_skipped + self.contacts_skipped + self.leads_skipped
    }
}

/// Turns candidate records into durable entities. Re-submitting an
/// already-persisted candidate must skip, not duplicate.
#[async_trait]
pub trait CandidateSink: Send + Sync {
    async fn persist(&self, candidates: &[Candidate]) -> Result<PersistOutcome>;
}

/// Exact-match identity for a candidate: website / email / profile URL /
/// name+company, in that order of preference. `None` means the record
/// has no usable identity (a lead with nothing resolvable).
pub fn candidate_identity(candidate: &Candidate) -> Option<String> {
    match candidate {
        Candidate::Company(c) => c
            .website
            .as_deref()
            .filter(|w| !w.trim().is_empty())
            .map(|w| format!("company:{}", normalize_key(w)))
            .or_else(|| Some(format!("company:{}", normalize_key(&c.name)))),
        Candidate::Contact(c) => c
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .map(|e| format!("contact:{}", normalize_key(e)))
            .or_else(|| {
                c.profile_url
                    .as_deref()
                    .filter(|u| !u.trim().is_empty())
                    .map(|u| format!("contact:{}", normalize_key(u)))
            })
            .or_else(|| {
                c.display_name().map(|name| {
                    format!(
                        "contact:{}:{}",
                        normalize_key(&name),
                        normalize_key(c.company_name.as_deref().unwrap_or(""))
                    )
                })
            }),
        Candidate::Lead(l) => {
            let email = l
                .contact
                .as_ref()
                .and_then(|c| c.email.as_deref())
                .filter(|e| !e.trim().is_empty());
            let site = l
                .company
                .as_ref()
                .and_then(|c| c.website.as_deref())
                .filter(|w| !w.trim().is_empty());
            match (email, site) {
                (Some(e), _) => Some(format!("lead:{}", normalize_key(e))),
                (None, Some(s)) => Some(format!("lead:{}", normalize_key(s))),
                (None, None) => None,
            }
        }
    }
}

/// Sort a batch into persistence order: companies, then contacts, then
/// leads, preserving relative order within each group.
pub fn in_persist_order(candidates: &[Candidate]) -> Vec<&Candidate> {
    let mut ordered: Vec<&Candidate> = Vec::with_capacity(candidates.len());
    ordered.extend(candidates.iter().filter(|c| matches!(c, Candidate::Company(_))));
    ordered.extend(candidates.iter().filter(|c| matches!(c, Candidate::Contact(_))));
    ordered.extend(candidates.iter().filter(|c| matches!(c, Candidate::Lead(_))));
    ordered
}

/// Dry-run substitute: reports every candidate as skipped and performs
/// zero durable writes. The no-side-effects guarantee of dry-run mode
/// rests entirely on this type.
pub struct DryRunSink;

#[async_trait]
impl CandidateSink for DryRunSink {
    async fn persist(&self, candidates: &[Candidate]) -> Result<PersistOutcome> {
        let mut outcome = PersistOutcome {
            success: true,
            ..Default::default()
        };
        for candidate in candidates {
            match candidate {
                Candidate::Company(_) => outcome.companies_skipped += 1,
                Candidate::Contact(_) => outcome.contacts_skipped += 1,
                Candidate::Lead(_) => outcome.leads_skipped += 1,
            }
        }
        info!(skipped = outcome.skipped_total(), "Dry run: all candidates skipped");
        Ok(outcome)
    }
}

/// Append-only JSONL sink for CLI runs. Identity keys already present in
/// the file (or written earlier in this process) are skipped.
pub struct JsonFileSink {
    path: PathBuf,
    seen: Mutex<HashSet<String>>,
}

impl JsonFileSink {
    /// Opens (or prepares to create) `prospects.jsonl` under `dir`,
    /// loading identities from any existing file so idempotency holds
    /// across process restarts.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join("prospects.jsonl");

        let mut seen = HashSet::new();
        if path.exists() {
            let existing = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            for line in existing.lines() {
                if let Ok(candidate) = serde_json::from_str::<Candidate>(line) {
                    if let Some(identity) = candidate_identity(&candidate) {
                        seen.insert(identity);
                    }
                }
            }
        }

        Ok(Self {
            path,
            seen: Mutex::new(seen),
        })
    }
}

#[async_trait]
impl CandidateSink for JsonFileSink {
    async fn persist(&self, candidates: &[Candidate]) -> Result<PersistOutcome> {
        let mut outcome = PersistOutcome {
            success: true,
            ..Default::default()
        };

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut seen = self.seen.lock().expect("sink mutex poisoned");

        for candidate in in_persist_order(candidates) {
            let identity = match candidate_identity(candidate) {
                Some(identity) => identity,
                None => {
                    outcome.errors.push(PersistFailure {
                        result_type: candidate.type_label().to_string(),
                        error: "No resolvable identity (missing email and website)".to_string(),
                    });
                    continue;
                }
            };

            if !seen.insert(identity) {
                match candidate {
                    Candidate::Company(_) => outcome.companies_skipped += 1,
                    Candidate::Contact(_) => outcome.contacts_skipped += 1,
                    Candidate::Lead(_) => outcome.leads_skipped += 1,
                }
                continue;
            }

            let line = serde_json::to_string(candidate)?;
            writeln!(file, "{line}").context("Failed to append candidate")?;
            match candidate {
                Candidate::Company(_) => outcome.companies_created += 1,
                Candidate::Contact(_) => outcome.contacts_created += 1,
                Candidate::Lead(_) => outcome.leads_created += 1,
            }
        }

        info!(
            created = outcome.created_total(),
            skipped = outcome.skipped_total(),
            errors = outcome.errors.len(),
            path = %self.path.display(),
            "Persisted candidate batch"
        );
        Ok(outcome)
    }
}
