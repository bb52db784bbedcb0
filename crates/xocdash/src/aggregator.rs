//! Full dashboard refresh.

use crate::guard::{check_contract_call_prereqs, ConnectedSession};
use crate::reads::{DashboardReader, ReadKind, ReadOutcome};
use crate::slots::SlotName;
use futures::future::{join, join_all};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use xocdash_error::{DashboardError, Result};

/// Outcome of one read within a refresh
#[derive(Debug, Clone, PartialEq)]
pub struct ReadReport {
    /// Which read
    pub read: ReadKind,
    /// What happened
    pub outcome: Result<ReadOutcome>,
}

impl ReadReport {
    /// Slot the read targets
    pub fn slot(&self) -> SlotName {
        self.read.slot()
    }

    /// True when the read failed
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Everything one refresh did
#[derive(Debug, Clone)]
pub struct RefreshReport {
    entries: Vec<ReadReport>,
    elapsed: Duration,
}

impl RefreshReport {
    /// Per-read entries, one for every [`ReadKind`]
    pub fn entries(&self) -> &[ReadReport] {
        &self.entries
    }

    /// Wall time of the refresh
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Entry for `read`
    pub fn outcome(&self, read: ReadKind) -> Option<&Result<ReadOutcome>> {
        self.entries.iter().find(|e| e.read == read).map(|e| &e.outcome)
    }

    /// Failed reads with their errors
    pub fn failures(&self) -> Vec<(ReadKind, &DashboardError)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|err| (e.read, err)))
            .collect()
    }

    /// Reads that published a value
    pub fn published(&self) -> Vec<ReadKind> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Ok(ReadOutcome::Published)))
            .map(|e| e.read)
            .collect()
    }

    /// True when no read failed
    pub fn is_success(&self) -> bool {
        self.entries.iter().all(|e| !e.is_failure())
    }

    /// Serializable view for output
    pub fn summary(&self) -> Vec<ReadSummary> {
        self.entries
            .iter()
            .map(|e| match &e.outcome {
                Ok(ReadOutcome::Published) => ReadSummary {
                    slot: e.slot(),
                    status: "published",
                    detail: None,
                },
                Ok(ReadOutcome::Skipped { reason }) => ReadSummary {
                    slot: e.slot(),
                    status: "skipped",
                    detail: Some(reason.to_string()),
                },
                Err(err) => ReadSummary {
                    slot: e.slot(),
                    status: "failed",
                    detail: Some(err.to_string()),
                },
            })
            .collect()
    }
}

/// One line of a [`RefreshReport`] summary
#[derive(Debug, Clone, Serialize)]
pub struct ReadSummary {
    /// Target slot
    pub slot: SlotName,
    /// `published`, `skipped` or `failed`
    pub status: &'static str,
    /// Skip reason or error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DashboardReader {
    /// Runs every read once.
    ///
    /// Fails with [`DashboardError::NotConnected`] before any call when the
    /// session is incomplete. Otherwise the balance, deposit, debt and
    /// health ratio reads run in that order while all other reads run
    /// concurrently; every read's outcome lands in the report.
    pub async fn refresh(&self) -> Result<RefreshReport> {
        let session = check_contract_call_prereqs(&self.sessions().snapshot())?;
        let started = Instant::now();

        let unordered = join_all(
            ReadKind::UNORDERED
                .into_iter()
                .map(|read| self.report(&session, read)),
        );
        let ordered = async {
            let mut entries = Vec::with_capacity(ReadKind::ORDERED.len());
            for read in ReadKind::ORDERED {
                entries.push(self.report(&session, read).await);
            }
            entries
        };

        let (mut entries, chain) = join(unordered, ordered).await;
        entries.extend(chain);

        let report = RefreshReport {
            entries,
            elapsed: started.elapsed(),
        };
        let failed = report.failures().len();
        if failed > 0 {
            warn!(failed, total = report.entries.len(), "refresh finished with failures");
        } else {
            info!(elapsed_ms = report.elapsed.as_millis() as u64, "refresh complete");
        }
        Ok(report)
    }

    async fn report(&self, session: &ConnectedSession, read: ReadKind) -> ReadReport {
        ReadReport {
            read,
            outcome: self.fetch_connected(session, read).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reads::SkipReason;

    fn report(entries: Vec<ReadReport>) -> RefreshReport {
        RefreshReport {
            entries,
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_report_accessors() {
        let r = report(vec![
            ReadReport {
                read: ReadKind::XocBalance,
                outcome: Ok(ReadOutcome::Published),
            },
            ReadReport {
                read: ReadKind::HealthRatio,
                outcome: Ok(ReadOutcome::Skipped {
                    reason: SkipReason::NoOpenPosition,
                }),
            },
            ReadReport {
                read: ReadKind::WethToXocRate,
                outcome: Err(DashboardError::revert("redstoneGetLastPrice", "stale price")),
            },
        ]);

        assert!(!r.is_success());
        assert_eq!(r.published(), vec![ReadKind::XocBalance]);
        assert_eq!(r.failures().len(), 1);
        assert_eq!(r.failures()[0].0, ReadKind::WethToXocRate);
        assert!(r.outcome(ReadKind::CollateralRatio).is_none());
    }

    #[test]
    fn test_summary_json() {
        let r = report(vec![ReadReport {
            read: ReadKind::HealthRatio,
            outcome: Ok(ReadOutcome::Skipped {
                reason: SkipReason::NoOpenPosition,
            }),
        }]);

        let json = serde_json::to_value(r.summary()).unwrap();
        assert_eq!(json[0]["slot"], "userHealthRatio");
        assert_eq!(json[0]["status"], "skipped");
        assert_eq!(json[0]["detail"], "no open position");
    }
}
