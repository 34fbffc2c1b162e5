//! Optional external enrichment of tool reports.
//!
//! The session never depends on enrichment succeeding: every failure path
//! collapses to the baseline stub report marked as simulated, and merging is
//! a pure function producing a new report value.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::tools::{ToolId, ToolReport};

/// Where the data in a finding report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataProvenance {
    Live,
    Cached,
    Simulated,
}

impl DataProvenance {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Cached => "cached",
            Self::Simulated => "simulated",
        }
    }
}

impl fmt::Display for DataProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an enrichment provider. Always recovered locally.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("enrichment provider unavailable: {0}")]
    Unavailable(String),
    #[error("enrichment request failed: {0}")]
    Request(String),
    #[error("enrichment response malformed: {0}")]
    Malformed(String),
}

/// Additional findings supplied by an enrichment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedData {
    /// Findings prepended before the baseline output (e.g. a live-data
    /// banner).
    #[serde(default)]
    pub lead_findings: Vec<String>,
    /// Findings appended after the baseline output.
    #[serde(default)]
    pub extra_findings: Vec<String>,
    /// Free-form provenance note surfaced at the end of the report.
    #[serde(default)]
    pub note: Option<String>,
    pub provenance: DataProvenance,
}

/// Source of enrichment data for tool reports. Implementations may fetch
/// live data, serve a cache, or fail; the session treats all three the same.
pub trait ToolEnrichment {
    /// Produce enrichment data for a baseline report.
    ///
    /// # Errors
    ///
    /// Returns an error when no enrichment is available; callers fall back
    /// to the baseline report.
    fn enhance(
        &self,
        tool: ToolId,
        baseline: &ToolReport,
        target: &str,
    ) -> Result<EnrichedData, EnrichmentError>;
}

/// Merge enrichment data into a baseline report, returning a new report.
/// The baseline is left untouched and its finding order is preserved.
#[must_use]
pub fn merge_enrichment(baseline: &ToolReport, data: &EnrichedData) -> ToolReport {
    let mut findings =
        Vec::with_capacity(data.lead_findings.len() + baseline.findings.len() + data.extra_findings.len() + 1);
    findings.extend(data.lead_findings.iter().cloned());
    findings.extend(baseline.findings.iter().cloned());
    findings.extend(data.extra_findings.iter().cloned());
    if let Some(note) = &data.note {
        findings.push(format!("Note: {note}"));
    }
    ToolReport {
        tool: baseline.tool,
        tier: baseline.tier,
        findings,
        simulated: matches!(data.provenance, DataProvenance::Simulated),
    }
}

/// Apply a provider to a baseline report, swallowing every failure.
/// A failed enhancement returns the baseline unchanged, marked simulated.
#[must_use]
pub fn enrich_or_baseline(
    provider: &dyn ToolEnrichment,
    tool: ToolId,
    baseline: ToolReport,
    target: &str,
) -> (ToolReport, DataProvenance) {
    match provider.enhance(tool, &baseline, target) {
        Ok(data) => {
            let provenance = data.provenance;
            (merge_enrichment(&baseline, &data), provenance)
        }
        Err(_) => (baseline, DataProvenance::Simulated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::RiskTier;

    struct FailingProvider;

    impl ToolEnrichment for FailingProvider {
        fn enhance(
            &self,
            _tool: ToolId,
            _baseline: &ToolReport,
            _target: &str,
        ) -> Result<EnrichedData, EnrichmentError> {
            Err(EnrichmentError::Request("connection refused".into()))
        }
    }

    struct LiveProvider;

    impl ToolEnrichment for LiveProvider {
        fn enhance(
            &self,
            _tool: ToolId,
            _baseline: &ToolReport,
            _target: &str,
        ) -> Result<EnrichedData, EnrichmentError> {
            Ok(EnrichedData {
                lead_findings: vec!["Live blockchain data:".into()],
                extra_findings: vec!["Balance: 1.2 ETH".into()],
                note: Some("data from block explorer".into()),
                provenance: DataProvenance::Live,
            })
        }
    }

    fn baseline() -> ToolReport {
        ToolReport {
            tool: ToolId::AddressLookup,
            tier: RiskTier::Info,
            findings: vec!["Address: 0x12...78".into()],
            simulated: true,
        }
    }

    #[test]
    fn merge_preserves_baseline_order_and_produces_new_value() {
        let base = baseline();
        let data = EnrichedData {
            lead_findings: vec!["lead".into()],
            extra_findings: vec!["extra".into()],
            note: Some("cached copy".into()),
            provenance: DataProvenance::Cached,
        };
        let merged = merge_enrichment(&base, &data);

        assert_eq!(
            merged.findings,
            vec![
                "lead".to_string(),
                "Address: 0x12...78".to_string(),
                "extra".to_string(),
                "Note: cached copy".to_string(),
            ]
        );
        assert!(!merged.simulated);
        // Baseline untouched.
        assert_eq!(base.findings, vec!["Address: 0x12...78".to_string()]);
        assert!(base.simulated);
    }

    #[test]
    fn failing_provider_falls_back_to_simulated_baseline() {
        let (report, provenance) =
            enrich_or_baseline(&FailingProvider, ToolId::AddressLookup, baseline(), "0x0");
        assert_eq!(provenance, DataProvenance::Simulated);
        assert!(report.simulated);
        assert_eq!(report.findings, baseline().findings);
    }

    #[test]
    fn live_provider_clears_the_simulated_marker() {
        let (report, provenance) =
            enrich_or_baseline(&LiveProvider, ToolId::AddressLookup, baseline(), "0x0");
        assert_eq!(provenance, DataProvenance::Live);
        assert!(!report.simulated);
        assert!(report.findings.first().unwrap().contains("Live"));
        assert!(report.findings.last().unwrap().contains("block explorer"));
    }
}
