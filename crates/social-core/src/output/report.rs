//! Run Report
//!
//! Accumulates interaction totals and a metrics history during a run and
//! writes them as JSON at the end.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use social_wire::{Faction, FactionCounts, MetricsSnapshot};

use crate::systems::interaction::InteractionOutcome;

/// Default report path
pub const REPORT_OUTPUT_PATH: &str = "output/report.json";

/// Final report of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub total_ticks: u64,
    /// "local" or "remote" at the end of the run
    pub final_mode: String,
    pub total_interactions: usize,
    pub applied_interactions: usize,
    pub average_interactions_per_tick: f64,
    pub interactions_by_rule: BTreeMap<String, usize>,
    pub conversions: BTreeMap<String, usize>,
    pub peak_counts: FactionCounts,
    pub final_metrics: MetricsSnapshot,
    pub metrics_history: Vec<MetricsSnapshot>,
}

/// Accumulates statistics across ticks
#[derive(Debug, Default)]
pub struct ReportCollector {
    pub total_interactions: usize,
    pub applied_interactions: usize,
    pub interactions_by_rule: BTreeMap<String, usize>,
    pub conversions: BTreeMap<String, usize>,
    pub peak_counts: FactionCounts,
    pub metrics_history: Vec<MetricsSnapshot>,
}

impl ReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the collisions of one tick
    pub fn record_interactions(&mut self, outcomes: &[InteractionOutcome]) {
        for outcome in outcomes {
            self.total_interactions += 1;
            if outcome.applied {
                self.applied_interactions += 1;
            }
            *self
                .interactions_by_rule
                .entry(outcome.rule.to_string())
                .or_insert(0) += 1;
            if let Some(conversion) = outcome.conversion {
                *self
                    .conversions
                    .entry(format!("{:?}", conversion))
                    .or_insert(0) += 1;
            }
        }
    }

    /// Track per-faction peaks; every tick
    pub fn observe_counts(&mut self, counts: &FactionCounts) {
        for faction in Faction::ALL {
            let current = counts.get(faction);
            let peak = match faction {
                Faction::Entropics => &mut self.peak_counts.entropics,
                Faction::Luminaries => &mut self.peak_counts.luminaries,
                Faction::Catalysts => &mut self.peak_counts.catalysts,
                Faction::Inert => &mut self.peak_counts.inert,
            };
            *peak = (*peak).max(current);
        }
    }

    /// Keep a snapshot in the history; at the report interval
    pub fn record_metrics(&mut self, metrics: &MetricsSnapshot) {
        self.observe_counts(&metrics.counts);
        self.metrics_history.push(metrics.clone());
    }

    pub fn generate_report(
        &self,
        seed: u64,
        total_ticks: u64,
        final_mode: &str,
        final_metrics: MetricsSnapshot,
    ) -> RunReport {
        let average_interactions_per_tick = if total_ticks > 0 {
            self.total_interactions as f64 / total_ticks as f64
        } else {
            0.0
        };

        RunReport {
            seed,
            total_ticks,
            final_mode: final_mode.to_string(),
            total_interactions: self.total_interactions,
            applied_interactions: self.applied_interactions,
            average_interactions_per_tick,
            interactions_by_rule: self.interactions_by_rule.clone(),
            conversions: self.conversions.clone(),
            peak_counts: self.peak_counts,
            final_metrics,
            metrics_history: self.metrics_history.clone(),
        }
    }
}

/// Write the report as pretty JSON, creating parent directories.
pub fn write_report(report: &RunReport, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    fs::write(path, json)
}
