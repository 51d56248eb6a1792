//! # Cable Schedule
//!
//! Root container for a project's installed circuits, the settings and rate
//! table they are analyzed against, and the report an analysis produces.
//!
//! ```text
//! CableSchedule
//! ├── meta: ScheduleMetadata (job info, timestamps)
//! ├── settings: OptimizationSettings
//! ├── rates: RateTable
//! └── entries: HashMap<Uuid, CableEntry>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cable_core::analysis::CableEntry;
//! use cable_core::schedule::CableSchedule;
//!
//! let mut schedule = CableSchedule::new("24-117", "Riverside Plant");
//! schedule.add_entry(CableEntry::new("MSB-DB1", "185mm²", 50.0, 2).with_load(500.0));
//!
//! let report = schedule.analyze();
//! assert_eq!(report.summary.circuits, 1);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{analyze_optimizations, CableEntry, OptimizationResult, OptimizationStatus};
use crate::errors::CalcResult;
use crate::rates::RateTable;
use crate::settings::OptimizationSettings;

/// Current schema version for serialized schedules
pub const SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CableSchedule {
    pub meta: ScheduleMetadata,
    #[serde(default)]
    pub settings: OptimizationSettings,
    /// Rates used for pricing; the reference rates when empty
    #[serde(default)]
    pub rates: RateTable,
    #[serde(default)]
    pub entries: HashMap<Uuid, CableEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    pub version: String,
    pub job_id: String,
    pub project_name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl CableSchedule {
    pub fn new(job_id: impl Into<String>, project_name: impl Into<String>) -> Self {
        let now = Utc::now();
        CableSchedule {
            meta: ScheduleMetadata {
                version: SCHEMA_VERSION.to_string(),
                job_id: job_id.into(),
                project_name: project_name.into(),
                created: now,
                modified: now,
            },
            settings: OptimizationSettings::default(),
            rates: RateTable::default(),
            entries: HashMap::new(),
        }
    }

    /// Parse a schedule from JSON, validating its settings.
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        let schedule: CableSchedule = serde_json::from_str(json)?;
        schedule.settings.validate()?;
        Ok(schedule)
    }

    /// Add an entry, keyed by its own id.
    pub fn add_entry(&mut self, entry: CableEntry) -> Uuid {
        let id = entry.id;
        self.entries.insert(id, entry);
        self.touch();
        id
    }

    pub fn remove_entry(&mut self, id: &Uuid) -> Option<CableEntry> {
        let entry = self.entries.remove(id);
        if entry.is_some() {
            self.touch();
        }
        entry
    }

    pub fn get_entry(&self, id: &Uuid) -> Option<&CableEntry> {
        self.entries.get(id)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Rates in effect: the schedule's own, or the reference rates when none
    /// were supplied.
    pub fn effective_rates(&self) -> &RateTable {
        if self.rates.is_empty() {
            RateTable::reference()
        } else {
            &self.rates
        }
    }

    /// Analyze every entry; results are ordered by label.
    pub fn analyze(&self) -> OptimizationReport {
        let mut entries: Vec<CableEntry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.label.cmp(&b.label).then(a.id.cmp(&b.id)));
        let results = analyze_optimizations(&entries, self.effective_rates(), &self.settings);
        OptimizationReport::new(&self.meta, results)
    }
}

impl Default for CableSchedule {
    fn default() -> Self {
        CableSchedule::new("", "")
    }
}

/// Outcome of analyzing a whole schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub job_id: String,
    pub project_name: String,
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub results: Vec<OptimizationResult>,
}

/// Totals over the circuits that were priced and compared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub circuits: usize,
    pub optimized: usize,
    pub already_optimal: usize,
    /// Compliant installed circuits with no rate
    pub unpriced: usize,
    pub no_viable_configuration: usize,
    pub skipped: usize,
    /// Installed cost of priced circuits
    pub current_cost: f64,
    /// Cost with every recommendation applied
    pub optimized_cost: f64,
    pub total_potential_savings: f64,
}

impl OptimizationReport {
    pub fn new(meta: &ScheduleMetadata, results: Vec<OptimizationResult>) -> Self {
        let mut summary = ReportSummary {
            circuits: results.len(),
            ..ReportSummary::default()
        };
        for result in &results {
            match result.status {
                OptimizationStatus::Optimized => summary.optimized += 1,
                OptimizationStatus::AlreadyOptimal => summary.already_optimal += 1,
                OptimizationStatus::Unpriced => summary.unpriced += 1,
                OptimizationStatus::NoViableConfiguration => summary.no_viable_configuration += 1,
                OptimizationStatus::Skipped => summary.skipped += 1,
            }
            if let Some(current) = result.current.as_ref().filter(|c| c.priced) {
                summary.current_cost += current.cost.total;
                summary.optimized_cost += current.cost.total - result.potential_savings;
            }
            summary.total_potential_savings += result.potential_savings;
        }

        OptimizationReport {
            job_id: meta.job_id.clone(),
            project_name: meta.project_name.clone(),
            generated_at: Utc::now(),
            summary,
            results,
        }
    }

    pub fn results_with_status(&self, status: OptimizationStatus) -> impl Iterator<Item = &OptimizationResult> {
        self.results.iter().filter(move |r| r.status == status)
    }
}
