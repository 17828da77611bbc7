//! Dataset progress report.

use serde::{Deserialize, Serialize};

use crate::stats::{DatasetStats, MilestoneEvent};

/// Snapshot of dataset coverage plus milestones crossed since the last report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Report timestamp
    pub generated_at: String,
    /// Coverage counts
    pub stats: DatasetStats,
    /// Milestones announced with this report
    pub new_milestones: Vec<MilestoneEvent>,
}

impl ProgressReport {
    /// Create a report stamped with the current time.
    pub fn new(stats: DatasetStats, new_milestones: Vec<MilestoneEvent>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            stats,
            new_milestones,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to the plain-text daily summary.
    pub fn to_text(&self) -> String {
        let stats = &self.stats;
        let mut text = String::new();

        text.push_str(&format!("Total drugs: {}\n", stats.total));
        text.push_str(&coverage_line("Cmax coverage", stats, stats.with_any_cmax));
        text.push_str(&coverage_line(
            "Complete PK profiles",
            stats,
            stats.with_complete_pk_profile,
        ));
        text.push_str(&coverage_line(
            "Therapeutic ranges",
            stats,
            stats.with_therapeutic_range,
        ));

        if !self.new_milestones.is_empty() {
            text.push_str("Milestones:\n");
            for event in &self.new_milestones {
                text.push_str(&format!("- {} [{}]\n", event.message, event.label));
            }
        }

        text
    }
}

fn coverage_line(label: &str, stats: &DatasetStats, count: usize) -> String {
    format!(
        "{}: {}/{} ({:.1}%)\n",
        label,
        count,
        stats.total,
        stats.percent(count)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::detect_milestones;

    fn make_stats() -> DatasetStats {
        DatasetStats {
            total: 20,
            with_any_cmax: 19,
            with_complete_pk_profile: 10,
            with_therapeutic_range: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_text_summary() {
        let report = ProgressReport::new(make_stats(), Vec::new());
        let text = report.to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Total drugs: 20",
                "Cmax coverage: 19/20 (95.0%)",
                "Complete PK profiles: 10/20 (50.0%)",
                "Therapeutic ranges: 5/20 (25.0%)",
            ]
        );
    }

    #[test]
    fn test_text_lists_milestones() {
        let stats = make_stats();
        let events = detect_milestones(&stats);
        let report = ProgressReport::new(stats, events);
        let text = report.to_text();

        assert!(text.contains("Milestones:"));
        assert!(text.contains("- 95% Cmax coverage achieved (19/20 drugs) [v0.95-cmax-milestone]"));
    }

    #[test]
    fn test_empty_dataset_renders_zero_percent() {
        let report = ProgressReport::new(DatasetStats::default(), Vec::new());
        assert!(report.to_text().contains("Cmax coverage: 0/0 (0.0%)"));
    }

    #[test]
    fn test_json_export() {
        let report = ProgressReport::new(make_stats(), Vec::new());
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["stats"]["withAnyCmax"], 19);
        assert!(value["generated_at"].is_string());
        assert!(value["new_milestones"].as_array().unwrap().is_empty());
    }
}
