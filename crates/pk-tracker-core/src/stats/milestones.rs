//! Milestone detection over a stats snapshot.
//!
//! Thresholds are half-open bands:
//!
//! | id                        | value                      | band        |
//! |---------------------------|----------------------------|-------------|
//! | `v0.95-cmax-milestone`    | withAnyCmax / total (%)    | [95, 96)    |
//! | `v0.98-cmax-milestone`    | withAnyCmax / total (%)    | [98, 99)    |
//! | `v1.0-cmax-complete`      | withAnyCmax / total (%)    | >= 100      |
//! | `v1.0-hundred-profiles`   | withCompletePkProfile      | [100, 105)  |
//! | `v1.0-therapeutic-ranges` | withTherapeuticRange       | [75, 80)    |
//!
//! [`detect_milestones`] reports every band that currently holds the
//! snapshot. [`newly_crossed`] filters those against the set of ids already
//! announced; an id, once announced, is never reported again.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DatasetStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MilestoneId {
    #[serde(rename = "v0.95-cmax-milestone")]
    Cmax95,
    #[serde(rename = "v0.98-cmax-milestone")]
    Cmax98,
    #[serde(rename = "v1.0-cmax-complete")]
    CmaxComplete,
    #[serde(rename = "v1.0-hundred-profiles")]
    HundredProfiles,
    #[serde(rename = "v1.0-therapeutic-ranges")]
    TherapeuticRanges,
}

impl MilestoneId {
    pub const ALL: [MilestoneId; 5] = [
        MilestoneId::Cmax95,
        MilestoneId::Cmax98,
        MilestoneId::CmaxComplete,
        MilestoneId::HundredProfiles,
        MilestoneId::TherapeuticRanges,
    ];

    /// Stable tag used to identify the milestone outside the process.
    pub fn tag(self) -> &'static str {
        match self {
            MilestoneId::Cmax95 => "v0.95-cmax-milestone",
            MilestoneId::Cmax98 => "v0.98-cmax-milestone",
            MilestoneId::CmaxComplete => "v1.0-cmax-complete",
            MilestoneId::HundredProfiles => "v1.0-hundred-profiles",
            MilestoneId::TherapeuticRanges => "v1.0-therapeutic-ranges",
        }
    }

    fn band(self) -> Band {
        match self {
            MilestoneId::Cmax95 => Band::CmaxPercent { lo: 95, hi: Some(96) },
            MilestoneId::Cmax98 => Band::CmaxPercent { lo: 98, hi: Some(99) },
            MilestoneId::CmaxComplete => Band::CmaxPercent { lo: 100, hi: None },
            MilestoneId::HundredProfiles => Band::Count {
                metric: Metric::CompletePkProfile,
                lo: 100,
                hi: 105,
            },
            MilestoneId::TherapeuticRanges => Band::Count {
                metric: Metric::TherapeuticRange,
                lo: 75,
                hi: 80,
            },
        }
    }

    fn message(self, stats: &DatasetStats) -> String {
        match self {
            MilestoneId::Cmax95 => format!(
                "95% Cmax coverage achieved ({}/{} drugs)",
                stats.with_any_cmax, stats.total
            ),
            MilestoneId::Cmax98 => format!(
                "98% Cmax coverage achieved ({}/{} drugs)",
                stats.with_any_cmax, stats.total
            ),
            MilestoneId::CmaxComplete => format!(
                "100% Cmax coverage achieved! All {} drugs have Cmax data",
                stats.total
            ),
            MilestoneId::HundredProfiles => format!(
                "100+ drugs with complete PK profiles ({} drugs)",
                stats.with_complete_pk_profile
            ),
            MilestoneId::TherapeuticRanges => format!(
                "75+ drugs with therapeutic ranges ({} drugs)",
                stats.with_therapeutic_range
            ),
        }
    }
}

impl fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MilestoneId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MilestoneId::ALL
            .into_iter()
            .find(|id| id.tag() == s)
            .ok_or_else(|| format!("unknown milestone: {}", s))
    }
}

#[derive(Debug, Clone, Copy)]
enum Metric {
    CompletePkProfile,
    TherapeuticRange,
}

#[derive(Debug, Clone, Copy)]
enum Band {
    /// Percentage of records with any Cmax, `hi` exclusive.
    CmaxPercent { lo: usize, hi: Option<usize> },
    /// Absolute count, `hi` exclusive.
    Count { metric: Metric, lo: usize, hi: usize },
}

impl Band {
    fn contains(self, stats: &DatasetStats) -> bool {
        match self {
            Band::CmaxPercent { lo, hi } => {
                if stats.total == 0 {
                    return false;
                }
                // Exact integer comparison of count/total against lo%/hi%.
                let scaled = stats.with_any_cmax * 100;
                let above = scaled >= lo * stats.total;
                let below = hi.map_or(true, |hi| scaled < hi * stats.total);
                above && below
            }
            Band::Count { metric, lo, hi } => {
                let value = match metric {
                    Metric::CompletePkProfile => stats.with_complete_pk_profile,
                    Metric::TherapeuticRange => stats.with_therapeutic_range,
                };
                value >= lo && value < hi
            }
        }
    }
}

/// A milestone whose band holds the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneEvent {
    pub id: MilestoneId,
    pub label: String,
    pub message: String,
}

impl MilestoneEvent {
    fn new(id: MilestoneId, stats: &DatasetStats) -> Self {
        Self {
            id,
            label: id.tag().to_string(),
            message: id.message(stats),
        }
    }
}

/// Every milestone whose band currently contains the snapshot.
pub fn detect_milestones(stats: &DatasetStats) -> Vec<MilestoneEvent> {
    MilestoneId::ALL
        .into_iter()
        .filter(|id| id.band().contains(stats))
        .map(|id| MilestoneEvent::new(id, stats))
        .collect()
}

/// Result of comparing a snapshot against the announced set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MilestoneUpdate {
    /// Milestones in band and not announced before.
    pub new_events: Vec<MilestoneEvent>,
    /// Announced set including `new_events`.
    pub announced: BTreeSet<MilestoneId>,
}

/// Milestones crossed for the first time.
pub fn newly_crossed(stats: &DatasetStats, announced: &BTreeSet<MilestoneId>) -> MilestoneUpdate {
    let new_events: Vec<MilestoneEvent> = detect_milestones(stats)
        .into_iter()
        .filter(|event| !announced.contains(&event.id))
        .collect();

    let mut announced = announced.clone();
    announced.extend(new_events.iter().map(|event| event.id));

    for event in &new_events {
        tracing::info!(milestone = %event.id, "{}", event.message);
    }

    MilestoneUpdate {
        new_events,
        announced,
    }
}
