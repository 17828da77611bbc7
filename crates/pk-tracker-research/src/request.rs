//! Research request construction.

use pk_tracker_core::ScoredRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Guidance appended to every request, after the per-field requirements.
pub const RESEARCH_GUIDANCE: [&str; 5] = [
    "Search multiple authoritative sources",
    "Verify numbers from 2-3 sources",
    "Include molecular weight for conversions",
    "Focus on clinically validated values",
    "Present in structured format",
];

/// One outbound research request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub request_id: Uuid,
    pub topic: String,
    pub requirements: Vec<String>,
}

impl ResearchRequest {
    pub fn new(topic: impl Into<String>, requirements: Vec<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            topic: topic.into(),
            requirements,
        }
    }
}

pub fn research_topic(drug_name: &str) -> String {
    format!("Pharmacokinetic data for {}", drug_name)
}

/// Request for a scored record: one "Find" line per missing field in catalog
/// order, then [`RESEARCH_GUIDANCE`].
pub fn build_request(candidate: &ScoredRecord) -> ResearchRequest {
    let requirements = candidate
        .missing_fields
        .iter()
        .map(|label| format!("Find {}", label))
        .chain(RESEARCH_GUIDANCE.iter().map(|s| s.to_string()))
        .collect();

    ResearchRequest::new(research_topic(&candidate.record.drug_name), requirements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pk_tracker_core::models::FieldKind;
    use pk_tracker_core::{DrugRecord, FieldValue, PkField};

    #[test]
    fn test_requirements_follow_catalog_order() {
        let mut drug = DrugRecord::new(1, "Allopurinol");
        for field in PkField::TRACKED.iter().skip(3) {
            drug.apply(*field, Some(FieldValue::Number(1.0)));
        }
        // Text fields reject numbers, so they stay missing too.
        let candidate = ScoredRecord::new(drug);
        let request = build_request(&candidate);

        assert_eq!(request.topic, "Pharmacokinetic data for Allopurinol");
        assert_eq!(
            &request.requirements[..3],
            &["Find Oral Cmax", "Find IV Cmax", "Find Half-life"]
        );
        assert_eq!(
            request.requirements.len(),
            candidate.missing_fields.len() + RESEARCH_GUIDANCE.len()
        );
        assert_eq!(
            request.requirements.last().map(String::as_str),
            Some("Present in structured format")
        );
    }

    #[test]
    fn test_request_ids_are_unique() {
        let candidate = ScoredRecord::new(DrugRecord::new(1, "Cisplatin"));
        assert_ne!(
            build_request(&candidate).request_id,
            build_request(&candidate).request_id
        );
    }

    #[test]
    fn test_complete_record_has_only_guidance() {
        let mut drug = DrugRecord::new(1, "Complete");
        for field in PkField::TRACKED {
            let value = match field.kind() {
                FieldKind::Numeric => FieldValue::Number(1.0),
                FieldKind::Text => FieldValue::Text("x".into()),
            };
            drug.apply(field, Some(value));
        }
        let request = build_request(&ScoredRecord::new(drug));
        assert_eq!(request.requirements, RESEARCH_GUIDANCE.to_vec());
    }
}
