//! Properties of request construction across arbitrary records.

use proptest::prelude::*;

use pk_tracker_core::models::{FieldKind, TRACKED_FIELD_COUNT};
use pk_tracker_core::{DrugRecord, FieldValue, PkField, ScoredRecord};
use pk_tracker_research::{build_request, render_prompt, RESEARCH_GUIDANCE};

fn record_from_mask(mask: &[bool]) -> DrugRecord {
    let mut drug = DrugRecord::new(1, "Probe");
    for (field, present) in PkField::TRACKED.iter().zip(mask) {
        if *present {
            let value = match field.kind() {
                FieldKind::Numeric => FieldValue::Number(1.0),
                FieldKind::Text => FieldValue::Text("n/a".into()),
            };
            drug.apply(*field, Some(value));
        }
    }
    drug
}

proptest! {
    #[test]
    fn one_find_line_per_missing_field(mask in prop::collection::vec(any::<bool>(), TRACKED_FIELD_COUNT)) {
        let candidate = ScoredRecord::new(record_from_mask(&mask));
        let request = build_request(&candidate);
        let missing = mask.iter().filter(|p| !**p).count();

        prop_assert_eq!(request.requirements.len(), missing + RESEARCH_GUIDANCE.len());
        for (line, label) in request.requirements.iter().zip(&candidate.missing_fields) {
            prop_assert_eq!(line, &format!("Find {}", label));
        }
        prop_assert_eq!(&request.requirements[missing..], &RESEARCH_GUIDANCE[..]);
    }

    #[test]
    fn prompt_lists_every_missing_field(mask in prop::collection::vec(any::<bool>(), TRACKED_FIELD_COUNT)) {
        let candidate = ScoredRecord::new(record_from_mask(&mask));
        let prompt = render_prompt(&candidate);
        for label in &candidate.missing_fields {
            let line = format!("- {}\n", label);
            prop_assert!(prompt.contains(&line));
        }
    }
}
