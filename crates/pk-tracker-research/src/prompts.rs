//! Research prompts for PK data collection.
//!
//! The prompt lists the fields still missing and then asks for the full
//! parameter set, grouped the way the drugs table is.

use pk_tracker_core::ScoredRecord;

use crate::ResearchRequest;

/// Parameter checklist sent with every prompt.
pub const PARAMETER_CHECKLIST: &str = r#"Please provide:
1. CMAX VALUES (with units):
   - Oral Cmax (mg/L)
   - IV Cmax (mg/L)
   - Topical Cmax (mg/L) if applicable
   - Standard doses for each route

2. TIMING PARAMETERS:
   - Half-life (hours)
   - Tmax (hours)
   - Time to steady state (days)
   - AUC values (mg·h/L)

3. DISTRIBUTION:
   - Volume of distribution (L/kg)
   - Protein binding (%)
   - CNS penetration (CSF/plasma ratio %)

4. THERAPEUTIC RANGE:
   - Minimum therapeutic level (mg/L)
   - Maximum therapeutic level (mg/L)
   - Convert to molar units (M)

5. CLINICAL DATA:
   - Standard adult dose (mg)
   - Dosing frequency
   - Active metabolites
   - Food effects"#;

/// Closing instructions on sourcing and format.
pub const SOURCING_NOTE: &str = "Search multiple authoritative sources (FDA labels, clinical \
pharmacology textbooks, peer-reviewed studies). Verify numbers from at least 2-3 sources. \
Present data in structured format with molecular weight for molar conversions.

Focus on clinically validated values used in therapeutic drug monitoring and clinical practice.";

/// Full research prompt for a candidate.
pub fn render_prompt(candidate: &ScoredRecord) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Research comprehensive pharmacokinetic data for {}:\n\n",
        candidate.record.drug_name
    ));

    prompt.push_str("REQUIRED DATA TO FIND:\n");
    for field in &candidate.missing_fields {
        prompt.push_str(&format!("- {}\n", field));
    }
    prompt.push('\n');

    prompt.push_str(PARAMETER_CHECKLIST);
    prompt.push_str("\n\n");
    prompt.push_str(SOURCING_NOTE);

    prompt
}

/// Numbered listing of a request, as shown before it is sent.
pub fn render_request(request: &ResearchRequest) -> String {
    let mut text = format!("Topic: {}\nRequirements:\n", request.topic);
    for (i, requirement) in request.requirements.iter().enumerate() {
        text.push_str(&format!("  {}. {}\n", i + 1, requirement));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pk_tracker_core::{DrugRecord, PkField};

    fn make_candidate() -> ScoredRecord {
        ScoredRecord::new(
            DrugRecord::new(7, "Allopurinol")
                .with(PkField::CmaxOralMgL, 2.5)
                .with(PkField::HalfLifeHours, 1.2),
        )
    }

    #[test]
    fn test_prompt_names_drug_and_missing_fields() {
        let prompt = render_prompt(&make_candidate());

        assert!(prompt.starts_with("Research comprehensive pharmacokinetic data for Allopurinol:"));
        assert!(prompt.contains("- IV Cmax\n"));
        assert!(prompt.contains("- CNS penetration\n"));
        assert!(!prompt.contains("- Oral Cmax\n"));
        assert!(prompt.contains("THERAPEUTIC RANGE"));
        assert!(prompt.ends_with("clinical practice."));
    }

    #[test]
    fn test_missing_fields_listed_in_catalog_order() {
        let prompt = render_prompt(&make_candidate());
        let iv = prompt.find("- IV Cmax").unwrap();
        let tmax = prompt.find("- Tmax").unwrap();
        let food = prompt.find("- Food effects\n").unwrap();
        assert!(iv < tmax && tmax < food);
    }

    #[test]
    fn test_render_request_numbers_requirements() {
        let request = ResearchRequest::new(
            "Pharmacokinetic data for Allopurinol",
            vec!["Find IV Cmax".into(), "Verify numbers from 2-3 sources".into()],
        );
        let text = render_request(&request);

        assert!(text.contains("Topic: Pharmacokinetic data for Allopurinol"));
        assert!(text.contains("  1. Find IV Cmax\n"));
        assert!(text.contains("  2. Verify numbers from 2-3 sources\n"));
    }
}
