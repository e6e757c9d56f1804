//! Claim fixtures shared by unit tests

use shared_types::{Claim, ClaimSet};

pub const EADV_CITATION: &str = "Zhang X, et al. EADV 2022.";
pub const LANCET_CITATION: &str = "King B, et al. Lancet 2023.";

pub fn claim(statistic: &str, citation: &str, qualifiers: &[&str], endpoint: &str) -> Claim {
    Claim {
        statistic: statistic.to_string(),
        context: String::new(),
        timepoint: String::new(),
        treatment_arm: String::new(),
        sample_size: String::new(),
        citation: citation.to_string(),
        qualifiers: qualifiers.iter().map(|q| q.to_string()).collect(),
        endpoint: endpoint.to_string(),
    }
}

/// Two ritlecitinib claims with shared endpoint and distinct citations
pub fn sample_claims() -> ClaimSet {
    ClaimSet::new(vec![
        Claim {
            statistic: "36.2%".to_string(),
            context: "Non-AT/Non-AU patients".to_string(),
            timepoint: "Week 24".to_string(),
            treatment_arm: "Ritlecitinib 50 mg QD (n=130)".to_string(),
            sample_size: "n=130".to_string(),
            citation: EADV_CITATION.to_string(),
            qualifiers: vec!["Post hoc analysis".to_string()],
            endpoint: "SALT ≤20".to_string(),
        },
        Claim {
            statistic: "23.0%".to_string(),
            context: "AT/AU patients".to_string(),
            timepoint: "Week 24".to_string(),
            treatment_arm: "Ritlecitinib 50 mg QD (n=130)".to_string(),
            sample_size: "n=130".to_string(),
            citation: LANCET_CITATION.to_string(),
            qualifiers: vec!["Subgroup analysis".to_string()],
            endpoint: "SALT ≤20".to_string(),
        },
    ])
}

/// Markup that surfaces everything in [`sample_claims`]
pub fn compliant_markup() -> String {
    format!(
        "<h1>Ritlecitinib 50 mg QD</h1>\
         <p>36.2% and 23.0% reached SALT ≤20 at Week 24 (n=130).</p>\
         <p>Post hoc analysis. Subgroup analysis.</p>\
         <footer><p>{}</p><p>{}</p></footer>",
        EADV_CITATION, LANCET_CITATION
    )
}
