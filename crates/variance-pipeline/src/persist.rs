//! Writes a finished batch to disk
//!
//! Layout of the output directory:
//! - `claims.json`: the claim set, as `{"claims": [...]}`
//! - `compliance_report.json`: one entry per validated variant, without markup
//! - `variant_{i}.html`: markup for every variant that produced any
//! - `index.html`: summary table with the verdict for every expected variant

use crate::orchestrator::{BatchOutcome, VariantOutcome, VariantStatus};
use anyhow::Context;
use shared_types::{ClaimSet, ExtractionResult, VariantResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CLAIMS_FILE: &str = "claims.json";
pub const REPORT_FILE: &str = "compliance_report.json";
pub const INDEX_FILE: &str = "index.html";

pub fn variant_file_name(outcome: &VariantOutcome) -> String {
    format!("variant_{}.html", outcome.variant.index())
}

/// Persist every artifact of a batch, returning the paths written
pub fn persist_batch(
    dir: &Path,
    claims: &ClaimSet,
    outcome: &BatchOutcome,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut written = Vec::new();

    for variant in outcome.outcomes() {
        if let Some(rendered) = variant.rendered() {
            let path = dir.join(variant_file_name(variant));
            write_file(&path, rendered)?;
            written.push(path);
        }
    }

    let extraction = ExtractionResult {
        claims: claims.clone(),
    };
    let claims_json =
        serde_json::to_string_pretty(&extraction).context("Failed to serialize claims")?;
    let path = dir.join(CLAIMS_FILE);
    write_file(&path, &claims_json)?;
    written.push(path);

    let results: Vec<&VariantResult> = outcome.results().collect();
    let report_json =
        serde_json::to_string_pretty(&results).context("Failed to serialize compliance reports")?;
    let path = dir.join(REPORT_FILE);
    write_file(&path, &report_json)?;
    written.push(path);

    let path = dir.join(INDEX_FILE);
    write_file(&path, &render_index(outcome))?;
    written.push(path);

    info!(dir = %dir.display(), files = written.len(), "Batch persisted");
    Ok(written)
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote output file");
    Ok(())
}

/// Summary page linking every variant that has markup
pub fn render_index(outcome: &BatchOutcome) -> String {
    let rows: Vec<String> = outcome.outcomes().iter().map(index_row).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Content Variance Results</title>
  <style>
    body {{ font-family: sans-serif; max-width: 800px; margin: 2rem auto; padding: 0 1rem; }}
    table {{ width: 100%; border-collapse: collapse; }}
    th, td {{ text-align: left; padding: 0.5rem 1rem; border-bottom: 1px solid #e5e7eb; }}
    th {{ background: #f9fafb; }}
  </style>
</head>
<body>
  <h1>Content Variance Results</h1>
  <table>
    <thead><tr><th>#</th><th>Variant Type</th><th>Compliance</th><th>File</th></tr></thead>
    <tbody>
{}
    </tbody>
  </table>
</body>
</html>
"#,
        rows.join("\n")
    )
}

fn index_row(outcome: &VariantOutcome) -> String {
    let (color, status, detail) = match &outcome.status {
        VariantStatus::Validated(result) if result.overall_passed() => ("#22c55e", "PASSED", None),
        VariantStatus::Validated(_) => ("#ef4444", "FAILED", None),
        VariantStatus::GenerationFailed { reason } => ("#6b7280", "GENERATION FAILED", Some(reason)),
        VariantStatus::ValidationFailed { reason, .. } => {
            ("#f59e0b", "VALIDATION FAILED", Some(reason))
        }
    };

    let status_cell = match detail {
        Some(reason) => format!(
            r#"<td style="color:{}" title="{}">{}</td>"#,
            color,
            escape_html(reason),
            status
        ),
        None => format!(r#"<td style="color:{}">{}</td>"#, color, status),
    };

    let file_cell = match outcome.rendered() {
        Some(_) => {
            let name = variant_file_name(outcome);
            format!(r#"<td><a href="{}">{}</a></td>"#, name, name)
        }
        None => "<td>-</td>".to_string(),
    };

    format!(
        "      <tr><td>{}</td><td>{}</td>{}{}</tr>",
        outcome.variant.index(),
        outcome.variant,
        status_cell,
        file_cell
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::CompletenessGate;
    use crate::orchestrator::{Generation, Orchestrator};
    use crate::test_support::{claims, passing_markup};
    use compliance_engine::ComplianceEngine;
    use pretty_assertions::assert_eq;
    use shared_types::VariantKind;

    fn mixed_batch() -> BatchOutcome {
        let generated = vec![
            (VariantKind::GroupedBar, Generation::Rendered(passing_markup())),
            (VariantKind::Timeline, Generation::Failed("template <error>".to_string())),
            (VariantKind::SpotlightCards, Generation::Rendered("<p>no data</p>".to_string())),
            (VariantKind::Heatmap, Generation::Rendered("<style>td {".to_string())),
            (VariantKind::Infographic, Generation::Rendered(passing_markup())),
        ];
        Orchestrator::new(
            ComplianceEngine::new(),
            CompletenessGate::new(1),
            VariantKind::ALL.to_vec(),
        )
        .run(&claims(1), generated)
        .unwrap()
    }

    #[test]
    fn test_writes_expected_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("run");
        let written = persist_batch(&out, &claims(2), &mixed_batch()).unwrap();

        let mut names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "claims.json",
                "compliance_report.json",
                "index.html",
                "variant_0.html",
                "variant_2.html",
                "variant_3.html",
                "variant_4.html",
            ]
        );
        assert!(!out.join("variant_1.html").exists());
        assert_eq!(
            fs::read_to_string(out.join("variant_0.html")).unwrap(),
            passing_markup()
        );
    }

    #[test]
    fn test_claims_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        persist_batch(dir.path(), &claims(3), &mixed_batch()).unwrap();

        let text = fs::read_to_string(dir.path().join(CLAIMS_FILE)).unwrap();
        let parsed: ExtractionResult = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.claims, claims(3));
    }

    #[test]
    fn test_report_json_lists_validated_variants_without_markup() {
        let dir = tempfile::tempdir().unwrap();
        persist_batch(dir.path(), &claims(1), &mixed_batch()).unwrap();

        let text = fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 3);

        let variants: Vec<_> = entries.iter().map(|e| e["variant"].as_str().unwrap()).collect();
        assert_eq!(variants, vec!["grouped_bar", "spotlight_cards", "infographic"]);
        assert_eq!(entries[0]["overall_passed"], true);
        assert_eq!(entries[1]["overall_passed"], false);
        assert!(entries.iter().all(|e| e.get("rendered").is_none()));
    }

    #[test]
    fn test_index_shows_every_status() {
        let html = render_index(&mixed_batch());
        assert!(html.contains("PASSED"));
        assert!(html.contains(">FAILED<"));
        assert!(html.contains("GENERATION FAILED"));
        assert!(html.contains("VALIDATION FAILED"));
        assert!(html.contains(r#"<a href="variant_3.html">"#));
        assert!(!html.contains(r#"href="variant_1.html""#));
        assert!(html.contains("template &lt;error&gt;"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
