// src/export.rs
//! Flat CSV export: one row per issue, 1-based index plus description.

use anyhow::Result;

use crate::types::Issue;

pub fn render_issues_csv(issues: &[Issue]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record(["id", "issue"])?;
    for (i, issue) in issues.iter().enumerate() {
        wtr.write_record([(i + 1).to_string(), issue.description.clone()])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}

/// `issues-<product>.csv`, product reduced to a filename-safe slug.
pub fn export_filename(product: &str) -> String {
    let mut slug = String::with_capacity(product.len());
    let mut prev_dash = false;
    for ch in product.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash && !slug.is_empty() {
            slug.push('-');
            prev_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "issues.csv".to_string()
    } else {
        format!("issues-{slug}.csv")
    }
}
