//! Rendering verification responses as JSON, CSV or text.

use std::path::Path;

use console::style;
use labcert_core::{ValidationStatus, VerificationResponse};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// A response paired with the file it came from.
pub struct Verified<'a> {
    pub path: Option<&'a Path>,
    pub response: &'a VerificationResponse,
}

pub fn format_responses(items: &[Verified<'_>], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(items),
        OutputFormat::Csv => format_csv(items),
        OutputFormat::Text => Ok(items
            .iter()
            .map(format_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn format_json(items: &[Verified<'_>]) -> anyhow::Result<String> {
    // A single response prints as an object, several as an array.
    if let [single] = items {
        return Ok(serde_json::to_string_pretty(single.response)?);
    }

    let responses: Vec<_> = items.iter().map(|item| item.response).collect();
    Ok(serde_json::to_string_pretty(&responses)?)
}

fn format_csv(items: &[Verified<'_>]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "file",
        "report_id",
        "status",
        "validation_score",
        "laboratory_name",
        "category",
        "certificate_number",
        "unique_registration_number",
        "issue_date",
        "effective_expiry_date",
        "city",
        "state",
    ])?;

    for item in items {
        let r = item.response;
        wtr.write_record([
            &item.path.map(|p| p.display().to_string()).unwrap_or_default(),
            &r.report_id.to_string(),
            r.status.as_str(),
            &r.validation_score.to_string(),
            r.laboratory_name.as_deref().unwrap_or(""),
            &r.category.as_ref().map(|c| c.to_string()).unwrap_or_default(),
            r.certificate_number.as_deref().unwrap_or(""),
            r.unique_registration_number.as_deref().unwrap_or(""),
            &r.issue_date.map(|d| d.to_string()).unwrap_or_default(),
            &r.effective_expiry_date.map(|d| d.to_string()).unwrap_or_default(),
            r.city.as_deref().unwrap_or(""),
            r.state.as_deref().unwrap_or(""),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(item: &Verified<'_>) -> String {
    let r = item.response;
    let mut output = String::new();

    if let Some(path) = item.path {
        output.push_str(&format!("File: {}\n", path.display()));
    }

    let status = match r.status {
        ValidationStatus::Valid => style(r.status.as_str()).green(),
        _ => style(r.status.as_str()).red(),
    };
    output.push_str(&format!("Status: {} (score {})\n", status, r.validation_score));
    output.push_str(&format!("Report: #{}{}\n", r.report_id, if r.previously_seen { " (seen before)" } else { "" }));
    output.push('\n');

    output.push_str("Certificate:\n");
    output.push_str(&format!("  Number:   {}\n", r.certificate_number.as_deref().unwrap_or("-")));
    output.push_str(&format!("  ULR:      {}\n", r.unique_registration_number.as_deref().unwrap_or("-")));
    if let Some(segments) = &r.ulr_segments {
        output.push_str(&format!("            {}\n", segments.format()));
    }
    if let Some(category) = &r.category {
        output.push_str(&format!("  Category: {}\n", category));
    }
    match (&r.issue_date_text, r.issue_date) {
        (Some(text), Some(date)) => output.push_str(&format!("  Issued:   {} ({})\n", text, date)),
        (Some(text), None) => output.push_str(&format!("  Issued:   {}\n", text)),
        _ => {}
    }
    if let Some(expiry) = r.effective_expiry_date {
        output.push_str(&format!("  Expires:  {}\n", expiry));
    }

    if let Some(name) = &r.laboratory_name {
        output.push('\n');
        output.push_str("Laboratory:\n");
        output.push_str(&format!("  {}\n", name));
        let location: Vec<&str> = [r.city.as_deref(), r.state.as_deref()].into_iter().flatten().collect();
        if !location.is_empty() {
            output.push_str(&format!("  {}\n", location.join(", ")));
        }
    }

    output
}
