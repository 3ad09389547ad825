use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use searchlens_core::gsc::SearchTerm;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub search_terms: Vec<SearchTerm>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// `POST /api/export/search-terms` - render a term table as a CSV
/// attachment, the same columns the dashboard table shows.
pub async fn export_search_terms(
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Term", "Current Clicks", "Previous Clicks", "Change (%)"])
        .map_err(anyhow::Error::from)?;

    for term in &request.search_terms {
        let current = term.current.clicks.to_string();
        let previous = term.previous.clicks.to_string();
        writer
            .write_record([
                term.term.as_str(),
                current.as_str(),
                previous.as_str(),
                signed_pct(&term.changes.clicks).as_str(),
            ])
            .map_err(anyhow::Error::from)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("finalize CSV: {e}"))?;

    let filename = sanitize_filename(request.filename.as_deref().unwrap_or("search-terms"));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}.csv\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// "12.5" -> "+12.5%", "-3.2" -> "-3.2%".
fn signed_pct(change: &str) -> String {
    if change.starts_with('-') {
        format!("{change}%")
    } else {
        format!("+{change}%")
    }
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .collect();
    if cleaned.is_empty() {
        "search-terms".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_strings_get_explicit_sign() {
        assert_eq!(signed_pct("12.5"), "+12.5%");
        assert_eq!(signed_pct("-3.2"), "-3.2%");
        assert_eq!(signed_pct("0.0"), "+0.0%");
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("weekly-terms"), "weekly-terms");
        assert_eq!(sanitize_filename("../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename("\"\""), "search-terms");
    }
}
