//! CSV export for ledger entries.
//!
//! Column order is fixed; external recovery tooling depends on it.

use aurelia_core::models::MediaEntry;

const HEADERS: [&str; 9] = [
    "id",
    "product_id",
    "url",
    "s3_key",
    "original_filename",
    "mime_type",
    "file_size",
    "is_webp",
    "uploaded_at",
];

/// Render entries as CSV with the fixed header row.
///
/// Values containing a comma, a quote, or a newline are quoted with internal
/// quotes doubled; null fields render as the empty string.
pub fn export_csv(entries: &[MediaEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(HEADERS.join(","));

    for entry in entries {
        let fields = [
            escape(&entry.id),
            entry.product_id.as_deref().map(escape).unwrap_or_default(),
            escape(&entry.url),
            escape(&entry.s3_key),
            escape(&entry.original_filename),
            escape(&entry.mime_type),
            entry.file_size.to_string(),
            entry.is_webp.to_string(),
            escape(&entry.uploaded_at.to_rfc3339()),
        ];
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
