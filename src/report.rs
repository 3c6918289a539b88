//! Plain-text rendering of detection results and column profiles.

use std::{collections::BTreeMap, fmt::Write as _};

use itertools::Itertools;

use crate::model::{DetectionResult, FieldMapping, FieldStatistics};

/// Left-aligned columns separated by two spaces, with a dashed rule under the header.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(3)).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut output = String::new();
    let _ = writeln!(output, "{}", format_line(&header_cells, &widths));
    let _ = writeln!(output, "{}", format_line(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_line(row, &widths));
    }
    output
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell.replace(['\n', '\r', '\t'], " ")))
        .join("  ");
    line.trim_end().to_string()
}

fn confidence(value: f64) -> String {
    format!("{value:.2}")
}

fn mapping_row(role: &str, mapping: Option<&FieldMapping>) -> Vec<String> {
    match mapping {
        Some(mapping) => vec![
            role.to_string(),
            mapping.path.clone(),
            confidence(mapping.confidence),
        ],
        None => vec![role.to_string(), "-".to_string(), "-".to_string()],
    }
}

pub fn render_detection(result: &DetectionResult) -> String {
    let mappings = &result.field_mappings;
    let mut rows = vec![
        vec![
            "language".to_string(),
            format!("{} ({})", result.language.code, result.language.name),
            confidence(result.language.confidence),
        ],
        mapping_row("title", mappings.title.as_ref()),
        mapping_row("description", mappings.description.as_ref()),
        mapping_row("timestamp", mappings.timestamp.as_ref()),
        mapping_row("locationName", mappings.location_name.as_ref()),
    ];
    match &mappings.geo {
        Some(geo) => {
            let target = match (&geo.combined, &geo.latitude, &geo.longitude) {
                (Some(combined), _, _) => {
                    format!("{} [{}]", combined.path, combined.format.as_str())
                }
                (None, lat, lng) => [lat.as_ref(), lng.as_ref(), geo.location_field.as_ref()]
                    .into_iter()
                    .flatten()
                    .map(|mapping| mapping.path.as_str())
                    .join(" / "),
            };
            rows.push(vec!["geo".to_string(), target, confidence(geo.confidence)]);
        }
        None => rows.push(mapping_row("geo", None)),
    }
    rows.push(vec![
        "idFields".to_string(),
        result.patterns.id_fields.iter().join(", "),
        String::new(),
    ]);
    rows.push(vec![
        "enumFields".to_string(),
        result.patterns.enum_fields.iter().join(", "),
        String::new(),
    ]);
    render_table(&["role", "field", "confidence"], &rows)
}

pub fn render_profile(fields: &BTreeMap<String, FieldStatistics>) -> String {
    let rows: Vec<Vec<String>> = fields
        .values()
        .map(|stats| {
            let types = stats
                .type_distribution
                .iter()
                .map(|(kind, count)| format!("{}:{count}", kind.as_str()))
                .join(" ");
            let range = stats
                .numeric_stats
                .map(|n| format!("{}..{}", n.min, n.max))
                .unwrap_or_default();
            vec![
                stats.path.clone(),
                stats.occurrences.to_string(),
                stats.null_count.to_string(),
                stats.unique_values.to_string(),
                types,
                range,
            ]
        })
        .collect();
    render_table(&["path", "occurrences", "nulls", "unique", "types", "range"], &rows)
}
