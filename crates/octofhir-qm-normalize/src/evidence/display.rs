//! Display helpers for evidence items

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Well-known code systems, matched by substring of the lowercased URI
const SYSTEM_LABELS: &[(&str, &str)] = &[
    ("snomed", "SNOMED"),
    ("loinc", "LOINC"),
    ("icd-10-cm", "ICD-10-CM"),
    ("icd-10-pcs", "ICD-10-PCS"),
    ("rxnorm", "RxNorm"),
    ("ama-assn.org/go/cpt", "CPT"),
    ("hcpcs", "HCPCS"),
    ("2.16.840.1.113883.6.259", "HSLOC"),
    ("v3-actcode", "ActCode"),
];

/// Short label for a code system URI.
///
/// Unknown systems use their last path or URN segment.
pub fn system_abbrev(system: Option<&str>) -> String {
    let Some(system) = system.map(str::trim).filter(|s| !s.is_empty()) else {
        return "Unknown".to_string();
    };
    let lower = system.to_lowercase();
    if let Some((_, label)) = SYSTEM_LABELS.iter().find(|(needle, _)| lower.contains(needle)) {
        return (*label).to_string();
    }
    system
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

/// Human date in UTC, e.g. `Mar 1, 2026`.
///
/// Partial dates keep their precision; unparseable text is returned as is.
pub fn display_date(date: Option<&str>) -> String {
    let Some(raw) = date.map(str::trim).filter(|d| !d.is_empty()) else {
        return "Unknown date".to_string();
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return instant.with_timezone(&Utc).format("%b %-d, %Y").to_string();
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return local.format("%b %-d, %Y").to_string();
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day.format("%b %-d, %Y").to_string();
    }
    if let Ok(month) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        if raw.len() == 7 {
            return month.format("%b %Y").to_string();
        }
    }
    raw.to_string()
}
