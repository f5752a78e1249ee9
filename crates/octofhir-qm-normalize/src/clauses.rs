//! Clause-level results from the quality analytics backend
//!
//! The backend answers `POST /measures/{id}/evaluate` with
//! `results[0].detailedResults[0]` holding `clauseResults` and an escaped
//! `html` highlighting string. Missing paths read as empty.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Final outcome of one ELM clause
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClauseOutcome {
    True,
    False,
    NotApplicable,
    Unhit,
    Other(String),
}

impl ClauseOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::NotApplicable => "NA",
            Self::Unhit => "UNHIT",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for ClauseOutcome {
    fn from(value: String) -> Self {
        match value.as_str() {
            "TRUE" => Self::True,
            "FALSE" => Self::False,
            "NA" => Self::NotApplicable,
            "UNHIT" => Self::Unhit,
            _ => Self::Other(value),
        }
    }
}

impl From<ClauseOutcome> for String {
    fn from(value: ClauseOutcome) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ClauseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clause result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseResult {
    pub library_name: Option<String>,
    pub statement_name: Option<String>,
    pub local_id: String,
    #[serde(rename = "final")]
    pub outcome: ClauseOutcome,
    pub raw: Value,
}

impl ClauseResult {
    /// Lenient read; entries without a `localId` are skipped by the caller
    fn from_value(value: &Value) -> Option<Self> {
        let local_id = match value.get("localId")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            library_name: text("libraryName"),
            statement_name: text("statementName"),
            local_id,
            outcome: ClauseOutcome::from(text("final").unwrap_or_else(|| "NA".to_string())),
            raw: value.get("raw").cloned().unwrap_or(Value::Null),
        })
    }
}

/// Clause results and highlighting for one patient
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseReport {
    pub clause_results: Vec<ClauseResult>,
    /// Highlighting HTML as received (still escaped)
    pub html: Option<String>,
    /// Compiled measure logic, handed through for interpretation elsewhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elm_definition: Option<Value>,
}

impl ClauseReport {
    pub fn from_response(response: &Value) -> Self {
        let detailed = response.pointer("/results/0/detailedResults/0");
        let clause_results = detailed
            .and_then(|d| d.get("clauseResults"))
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(ClauseResult::from_value).collect())
            .unwrap_or_default();
        let html = detailed
            .and_then(|d| d.get("html"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let elm_definition = response
            .get("elmDefinition")
            .or_else(|| response.pointer("/results/0/elmDefinition"))
            .filter(|v| !v.is_null())
            .cloned();

        Self {
            clause_results,
            html,
            elm_definition,
        }
    }

    /// Highlighting HTML ready to render
    pub fn cleaned_html(&self) -> Option<String> {
        self.html.as_deref().map(clean_highlight_html)
    }

    /// Clause results grouped by statement name, in first-seen order
    pub fn by_statement(&self) -> IndexMap<&str, Vec<&ClauseResult>> {
        let mut groups: IndexMap<&str, Vec<&ClauseResult>> = IndexMap::new();
        for clause in &self.clause_results {
            let name = clause.statement_name.as_deref().unwrap_or("(unnamed)");
            groups.entry(name).or_default().push(clause);
        }
        groups
    }

    /// One outcome per statement: `TRUE` if any clause was true, else
    /// `FALSE` if any was false, else `NA`, else `UNHIT`
    pub fn statement_outcomes(&self) -> IndexMap<&str, ClauseOutcome> {
        self.by_statement()
            .into_iter()
            .map(|(name, clauses)| {
                let has = |o: ClauseOutcome| clauses.iter().any(|c| c.outcome == o);
                let outcome = if has(ClauseOutcome::True) {
                    ClauseOutcome::True
                } else if has(ClauseOutcome::False) {
                    ClauseOutcome::False
                } else if has(ClauseOutcome::NotApplicable) {
                    ClauseOutcome::NotApplicable
                } else {
                    ClauseOutcome::Unhit
                };
                (name, outcome)
            })
            .collect()
    }

    pub fn count(&self, outcome: &ClauseOutcome) -> usize {
        self.clause_results
            .iter()
            .filter(|c| &c.outcome == outcome)
            .count()
    }
}

/// Undo the escaping applied to highlighting HTML in transit.
///
/// Strips one pair of surrounding double quotes, resolves backslash escapes
/// (`\n`, `\t`, `\"`, `\/`, `\\`) and decodes the basic HTML entities,
/// `&amp;` last so that `&amp;lt;` becomes `&lt;`.
pub fn clean_highlight_html(html: &str) -> String {
    let trimmed = html.trim();
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => {}
            Some('"') => out.push('"'),
            Some('/') => out.push('/'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
