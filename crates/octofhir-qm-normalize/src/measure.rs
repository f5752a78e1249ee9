//! Measure dispatch

use octofhir_qm_diagnostics::{QmError, Result, QM0003};
use octofhir_qm_types::Parameters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cms138::{normalize_cms138, Cms138Result};
use crate::cms69::{normalize_cms69, Cms69Result};
use crate::evidence::{extract_hospice, extract_palliative_care, EvidenceReport};

/// Libraries with a known normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasureKind {
    Cms138,
    Cms69,
    Hospice,
    PalliativeCare,
}

impl MeasureKind {
    pub const fn all() -> [Self; 4] {
        [Self::Cms138, Self::Cms69, Self::Hospice, Self::PalliativeCare]
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cms138 => "cms138",
            Self::Cms69 => "cms69",
            Self::Hospice => "hospice",
            Self::PalliativeCare => "palliative-care",
        }
    }
}

impl FromStr for MeasureKind {
    type Err = QmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cms138" => Ok(Self::Cms138),
            "cms69" => Ok(Self::Cms69),
            "hospice" => Ok(Self::Hospice),
            "palliative" | "palliative-care" | "palliativecare" => Ok(Self::PalliativeCare),
            _ => Err(QmError::input(
                QM0003,
                format!(
                    "Unknown measure '{}'. Expected one of: cms138, cms69, hospice, palliative-care",
                    s
                ),
            )),
        }
    }
}

impl fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized result of any supported library
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "measure", content = "result", rename_all = "kebab-case")]
pub enum NormalizedMeasure {
    Cms138(Cms138Result),
    Cms69(Cms69Result),
    Hospice(EvidenceReport),
    PalliativeCare(EvidenceReport),
}

impl NormalizedMeasure {
    pub fn kind(&self) -> MeasureKind {
        match self {
            Self::Cms138(_) => MeasureKind::Cms138,
            Self::Cms69(_) => MeasureKind::Cms69,
            Self::Hospice(_) => MeasureKind::Hospice,
            Self::PalliativeCare(_) => MeasureKind::PalliativeCare,
        }
    }

    /// Practitioner alert for scored measures, `None` for exclusion libraries
    pub fn practitioner_alert(&self) -> Option<bool> {
        match self {
            Self::Cms138(r) => Some(r.practitioner_alert),
            Self::Cms69(r) => Some(r.practitioner_alert),
            Self::Hospice(_) | Self::PalliativeCare(_) => None,
        }
    }
}

pub fn normalize(kind: MeasureKind, params: &Parameters) -> NormalizedMeasure {
    match kind {
        MeasureKind::Cms138 => NormalizedMeasure::Cms138(normalize_cms138(params)),
        MeasureKind::Cms69 => NormalizedMeasure::Cms69(normalize_cms69(params)),
        MeasureKind::Hospice => NormalizedMeasure::Hospice(extract_hospice(params)),
        MeasureKind::PalliativeCare => {
            NormalizedMeasure::PalliativeCare(extract_palliative_care(params))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_qm_types::Parameter;
    use rstest::rstest;

    #[rstest]
    #[case("cms138", MeasureKind::Cms138)]
    #[case("CMS69", MeasureKind::Cms69)]
    #[case(" Hospice ", MeasureKind::Hospice)]
    #[case("palliative", MeasureKind::PalliativeCare)]
    #[case("palliative-care", MeasureKind::PalliativeCare)]
    fn test_parse_kind(#[case] input: &str, #[case] expected: MeasureKind) {
        assert_eq!(input.parse::<MeasureKind>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_kind() {
        let err = "cms122".parse::<MeasureKind>().unwrap_err();
        assert_eq!(err.code(), QM0003);
    }

    #[test]
    fn test_display_round_trip() {
        for kind in MeasureKind::all() {
            assert_eq!(kind.to_string().parse::<MeasureKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_dispatch_and_alert() {
        let params: Parameters = [Parameter::named("Patient Score").with_integer(0)]
            .into_iter()
            .collect();
        let cms69 = normalize(MeasureKind::Cms69, &params);
        assert_eq!(cms69.kind(), MeasureKind::Cms69);
        assert_eq!(cms69.practitioner_alert(), Some(true));

        let hospice = normalize(MeasureKind::Hospice, &params);
        assert_eq!(hospice.practitioner_alert(), None);
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(normalize(MeasureKind::PalliativeCare, &Parameters::default()))
            .unwrap();
        assert_eq!(json["measure"], "palliative-care");
        assert_eq!(json["result"]["hasPalliativeCare"], false);
    }
}
