//! Name-based routing of population parameters
//!
//! Every measure shares the same population vocabulary (Initial Population,
//! Denominator, Numerator, Patient Score, ...). [`PopulationRoute::classify`]
//! maps a CQL statement name to exactly one bucket. The rules are checked in
//! the order of the variants below; the first match wins.
//!
//! | route | rule |
//! |---|---|
//! | `InitialPopulation` | exactly `Initial Population` |
//! | `EcqmExclusionReason` | exactly `eCQM Initial Population Exclusion Reason` |
//! | `SpecificAction` | `Patient Score ... is 0` action text |
//! | `Exclusion` | starts with `Denominator`, has a word `Exclusion`/`Exclusions` |
//! | `Denominator` | starts with `Denominator` |
//! | `Numerator` | starts with `Numerator` |
//! | `PatientScore` | starts with `Patient Score` |
//! | `AllGoalsMet` | exactly `All Goals Met` |
//! | `Unrecognized` | anything else; kept for audit only |

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const INITIAL_POPULATION: &str = "Initial Population";
pub const ECQM_EXCLUSION_REASON: &str = "eCQM Initial Population Exclusion Reason";
pub const ALL_GOALS_MET: &str = "All Goals Met";

static SPECIFIC_ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^patient score\b.*\bis 0\b").expect("static pattern is valid")
});

/// The population bucket a parameter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PopulationRoute {
    InitialPopulation,
    EcqmExclusionReason,
    SpecificAction,
    Exclusion,
    Denominator,
    Numerator,
    PatientScore,
    AllGoalsMet,
    Unrecognized,
}

impl PopulationRoute {
    /// Classify a CQL statement name
    pub fn classify(name: &str) -> Self {
        if name == INITIAL_POPULATION {
            return Self::InitialPopulation;
        }
        if name == ECQM_EXCLUSION_REASON {
            return Self::EcqmExclusionReason;
        }
        if SPECIFIC_ACTION.is_match(name) {
            return Self::SpecificAction;
        }
        if name.starts_with("Denominator") {
            if name
                .split_whitespace()
                .any(|word| word == "Exclusion" || word == "Exclusions")
            {
                return Self::Exclusion;
            }
            return Self::Denominator;
        }
        if name.starts_with("Numerator") {
            return Self::Numerator;
        }
        if name.starts_with("Patient Score") {
            return Self::PatientScore;
        }
        if name == ALL_GOALS_MET {
            return Self::AllGoalsMet;
        }
        Self::Unrecognized
    }

    /// Routes whose values go into a named mapping keyed by the statement name
    pub fn is_named_mapping(&self) -> bool {
        matches!(
            self,
            Self::Exclusion | Self::Denominator | Self::Numerator | Self::PatientScore
        )
    }
}
