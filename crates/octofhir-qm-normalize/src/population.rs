//! Population buckets shared by every measure normalizer

use indexmap::IndexMap;
use octofhir_qm_types::{DecodedValue, NamedValue, Parameters};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::routing::PopulationRoute;

/// A population value after `null`/empty-list collapsing.
///
/// Serializes as the bare JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Criterion {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl Criterion {
    /// Collapse a decoded value; `null`, empty list and resources give `None`
    pub fn collapse(value: &DecodedValue) -> Option<Self> {
        match value {
            DecodedValue::Boolean(b) => Some(Self::Boolean(*b)),
            DecodedValue::Integer(i) => Some(Self::Integer(*i)),
            DecodedValue::String(s) => Some(Self::String(s.clone())),
            DecodedValue::Null | DecodedValue::EmptyList | DecodedValue::Resource(_) => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

/// Population results common to all measures.
///
/// Named mappings are keyed by the literal CQL statement name in bundle
/// order; a repeated name overwrites the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationBuckets {
    pub initial_population: Option<bool>,
    pub ecqm_exclusion_reason: Option<String>,
    /// Banner text, or `false` when absent
    #[serde(serialize_with = "string_or_false")]
    pub all_goals_met: Option<String>,
    pub specific_actions: Vec<String>,
    pub denominators: IndexMap<String, Option<Criterion>>,
    pub numerators: IndexMap<String, Option<Criterion>>,
    pub exclusions: IndexMap<String, Option<Criterion>>,
    pub patient_scores: IndexMap<String, Option<i64>>,
    /// Informative parameters no rule claimed
    pub other_parameters: Vec<NamedValue>,
    /// Every parameter as decoded, in bundle order
    pub all_parameters: Vec<NamedValue>,
}

impl PopulationBuckets {
    /// Store one non-resource value under its route.
    ///
    /// Routes that only accept strings hand anything else to the audit
    /// bucket instead.
    pub fn record(&mut self, route: PopulationRoute, name: &str, value: &DecodedValue) {
        match route {
            PopulationRoute::InitialPopulation => {
                self.initial_population = value.as_boolean();
            }
            PopulationRoute::EcqmExclusionReason => {
                self.ecqm_exclusion_reason = value.as_str().map(str::to_string);
            }
            PopulationRoute::SpecificAction => match value.as_str() {
                Some(text) => self.specific_actions.push(text.to_string()),
                None => self.record_other(name, value),
            },
            PopulationRoute::Exclusion => {
                self.exclusions.insert(name.to_string(), Criterion::collapse(value));
            }
            PopulationRoute::Denominator => {
                self.denominators.insert(name.to_string(), Criterion::collapse(value));
            }
            PopulationRoute::Numerator => {
                self.numerators.insert(name.to_string(), Criterion::collapse(value));
            }
            PopulationRoute::PatientScore => {
                self.patient_scores.insert(name.to_string(), value.as_integer());
            }
            PopulationRoute::AllGoalsMet => match value.as_str() {
                Some(text) => self.all_goals_met = Some(text.to_string()),
                None => self.record_other(name, value),
            },
            PopulationRoute::Unrecognized => self.record_other(name, value),
        }
    }

    /// Audit bucket; `null` and empty-list values carry nothing and are skipped
    pub fn record_other(&mut self, name: &str, value: &DecodedValue) {
        if value.is_absent() {
            return;
        }
        log::debug!("parameter '{}' is not modeled, keeping it for audit", name);
        self.other_parameters.push(NamedValue::new(name, value.clone()));
    }

    /// True when any patient score is exactly 0: the patient qualifies for
    /// the numerator action but none was documented
    pub fn any_score_is_zero(&self) -> bool {
        self.patient_scores.values().any(|score| *score == Some(0))
    }

    pub fn denominator(&self, name: &str) -> Option<bool> {
        self.denominators.get(name)?.as_ref()?.as_boolean()
    }

    pub fn numerator(&self, name: &str) -> Option<bool> {
        self.numerators.get(name)?.as_ref()?.as_boolean()
    }

    pub fn exclusion(&self, name: &str) -> Option<bool> {
        self.exclusions.get(name)?.as_ref()?.as_boolean()
    }

    pub fn patient_score(&self, name: &str) -> Option<i64> {
        self.patient_scores.get(name).copied().flatten()
    }
}

/// Measure-specific hooks driven by [`run`]
pub(crate) trait MeasureTable {
    fn buckets_mut(&mut self) -> &mut PopulationBuckets;

    /// Append any resources under an evidence statement. Does not consume
    /// the parameter.
    fn collect_evidence(&mut self, name: &str, value: &DecodedValue);

    /// Measure-specific scalars. Returns `true` when the parameter was
    /// claimed and must not reach the shared population routes.
    fn record_specific(&mut self, _name: &str, _value: &DecodedValue) -> bool {
        false
    }
}

/// Single pass over a bundle in order
pub(crate) fn run<T: MeasureTable>(table: &mut T, params: &Parameters) {
    for param in params {
        let value = param.decode();
        table
            .buckets_mut()
            .all_parameters
            .push(NamedValue::new(&param.name, value.clone()));

        table.collect_evidence(&param.name, &value);
        if value.is_resource() {
            continue;
        }
        if table.record_specific(&param.name, &value) {
            continue;
        }
        let route = PopulationRoute::classify(&param.name);
        table.buckets_mut().record(route, &param.name, &value);
    }
}

/// Append every resource carried by `value` to `sink`
pub(crate) fn extend_resources(sink: &mut Vec<Value>, value: &DecodedValue) {
    sink.extend(value.resources().into_iter().cloned());
}

fn string_or_false<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(text) => serializer.serialize_str(text),
        None => serializer.serialize_bool(false),
    }
}
