//! Quality-measure response normalization
//!
//! Turns the `Parameters` resources returned by `Library/$evaluate` into
//! typed results:
//! - [`normalize_cms138`] / [`normalize_cms69`] classify every named
//!   parameter into population buckets, scalars and evidence lists
//! - [`extract_evidence`] builds display-ready evidence items for the
//!   hospice and palliative-care exclusion libraries
//! - [`ClauseReport`] reads clause-level results from the quality analytics
//!   backend
//!
//! None of these functions fail. A parameter with an unexpected shape
//! degrades to `None` or is dropped; the rest of the bundle is still
//! normalized.

pub mod clauses;
pub mod cms138;
pub mod cms69;
pub mod evidence;
pub mod measure;
pub mod population;
pub mod routing;

pub use clauses::{clean_highlight_html, ClauseOutcome, ClauseReport, ClauseResult};
pub use cms138::{normalize_cms138, Cms138Evidence, Cms138Result};
pub use cms69::{normalize_cms69, BmiNotDoneCategory, Cms69Evidence, Cms69Result, Cms69Route};
pub use evidence::{
    extract_evidence, extract_hospice, extract_palliative_care, EvidenceItem, EvidenceProfile,
    EvidenceReport,
};
pub use measure::{normalize, MeasureKind, NormalizedMeasure};
pub use population::{Criterion, PopulationBuckets};
pub use routing::PopulationRoute;
