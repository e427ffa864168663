use std::collections::BTreeSet;
use std::fmt;

use super::model::{Field, FieldValue, RecordSet};

// ---------------------------------------------------------------------------
// Membership choices
// ---------------------------------------------------------------------------

/// One entry of a multiselect. Picking `All` turns the filter off.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Choice {
    All,
    Value(FieldValue),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("All"),
            Choice::Value(v) => write!(f, "{v}"),
        }
    }
}

impl From<FieldValue> for Choice {
    fn from(v: FieldValue) -> Self {
        Choice::Value(v)
    }
}

impl From<&str> for Choice {
    fn from(s: &str) -> Self {
        Choice::Value(FieldValue::from(s))
    }
}

/// Selected entries of a multiselect.
pub type MembershipSelection = BTreeSet<Choice>;

/// Selection holding only `All`.
pub fn select_all() -> MembershipSelection {
    BTreeSet::from([Choice::All])
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Keep records whose `field` is one of `allowed`. Identity when `allowed`
/// contains [`Choice::All`]; an empty selection keeps nothing.
pub fn filter_by_membership(records: &RecordSet, field: Field, allowed: &MembershipSelection) -> RecordSet {
    if allowed.contains(&Choice::All) {
        return records.clone();
    }
    records
        .iter()
        .filter(|r| allowed.contains(&Choice::Value(r.get(field))))
        .cloned()
        .collect()
}

/// Keep records whose numeric `field` lies in `[lower, upper]`. `N/A` and
/// text never match.
pub fn filter_by_range(records: &RecordSet, field: Field, lower: f64, upper: f64) -> RecordSet {
    records
        .iter()
        .filter(|r| r.numeric(field).is_some_and(|v| v >= lower && v <= upper))
        .cloned()
        .collect()
}

/// Keep records whose numeric `field` is at least `threshold`.
///
/// Identity when every record carries the same value for `field`: a slider
/// over a single value cannot discriminate anything.
pub fn filter_by_minimum(records: &RecordSet, field: Field, threshold: f64) -> RecordSet {
    if is_degenerate(records, field) {
        return records.clone();
    }
    records
        .iter()
        .filter(|r| r.numeric(field).is_some_and(|v| v >= threshold))
        .cloned()
        .collect()
}

/// True when all records share one value for `field` (or there are none).
pub fn is_degenerate(records: &RecordSet, field: Field) -> bool {
    let mut values = records.iter().map(|r| r.get(field));
    match values.next() {
        None => true,
        Some(first) => values.all(|v| v == first),
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Season options offered by the seasonal multiselect.
pub const SEASONS: [&str; 4] = ["spring", "summer", "fall", "winter"];

/// Block range pre-selected when a collection is loaded.
pub const DEFAULT_BLOCK_RANGE: (f64, f64) = (122.0, 255.0);

/// Everything the user has picked in the filter panel.
///
/// Each pipeline stage reads only its own entry here.
#[derive(Debug, Clone, PartialEq)]
pub struct Selections {
    pub realizations: MembershipSelection,
    /// Inclusive block range; `None` leaves the stage out.
    pub block_range: Option<(f64, f64)>,
    /// Ids to keep; empty means "don't filter by id".
    pub search_ids: BTreeSet<String>,
    /// Minimum max-precipitation in inches.
    pub min_precip: Option<f64>,
    pub seasons: MembershipSelection,
    pub dates: MembershipSelection,
}

impl Default for Selections {
    fn default() -> Self {
        Selections {
            realizations: select_all(),
            block_range: None,
            search_ids: BTreeSet::new(),
            min_precip: None,
            seasons: select_all(),
            dates: select_all(),
        }
    }
}

impl Selections {
    /// Initial selections for a freshly loaded collection: the first
    /// realization, blocks 122–255 (clamped to what exists), precipitation at
    /// its mean, every season and date.
    pub fn defaults_for(records: &RecordSet) -> Self {
        let mut sel = Selections::default();

        if let Some(first) = records.unique_values(Field::Realization).into_iter().next() {
            sel.realizations = BTreeSet::from([Choice::Value(first)]);
        }

        let after_realization = filter_by_membership(records, Field::Realization, &sel.realizations);
        sel.block_range = after_realization
            .numeric_bounds(Field::BlockGroup)
            .map(|bounds| clamp_range(DEFAULT_BLOCK_RANGE, bounds));

        let after_block = match sel.block_range {
            Some((lo, hi)) => filter_by_range(&after_realization, Field::BlockGroup, lo, hi),
            None => after_realization,
        };
        sel.min_precip = precip_domain(&after_block).map(|d| d.mean);
        sel
    }
}

/// Clamp `wanted` into `bounds`, keeping `lo <= hi`.
pub fn clamp_range(wanted: (f64, f64), bounds: (f64, f64)) -> (f64, f64) {
    let lo = wanted.0.clamp(bounds.0, bounds.1);
    let hi = wanted.1.clamp(bounds.0, bounds.1);
    (lo.min(hi), hi.max(lo))
}

/// Slider domain for the precipitation stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecipDomain {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Domain of the precipitation slider, or `None` when the stage is skipped
/// (no numeric values, or every record has the same value).
pub fn precip_domain(records: &RecordSet) -> Option<PrecipDomain> {
    let field = Field::HistoricStormMaxPrecipInches;
    if is_degenerate(records, field) {
        return None;
    }
    let (min, max) = records.numeric_bounds(field)?;
    if min == max {
        return None;
    }
    let mean = records.numeric_mean(field)?;
    Some(PrecipDomain { min, max, mean })
}

/// Result of running the pipeline: the filtered records plus the domain each
/// widget should offer, taken at the stage that widget belongs to.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub records: RecordSet,
    /// Realization options (from the full set).
    pub realization_options: Vec<FieldValue>,
    /// Block slider bounds (after the realization stage).
    pub block_bounds: Option<(f64, f64)>,
    /// Id options (after the block stage).
    pub id_options: Vec<String>,
    /// Precipitation slider domain (after the id stage).
    pub precip: Option<PrecipDomain>,
    /// Date options (after the season stage).
    pub date_options: Vec<FieldValue>,
}

/// Apply every stage in the fixed order: realization, block range, id,
/// minimum precipitation, season, date. Later slider domains depend on the
/// earlier stages, so the order is part of the result.
pub fn run_pipeline(records: &RecordSet, sel: &Selections) -> PipelineOutput {
    let realization_options = records.unique_values(Field::Realization);
    let mut set = filter_by_membership(records, Field::Realization, &sel.realizations);

    let block_bounds = set.numeric_bounds(Field::BlockGroup);
    if let Some((lo, hi)) = sel.block_range {
        set = filter_by_range(&set, Field::BlockGroup, lo, hi);
    }

    let id_options: Vec<String> = set.iter().map(|r| r.id.clone()).collect();
    if !sel.search_ids.is_empty() {
        set = set
            .iter()
            .filter(|r| sel.search_ids.contains(&r.id))
            .cloned()
            .collect();
    }

    let precip = precip_domain(&set);
    if let (Some(_), Some(threshold)) = (precip, sel.min_precip) {
        set = filter_by_minimum(&set, Field::HistoricStormMaxPrecipInches, threshold);
    }

    set = filter_by_membership(&set, Field::HistoricStormSeason, &sel.seasons);

    let date_options = set.unique_values(Field::HistoricStormDate);
    set = filter_by_membership(&set, Field::HistoricStormDate, &sel.dates);

    PipelineOutput {
        records: set,
        realization_options,
        block_bounds,
        id_options,
        precip,
        date_options,
    }
}
