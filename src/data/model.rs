use std::fmt;

use serde::{Serialize, Serializer};

/// Text used for any record field the catalog item did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// FieldValue – a single cell of a record
// ---------------------------------------------------------------------------

/// A dynamically-typed property value as it arrives from the catalog.
/// Filters keep selections in `BTreeSet`s, so `FieldValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// The `N/A` sentinel: the property was absent (or null) on the item.
    Missing,
}

// -- Manual Eq/Ord so we can put FieldValue in BTreeSet --
// Equality is defined through `cmp` so `==`, set membership and hashing
// agree on floats (`-0.0 != 0.0`, `NaN == NaN`).

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Missing => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Missing, Missing) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for FieldValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Text(s) => s.hash(state),
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Missing => {}
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Missing => write!(f, "{NOT_AVAILABLE}"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Missing => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl FieldValue {
    /// Numeric view used by range and minimum filters. `Missing` and text
    /// are never comparable.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) if !v.is_nan() => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

// ---------------------------------------------------------------------------
// Field – the fixed columns of a record
// ---------------------------------------------------------------------------

/// Column selector for [`Record::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Id,
    Link,
    Event,
    BlockGroup,
    Realization,
    SstStormCenter,
    HistoricStormDate,
    HistoricStormCenter,
    HistoricStormSeason,
    HistoricStormMaxPrecipInches,
}

impl Field {
    /// Name of the catalog item property backing this column, if any.
    pub fn property_key(self) -> Option<&'static str> {
        match self {
            Field::Id | Field::Link => None,
            Field::Event => Some("event"),
            Field::BlockGroup => Some("block_group"),
            Field::Realization => Some("realization"),
            Field::SstStormCenter => Some("SST_storm_center"),
            Field::HistoricStormDate => Some("historic_storm_date"),
            Field::HistoricStormCenter => Some("historic_storm_center"),
            Field::HistoricStormSeason => Some("historic_storm_season"),
            Field::HistoricStormMaxPrecipInches => Some("historic_storm_max_precip_inches"),
        }
    }

    /// Human-readable column header.
    pub fn label(self) -> &'static str {
        match self {
            Field::Id => "ID",
            Field::Link => "Link",
            Field::Event => "Event",
            Field::BlockGroup => "Block",
            Field::Realization => "Realization",
            Field::SstStormCenter => "SST Storm Center",
            Field::HistoricStormDate => "Date",
            Field::HistoricStormCenter => "Historic Storm Center",
            Field::HistoricStormSeason => "Season",
            Field::HistoricStormMaxPrecipInches => "Max Precip (in)",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one flattened catalog item
// ---------------------------------------------------------------------------

/// A single storm event (one catalog item). Absent properties are already
/// [`FieldValue::Missing`] here; nothing downstream substitutes defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    /// Catalog-browser link, `N/A` when the source has no browsable catalog.
    pub link: FieldValue,
    pub event: FieldValue,
    pub block_group: FieldValue,
    pub realization: FieldValue,
    pub sst_storm_center: FieldValue,
    pub historic_storm_date: FieldValue,
    pub historic_storm_center: FieldValue,
    pub historic_storm_season: FieldValue,
    pub historic_storm_max_precip_inches: FieldValue,
}

impl Record {
    /// Value of a column. `Id` is returned as text.
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Id => FieldValue::Text(self.id.clone()),
            Field::Link => self.link.clone(),
            other => self.property(other).cloned().unwrap_or(FieldValue::Missing),
        }
    }

    /// Property-backed columns only; `None` for `Id` and `Link`.
    fn property(&self, field: Field) -> Option<&FieldValue> {
        match field {
            Field::Event => Some(&self.event),
            Field::BlockGroup => Some(&self.block_group),
            Field::Realization => Some(&self.realization),
            Field::SstStormCenter => Some(&self.sst_storm_center),
            Field::HistoricStormDate => Some(&self.historic_storm_date),
            Field::HistoricStormCenter => Some(&self.historic_storm_center),
            Field::HistoricStormSeason => Some(&self.historic_storm_season),
            Field::HistoricStormMaxPrecipInches => Some(&self.historic_storm_max_precip_inches),
            Field::Id | Field::Link => None,
        }
    }

    /// Numeric view of a column, `None` for `N/A` and text.
    pub fn numeric(&self, field: Field) -> Option<f64> {
        self.property(field).and_then(FieldValue::as_f64)
    }
}

// ---------------------------------------------------------------------------
// RecordSet – the result of an extraction or a filter
// ---------------------------------------------------------------------------

/// Records in catalog iteration order. Filters build new sets; they never
/// touch the records of their input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        RecordSet { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Distinct values of a column, in first-seen order.
    pub fn unique_values(&self, field: Field) -> Vec<FieldValue> {
        let mut seen = std::collections::BTreeSet::new();
        self.records
            .iter()
            .map(|r| r.get(field))
            .filter(|v| seen.insert(v.clone()))
            .collect()
    }

    /// `(min, max)` over the numeric values of a column; `N/A` is skipped.
    pub fn numeric_bounds(&self, field: Field) -> Option<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|r| r.numeric(field))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Mean of the numeric values of a column.
    pub fn numeric_mean(&self, field: Field) -> Option<f64> {
        let values: Vec<f64> = self.records.iter().filter_map(|r| r.numeric(field)).collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        RecordSet::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
