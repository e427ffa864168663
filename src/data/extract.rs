use log::{debug, info};
use serde_json::Value as JsonValue;

use super::catalog::{CatalogClient, CatalogItem};
use super::error::CatalogError;
use super::model::{Field, FieldValue, Record, RecordSet};

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Receives `processed / total` after each converted item.
pub trait ProgressSink {
    fn report(&mut self, fraction: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, fraction: f64) {
        self(fraction)
    }
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// Link to an item in the Radiant Earth STAC browser. Plain concatenation:
/// the browser expects the catalog URL exactly as configured.
pub fn generate_stac_item_link(base_url: &str, collection_id: &str, item_id: &str) -> String {
    format!(
        "https://radiantearth.github.io/stac-browser/#/external/{base_url}/collections/{collection_id}/items/{item_id}"
    )
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Fetch every item of `collection_id` and flatten it into a [`Record`].
///
/// All pages are fetched and decoded before the first record is built, so a
/// failure never leaves a partial result. Progress is reported once per item
/// and ends at exactly `1.0`; an empty collection reports nothing.
pub fn fetch_collection_data(
    catalog: &dyn CatalogClient,
    collection_id: &str,
    progress: &mut dyn ProgressSink,
) -> Result<RecordSet, CatalogError> {
    if collection_id.trim().is_empty() {
        return Err(CatalogError::unavailable("empty collection id"));
    }

    let items = catalog.search_collection(collection_id)?;
    let total = items.len();
    debug!("{total} items in collection {collection_id}");

    let mut records = Vec::with_capacity(total);
    for (idx, item) in items.iter().enumerate() {
        records.push(item_to_record(catalog.base_url(), collection_id, item));
        progress.report((idx + 1) as f64 / total as f64);
    }

    info!("Extracted {total} records from {collection_id}");
    Ok(RecordSet::new(records))
}

/// Flatten one item. Absent or null properties become [`FieldValue::Missing`].
/// Without a `base_url` the link is `N/A`.
pub fn item_to_record(base_url: Option<&str>, collection_id: &str, item: &CatalogItem) -> Record {
    let prop = |field: Field| {
        field
            .property_key()
            .and_then(|key| item.properties.get(key))
            .map(json_to_field)
            .unwrap_or(FieldValue::Missing)
    };

    Record {
        id: item.id.clone(),
        link: base_url
            .map(|base| FieldValue::Text(generate_stac_item_link(base, collection_id, &item.id)))
            .unwrap_or(FieldValue::Missing),
        event: prop(Field::Event),
        block_group: prop(Field::BlockGroup),
        realization: prop(Field::Realization),
        sst_storm_center: prop(Field::SstStormCenter),
        historic_storm_date: prop(Field::HistoricStormDate),
        historic_storm_center: prop(Field::HistoricStormCenter),
        historic_storm_season: prop(Field::HistoricStormSeason),
        historic_storm_max_precip_inches: prop(Field::HistoricStormMaxPrecipInches),
    }
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Missing,
        other => FieldValue::Text(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::{Map, json};

    use super::*;

    /// In-memory catalog returning a fixed item list.
    pub(crate) struct StubCatalog {
        pub items: Result<Vec<CatalogItem>, fn() -> CatalogError>,
    }

    impl StubCatalog {
        pub(crate) fn with_items(items: Vec<CatalogItem>) -> Self {
            StubCatalog { items: Ok(items) }
        }
    }

    impl CatalogClient for StubCatalog {
        fn base_url(&self) -> Option<&str> {
            Some("https://stac.example")
        }

        fn search_collection(&self, _: &str) -> Result<Vec<CatalogItem>, CatalogError> {
            match &self.items {
                Ok(items) => Ok(items.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    pub(crate) fn item(id: &str, properties: JsonValue) -> CatalogItem {
        let properties: Map<String, JsonValue> = match properties {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };
        CatalogItem {
            id: id.to_string(),
            properties,
        }
    }

    #[test]
    fn link_matches_browser_format() {
        assert_eq!(
            generate_stac_item_link("x", "c1", "i1"),
            "https://radiantearth.github.io/stac-browser/#/external/x/collections/c1/items/i1"
        );
    }

    #[test]
    fn link_is_not_encoded() {
        assert_eq!(
            generate_stac_item_link("https://stac.example/api", "Kanawha-0505-R001", "R001-E2044"),
            "https://radiantearth.github.io/stac-browser/#/external/https://stac.example/api/collections/Kanawha-0505-R001/items/R001-E2044"
        );
    }

    #[test]
    fn absent_properties_become_not_available() {
        let catalog = StubCatalog::with_items(vec![item("a", json!({ "block_group": 12 }))]);
        let set = fetch_collection_data(&catalog, "c1", &mut |_: f64| {}).unwrap();

        let r = &set.records[0];
        assert_eq!(r.event, FieldValue::Missing);
        assert_eq!(r.event.to_string(), "N/A");
        assert_eq!(r.block_group, FieldValue::Integer(12));
        assert_eq!(r.historic_storm_max_precip_inches, FieldValue::Missing);
    }

    #[test]
    fn null_properties_become_not_available() {
        let record = item_to_record(Some("b"), "c", &item("a", json!({ "event": null, "realization": "R1" })));
        assert_eq!(record.event, FieldValue::Missing);
        assert_eq!(record.realization, FieldValue::from("R1"));
    }

    #[test]
    fn maps_every_property_key() {
        let record = item_to_record(
            Some("https://stac.example"),
            "c1",
            &item(
                "R001-E7",
                json!({
                    "event": "E7",
                    "block_group": 130,
                    "realization": 1,
                    "SST_storm_center": "POINT (37.7 -80.9)",
                    "historic_storm_date": "1996-01-19",
                    "historic_storm_center": "POINT (38.0 -81.1)",
                    "historic_storm_season": "winter",
                    "historic_storm_max_precip_inches": 4.25
                }),
            ),
        );

        assert_eq!(record.id, "R001-E7");
        assert_eq!(
            record.link,
            FieldValue::Text(generate_stac_item_link("https://stac.example", "c1", "R001-E7"))
        );
        assert_eq!(record.sst_storm_center, FieldValue::from("POINT (37.7 -80.9)"));
        assert_eq!(record.historic_storm_center, FieldValue::from("POINT (38.0 -81.1)"));
        assert_eq!(record.historic_storm_date, FieldValue::from("1996-01-19"));
        assert_eq!(record.historic_storm_season, FieldValue::from("winter"));
        assert_eq!(record.historic_storm_max_precip_inches, FieldValue::Float(4.25));
        assert_eq!(record.realization, FieldValue::Integer(1));
    }

    #[test]
    fn link_keeps_trailing_slash_of_base() {
        let record = item_to_record(Some("https://stac.example/"), "c1", &item("i1", json!({})));
        assert_eq!(
            record.link.to_string(),
            "https://radiantearth.github.io/stac-browser/#/external/https://stac.example//collections/c1/items/i1"
        );
    }

    #[test]
    fn no_base_url_means_no_link() {
        let record = item_to_record(None, "c1", &item("i1", json!({})));
        assert_eq!(record.link, FieldValue::Missing);
        assert_eq!(record.get(Field::Link).to_string(), "N/A");
    }

    #[test]
    fn progress_is_exact_and_increasing() {
        for n in [1usize, 3, 7, 10] {
            let items = (0..n).map(|i| item(&format!("i{i}"), json!({}))).collect();
            let catalog = StubCatalog::with_items(items);
            let mut seen = Vec::new();
            let set = fetch_collection_data(&catalog, "c1", &mut |p: f64| seen.push(p)).unwrap();

            assert_eq!(set.len(), n);
            let expected: Vec<f64> = (1..=n).map(|k| k as f64 / n as f64).collect();
            assert_eq!(seen, expected);
            assert_eq!(*seen.last().unwrap(), 1.0);
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn empty_collection_is_not_an_error() {
        let catalog = StubCatalog::with_items(Vec::new());
        let mut calls = 0;
        let set = fetch_collection_data(&catalog, "c1", &mut |_: f64| calls += 1).unwrap();
        assert!(set.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn catalog_failure_is_surfaced_without_progress() {
        let catalog = StubCatalog {
            items: Err(|| CatalogError::unavailable("connection refused")),
        };
        let mut calls = 0;
        let err = fetch_collection_data(&catalog, "c1", &mut |_: f64| calls += 1).unwrap_err();
        assert!(matches!(err, CatalogError::CatalogUnavailable { .. }));
        assert_eq!(calls, 0);
    }

    #[test]
    fn blank_collection_id_is_rejected() {
        let catalog = StubCatalog::with_items(vec![item("a", json!({}))]);
        assert!(fetch_collection_data(&catalog, "  ", &mut |_: f64| {}).is_err());
    }

    #[test]
    fn keeps_catalog_order() {
        let catalog = StubCatalog::with_items(vec![
            item("z", json!({})),
            item("a", json!({})),
            item("m", json!({})),
        ]);
        let set = fetch_collection_data(&catalog, "c1", &mut |_: f64| {}).unwrap();
        let ids: Vec<&str> = set.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
