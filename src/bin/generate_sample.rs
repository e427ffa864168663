use serde_json::{Value, json};

/// Seeded SplitMix64 stream, so every run writes the same snapshot.
struct Dice(u64);

impl Dice {
    fn roll(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.roll() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform index in `0..n`.
    fn pick(&mut self, n: usize) -> usize {
        (self.roll() % n as u64) as usize
    }

    /// Normal sample (Marsaglia polar method).
    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        loop {
            let u = 2.0 * self.unit() - 1.0;
            let v = 2.0 * self.unit() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                return mean + sd * u * (-2.0 * s.ln() / s).sqrt();
            }
        }
    }
}

/// Historic storms the synthetic events are transposed from:
/// (date, season, lat, lon).
const HISTORIC: [(&str, &str, f64, f64); 6] = [
    ("1985-11-04", "fall", 38.35, -80.10),
    ("1996-01-19", "winter", 37.90, -81.40),
    ("2001-07-08", "summer", 37.45, -81.65),
    ("2003-11-19", "fall", 38.10, -80.75),
    ("2011-04-16", "spring", 37.60, -80.35),
    ("2016-06-23", "summer", 38.30, -80.95),
];

/// WKT in the catalog's (lat lon) order.
fn wkt(lat: f64, lon: f64) -> String {
    format!("POINT ({lat:.4} {lon:.4})")
}

fn storm_item(collection: &str, realization: usize, event: usize, dice: &mut Dice) -> Value {
    let (date, season, lat, lon) = HISTORIC[dice.pick(HISTORIC.len())];
    let sst_lat = lat + dice.normal(0.0, 0.4);
    let sst_lon = lon + dice.normal(0.0, 0.5);
    let precip = dice.normal(6.0, 2.5).max(0.5);
    let block = 1 + dice.pick(500);

    let mut properties = json!({
        "event": format!("E{event:04}"),
        "block_group": block,
        "realization": realization,
        "SST_storm_center": wkt(sst_lat, sst_lon),
        "historic_storm_date": date,
        "historic_storm_center": wkt(lat, lon),
        "historic_storm_season": season,
        "historic_storm_max_precip_inches": (precip * 100.0).round() / 100.0,
    });
    // A few items without precipitation, as in the real catalog.
    if event % 17 == 0 {
        if let Some(obj) = properties.as_object_mut() {
            obj.remove("historic_storm_max_precip_inches");
        }
    }

    json!({
        "type": "Feature",
        "stac_version": "1.0.0",
        "id": format!("R{realization:03}-E{event:04}"),
        "collection": collection,
        "geometry": { "type": "Point", "coordinates": [sst_lon, sst_lat] },
        "properties": properties,
        "links": [],
        "assets": {},
    })
}

fn main() {
    let mut dice = Dice(42);
    let realizations = 1..=3;
    let events_per_realization = 120;

    let mut features = Vec::new();
    for realization in realizations {
        let collection = format!("Kanawha-0505-R{realization:03}");
        for event in 1..=events_per_realization {
            features.push(storm_item(&collection, realization, event, &mut dice));
        }
    }

    let n = features.len();
    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
        "links": [],
    });

    let output_path = "sample_storms.json";
    let text = serde_json::to_string_pretty(&collection).expect("Failed to serialize items");
    std::fs::write(output_path, text).expect("Failed to write output file");

    println!("Wrote {n} storm items to {output_path}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let (mut a, mut b) = (Dice(7), Dice(7));
        let xs: Vec<u64> = (0..5).map(|_| a.roll()).collect();
        let ys: Vec<u64> = (0..5).map(|_| b.roll()).collect();
        assert_eq!(xs, ys);
        assert_ne!(xs[0], xs[1]);
    }

    #[test]
    fn draws_stay_in_range() {
        let mut dice = Dice(1);
        for _ in 0..1000 {
            assert!(dice.pick(6) < 6);
            let u = dice.unit();
            assert!((0.0..1.0).contains(&u));
            assert!(dice.normal(0.0, 1.0).is_finite());
        }
    }

    #[test]
    fn items_use_catalog_point_order() {
        let item = storm_item("c1", 1, 17, &mut Dice(3));
        let center = item["properties"]["historic_storm_center"].as_str().unwrap();
        let lat: f64 = center["POINT (".len()..].split(' ').next().unwrap().parse().unwrap();
        assert!((37.0..39.0).contains(&lat), "{center}");
        assert!(item["properties"].get("historic_storm_max_precip_inches").is_none());
        assert_eq!(item["id"], "R001-E0017");
    }
}
