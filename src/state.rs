use std::collections::BTreeSet;

use log::{error, info, warn};

use crate::config::{Config, Source};
use crate::data::error::CatalogError;
use crate::data::extract::fetch_collection_data;
use crate::data::filter::{
    Choice, MembershipSelection, PipelineOutput, Selections, clamp_range, run_pipeline, select_all,
};
use crate::data::model::RecordSet;
use crate::heatmap::{CenterKind, Centers, HeatGrid, bin_points, storm_centers};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Heatmap input for one storm-center kind.
#[derive(Debug, Clone, Default)]
pub struct HeatLayer {
    pub grid: HeatGrid,
    pub points: usize,
    pub skipped: usize,
}

impl HeatLayer {
    fn build(records: &RecordSet, kind: CenterKind, cell_size: f64) -> Self {
        let Centers { points, skipped } = storm_centers(records, kind);
        HeatLayer {
            grid: bin_points(&points, cell_size),
            points: points.len(),
            skipped,
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where items come from (None if the configuration was unusable).
    pub source: Option<Source>,

    /// Collection id typed in the top bar.
    pub collection_input: String,

    /// Collection the current records were fetched from.
    pub collection: Option<String>,

    /// Records of the last successful fetch.
    pub records: RecordSet,

    /// Current widget selections.
    pub selections: Selections,

    /// Pipeline result for `selections` (cached).
    pub output: PipelineOutput,

    pub historic: HeatLayer,
    pub sst: HeatLayer,

    /// Watershed outline rings drawn on both maps.
    pub outline: Vec<Vec<[f64; 2]>>,

    /// Heatmap cell size in degrees.
    pub cell_size: f64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            source: None,
            collection_input: String::new(),
            collection: None,
            records: RecordSet::default(),
            selections: Selections::default(),
            output: PipelineOutput::default(),
            historic: HeatLayer::default(),
            sst: HeatLayer::default(),
            outline: Vec::new(),
            cell_size: 0.25,
            status_message: None,
        }
    }
}

impl AppState {
    /// Build the state from the configuration; fetches the startup collection
    /// and the outline item when they are configured.
    pub fn from_config(config: &Config) -> Self {
        let mut state = AppState {
            cell_size: config.cell_size,
            collection_input: config.collection.clone().unwrap_or_default(),
            ..AppState::default()
        };

        match config.source() {
            Ok(source) => state.source = Some(source),
            Err(e) => {
                error!("{e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                return state;
            }
        }

        if let (Some(Source::Http(catalog)), Some(item_ref)) = (&state.source, &config.outline_item) {
            match catalog.fetch_item_geometry(&item_ref.collection, &item_ref.item) {
                Ok(rings) => state.outline = rings,
                Err(e) => warn!("outline {}/{}: {e}", item_ref.collection, item_ref.item),
            }
        }

        if config.collection.is_some() {
            state.fetch();
        }
        state
    }

    /// Replace the source, e.g. after opening a snapshot file.
    pub fn set_source(&mut self, source: Source) {
        self.source = Some(source);
        self.outline.clear();
        self.status_message = None;
    }

    /// Fetch `collection_input` from the current source. On failure the
    /// previous records stay in place.
    pub fn fetch(&mut self) {
        let collection = self.collection_input.trim().to_string();
        let Some(source) = &self.source else {
            self.status_message = Some("No catalog configured".into());
            return;
        };

        // The fetch blocks the UI thread, so progress only goes to the log.
        let result = fetch_collection_data(source.client(), &collection, &mut |p: f64| {
            log::debug!("fetch progress {:.0}%", p * 100.0);
        });

        match result {
            Ok(records) => {
                info!("Loaded {} records from {collection}", records.len());
                self.set_records(collection, records);
            }
            Err(e) => self.report_fetch_error(&collection, e),
        }
    }

    fn report_fetch_error(&mut self, collection: &str, err: CatalogError) {
        error!("Failed to fetch {collection}: {err}");
        self.status_message = Some(format!("Error: {err}"));
    }

    /// Ingest a freshly fetched record set and reset the filters.
    pub fn set_records(&mut self, collection: String, records: RecordSet) {
        self.selections = Selections::defaults_for(&records);
        self.records = records;
        self.collection = Some(collection);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the pipeline output and heatmaps after a selection change.
    pub fn refilter(&mut self) {
        self.output = run_pipeline(&self.records, &self.selections);
        while self.settle_selections() {
            self.output = run_pipeline(&self.records, &self.selections);
        }
        self.historic = HeatLayer::build(&self.output.records, CenterKind::Historic, self.cell_size);
        self.sst = HeatLayer::build(&self.output.records, CenterKind::Sst, self.cell_size);
    }

    /// Move selections that fell outside the domains of the last run back
    /// inside them, so the sliders show what was filtered. Returns whether
    /// the pipeline has to run again.
    ///
    /// Block bounds only depend on the realization stage, so one clamp is
    /// final. A threshold is filled in only after the blocks have settled.
    fn settle_selections(&mut self) -> bool {
        let sel = &mut self.selections;
        if let (Some(bounds), Some(range)) = (self.output.block_bounds, sel.block_range) {
            let clamped = clamp_range(range, bounds);
            if clamped != range {
                sel.block_range = Some(clamped);
                return true;
            }
        }
        if let Some(domain) = self.output.precip {
            let threshold = sel
                .min_precip
                .map_or(domain.mean, |t| t.clamp(domain.min, domain.max));
            if sel.min_precip != Some(threshold) {
                sel.min_precip = Some(threshold);
                return true;
            }
        }
        false
    }

    pub fn layer(&self, kind: CenterKind) -> &HeatLayer {
        match kind {
            CenterKind::Historic => &self.historic,
            CenterKind::Sst => &self.sst,
        }
    }

    /// Toggle one entry of a multiselect. Picking a concrete value drops
    /// `All`; picking `All` clears the concrete values.
    pub fn toggle_choice(selection: &mut MembershipSelection, choice: Choice) {
        if selection.contains(&choice) {
            selection.remove(&choice);
        } else if choice == Choice::All {
            *selection = select_all();
        } else {
            selection.remove(&Choice::All);
            selection.insert(choice);
        }
    }

    /// Toggle an id in the id search.
    pub fn toggle_search_id(ids: &mut BTreeSet<String>, id: &str) {
        if !ids.remove(id) {
            ids.insert(id.to_string());
        }
    }
}
