use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::data::catalog::{CatalogClient, FileCatalog, HttpCatalog};

/// Command-line flags. Every flag can also come from the environment or a
/// `.env` file next to the binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "storm-viewer", version, about = "Explore STAC storm-event catalogs")]
pub struct Config {
    /// Root URL of the STAC API.
    #[arg(long, env = "STAC_API_URL")]
    pub stac_url: Option<String>,

    /// Collection fetched at startup.
    #[arg(long, env = "STAC_COLLECTION")]
    pub collection: Option<String>,

    /// Read items from a saved ItemCollection instead of the API.
    #[arg(long, env = "STAC_SNAPSHOT", conflicts_with = "stac_url")]
    pub snapshot: Option<PathBuf>,

    /// Item whose geometry is outlined on both maps, as `<collection>/<item>`.
    #[arg(long, env = "STAC_OUTLINE_ITEM", value_parser = parse_item_ref)]
    pub outline_item: Option<ItemRef>,

    /// Items requested per search page.
    #[arg(long, default_value_t = 100)]
    pub page_size: usize,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Heatmap cell size in degrees.
    #[arg(long, default_value_t = 0.25)]
    pub cell_size: f64,
}

/// `<collection>/<item>` pair naming one catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub collection: String,
    pub item: String,
}

fn parse_item_ref(s: &str) -> Result<ItemRef, String> {
    match s.split_once('/') {
        Some((c, i)) if !c.is_empty() && !i.is_empty() && !i.contains('/') => Ok(ItemRef {
            collection: c.to_string(),
            item: i.to_string(),
        }),
        _ => Err(format!("expected <collection>/<item>, got {s:?}")),
    }
}

/// The catalog the viewer reads from.
pub enum Source {
    Http(HttpCatalog),
    File(FileCatalog),
}

impl Source {
    pub fn client(&self) -> &dyn CatalogClient {
        match self {
            Source::Http(c) => c,
            Source::File(c) => c,
        }
    }
}

impl Config {
    /// Load `.env` (if any) and parse flags.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Config::parse()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the configured catalog source.
    pub fn source(&self) -> Result<Source> {
        if self.cell_size.is_nan() || self.cell_size <= 0.0 {
            bail!("--cell-size must be positive, got {}", self.cell_size);
        }
        match (&self.snapshot, &self.stac_url) {
            (Some(path), _) => Ok(Source::File(FileCatalog::new(path))),
            (None, Some(url)) => {
                let catalog = HttpCatalog::new(url, self.page_size, self.timeout())
                    .with_context(|| format!("creating STAC client for {url}"))?;
                Ok(Source::Http(catalog))
            }
            (None, None) => bail!("either --stac-url (STAC_API_URL) or --snapshot is required"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_item_ref() {
        assert_eq!(
            parse_item_ref("Kanawha-0505-R001/R001-E2044"),
            Ok(ItemRef {
                collection: "Kanawha-0505-R001".into(),
                item: "R001-E2044".into()
            })
        );
        assert!(parse_item_ref("no-slash").is_err());
        assert!(parse_item_ref("/item").is_err());
        assert!(parse_item_ref("a/b/c").is_err());
    }

    #[test]
    fn flags_and_defaults() {
        let cfg = Config::try_parse_from([
            "storm-viewer",
            "--stac-url",
            "https://stac.example",
            "--collection",
            "Kanawha-0505-R001",
        ])
        .unwrap();
        assert_eq!(cfg.stac_url.as_deref(), Some("https://stac.example"));
        assert_eq!(cfg.page_size, 100);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.cell_size, 0.25);
        assert!(matches!(cfg.source(), Ok(Source::Http(_))));
    }

    #[test]
    fn http_links_use_url_as_given() {
        let cfg = Config::try_parse_from(["storm-viewer", "--stac-url", "https://stac.example/"])
            .unwrap();
        let source = cfg.source().unwrap();
        assert_eq!(source.client().base_url(), Some("https://stac.example/"));
    }

    #[test]
    fn snapshot_and_url_conflict() {
        let parsed = Config::try_parse_from([
            "storm-viewer",
            "--stac-url",
            "https://stac.example",
            "--snapshot",
            "items.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn snapshot_selects_file_source() {
        let cfg = Config::try_parse_from(["storm-viewer", "--snapshot", "items.json"]).unwrap();
        let source = cfg.source().unwrap();
        assert!(matches!(source, Source::File(_)));
        assert_eq!(source.client().base_url(), None);
    }

    #[test]
    fn bad_cell_size_is_rejected() {
        let cfg = Config::try_parse_from(["storm-viewer", "--snapshot", "items.json", "--cell-size", "0"])
            .unwrap();
        assert!(cfg.source().is_err());
    }
}
