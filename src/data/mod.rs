/// Data layer: catalog access, record extraction, and filtering.
///
/// Architecture:
/// ```text
///   STAC API / snapshot file
///        │
///        ▼
///   ┌──────────┐
///   │ catalog   │  search a collection → Vec<CatalogItem>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ extract   │  flatten items, "N/A" defaults → RecordSet
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ filter    │  realization → block → id → precip → season → date
///   └──────────┘
///        │
///        ▼
///   table / heatmaps / CSV export
/// ```

pub mod catalog;
pub mod error;
pub mod export;
pub mod extract;
pub mod filter;
pub mod geometry;
pub mod model;
