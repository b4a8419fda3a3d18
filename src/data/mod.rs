/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<RawRow>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, datetime derived per row
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  inclusive [start, end] → FilteredView (row indices)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
