/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordStore
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  RecordStore  │  Vec<Observation>, distinct-value index, year bounds
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply membership / year predicates → matching rows
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
