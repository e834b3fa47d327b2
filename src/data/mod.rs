/// Data layer: getting images in, getting drill lines out.
///
/// Architecture:
/// ```text
///  .json / .png / PNG stack
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file(s) → ImageLayer (ArrayD<f64>)
///   └──────────┘
///
///   PlotState ──▶ ┌──────────┐
///                 │  export   │  drill lines → CSV
///                 └──────────┘
/// ```

pub mod export;
pub mod loader;
