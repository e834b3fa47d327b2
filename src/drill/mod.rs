/// Drilling: extracting a 1-D profile along a hidden axis at a clicked point
/// and keeping the drill plot in sync.
///
/// ```text
///   points layer ──(Added event)──▶ session ──▶ extract ──▶ plot_state
///                                                              │
///                                              limits ◀────────┘
/// ```

pub mod extract;
pub mod limits;
pub mod plot_state;
pub mod session;

/// Images need at least this many axes to have something to drill through.
pub const MIN_DRILL_NDIM: usize = 3;
