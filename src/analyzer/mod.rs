// Analyzer module: aggregations over enriched observations and the zoom window.

pub mod annual;
pub mod counts;
pub mod daily;
pub mod window;

pub use annual::annual_counts;
pub use counts::{group_counts, species_counts};
pub use daily::{daily_counts, observation_span, rolling_mean};
pub use window::select_window;
