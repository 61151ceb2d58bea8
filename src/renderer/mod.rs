// Renderer module: the seam between the aggregations and the chart artifacts.

pub mod charts;
pub mod colors;
pub mod map;

use crate::config::MapConfig;
use crate::model::{AnnualCountSeries, CountSeries, DailyCountSeries, EnrichedObservation, RenderError};
use chrono::NaiveDate;
use colors::Rgb;
use std::path::PathBuf;

pub use charts::PlottersRenderer;

/// Display metadata shared by every chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartMeta {
    pub title: String,
    pub output: PathBuf,
    pub highlight: Rgb,
}

/// Trait defining the chart artifacts the pipeline produces.
pub trait Renderer {
    /// All categories as vertical bars; the highlighted one, if any, in the highlight color.
    fn counts_overview(
        &self,
        counts: &CountSeries,
        highlighted: Option<&str>,
        meta: &ChartMeta,
    ) -> Result<(), RenderError>;

    /// A zoom window as horizontal bars.
    fn counts_zoomed(
        &self,
        window: &CountSeries,
        highlighted: &str,
        meta: &ChartMeta,
    ) -> Result<(), RenderError>;

    /// Daily bars with the rolling mean drawn over them, limited to `x_bounds`.
    fn daily_trend(
        &self,
        daily: &DailyCountSeries,
        rolling: &[f64],
        x_bounds: (NaiveDate, NaiveDate),
        meta: &ChartMeta,
    ) -> Result<(), RenderError>;

    fn annual_trend(&self, annual: &AnnualCountSeries, meta: &ChartMeta) -> Result<(), RenderError>;

    fn observation_map(
        &self,
        points: &[EnrichedObservation],
        token: &str,
        view: &MapConfig,
        meta: &ChartMeta,
    ) -> Result<(), RenderError>;
}
