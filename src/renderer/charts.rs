use crate::config::MapConfig;
use crate::model::{AnnualCountSeries, CountSeries, DailyCountSeries, EnrichedObservation, RenderError};
use crate::renderer::colors::{BASE_BAR, MUTED_LABEL, Rgb};
use crate::renderer::map::{build_figure, render_html};
use crate::renderer::{ChartMeta, Renderer};
use crate::utils::format_thousands;
use chrono::{Duration, NaiveDate};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::info;

/// Count axes never end below this value, so sparse series stay readable.
const MIN_COUNT_AXIS: f64 = 10.0;

/// Writes PNG charts with plotters and the map as a standalone HTML page.
pub struct PlottersRenderer {
    pub size: (u32, u32),
}

impl PlottersRenderer {
    pub fn new() -> Self {
        Self { size: (1200, 800) }
    }
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn prepare_output(path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| RenderError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn drawing_error(e: Box<dyn Error>) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Axis top: the maximum plus 5% headroom, never below `floor`.
fn padded_max(max: f64, floor: f64) -> f64 {
    (max + (max / 20.0).ceil()).max(floor).max(1.0)
}

fn segment_label(entries: &[(String, usize)], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            entries.get(*i).map(|(k, _)| k.clone()).unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

fn bar_color(key: &str, highlighted: Option<&str>, highlight: Rgb) -> RGBColor {
    if highlighted == Some(key) { rgb(highlight) } else { rgb(BASE_BAR) }
}

fn draw_counts_overview(
    size: (u32, u32),
    counts: &CountSeries,
    highlighted: Option<&str>,
    meta: &ChartMeta,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(&meta.output, size).into_drawing_area();
    root.fill(&WHITE)?;

    let entries = counts.entries();
    let n = entries.len().max(1);
    let y_max = padded_max(counts.max_count() as f64, 1.0) as u64;
    let label_color = if highlighted.is_some() { rgb(MUTED_LABEL) } else { BLACK };

    let mut chart = ChartBuilder::on(&root)
        .caption(&meta.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(200)
        .y_label_area_size(70)
        .build_cartesian_2d((0..n).into_segmented(), 0u64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|v| segment_label(entries, v))
        .x_label_style(
            ("sans-serif", 10)
                .into_font()
                .transform(FontTransform::Rotate90)
                .color(&label_color),
        )
        .y_desc("Counts")
        .y_label_formatter(&|v| format_thousands(*v))
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(i, (key, count))| {
        let color = bar_color(key, highlighted, meta.highlight);
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), *count as u64)],
            color.filled(),
        );
        bar.set_margin(0, 0, 1, 1);
        bar
    }))?;

    root.present()?;
    Ok(())
}

fn draw_counts_zoomed(
    size: (u32, u32),
    window: &CountSeries,
    highlighted: &str,
    meta: &ChartMeta,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(&meta.output, size).into_drawing_area();
    root.fill(&WHITE)?;

    let entries = window.entries();
    let n = entries.len().max(1);
    let x_max = padded_max(window.max_count() as f64, 1.0) as u64;

    let mut chart = ChartBuilder::on(&root)
        .caption(&meta.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(260)
        .build_cartesian_2d(0u64..x_max, (0..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|v| segment_label(entries, v))
        .y_label_style(("sans-serif", 13).into_font().color(&rgb(MUTED_LABEL)))
        .x_desc("Count")
        .x_label_formatter(&|v| format_thousands(*v))
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(i, (key, count))| {
        let color = bar_color(key, Some(highlighted), meta.highlight);
        let mut bar = Rectangle::new(
            [(0, SegmentValue::Exact(i)), (*count as u64, SegmentValue::Exact(i + 1))],
            color.filled(),
        );
        bar.set_margin(2, 2, 0, 0);
        bar
    }))?;

    root.present()?;
    Ok(())
}

/// Day offsets `[lo, hi)` of `bounds` within the series; the full year when they miss it.
fn day_range(daily: &DailyCountSeries, bounds: (NaiveDate, NaiveDate)) -> (usize, usize) {
    let len = daily.len() as i64;
    let lo = (bounds.0 - daily.start).num_days().clamp(0, len);
    let hi = ((bounds.1 - daily.start).num_days() + 1).clamp(0, len);
    if lo < hi { (lo as usize, hi as usize) } else { (0, len as usize) }
}

fn draw_daily_trend(
    size: (u32, u32),
    daily: &DailyCountSeries,
    rolling: &[f64],
    x_bounds: (NaiveDate, NaiveDate),
    meta: &ChartMeta,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(&meta.output, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (lo, hi) = day_range(daily, x_bounds);
    let start = daily.start;
    let color = rgb(meta.highlight);
    let y_max = padded_max(daily.max_count() as f64, MIN_COUNT_AXIS);

    let mut chart = ChartBuilder::on(&root)
        .caption(&meta.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lo as f64..hi as f64, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_labels(12)
        .x_label_formatter(&|x| {
            (start + Duration::days(x.floor() as i64))
                .format("%b %d")
                .to_string()
        })
        .y_desc("Daily Observations")
        .y_label_formatter(&|v| format_thousands(v.round().max(0.0) as u64))
        .draw()?;

    chart.draw_series(
        daily.counts[lo..hi]
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(i, c)| {
                let x = (lo + i) as f64;
                Rectangle::new([(x, 0.0), (x + 1.0, f64::from(*c))], color.mix(0.2).filled())
            }),
    )?;

    chart.draw_series(LineSeries::new(
        rolling
            .iter()
            .enumerate()
            .skip(lo)
            .take(hi - lo)
            .map(|(i, v)| (i as f64 + 0.5, *v)),
        color.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}

fn draw_annual_trend(
    size: (u32, u32),
    annual: &AnnualCountSeries,
    meta: &ChartMeta,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(&meta.output, size).into_drawing_area();
    root.fill(&WHITE)?;

    let first = annual.keys().next().copied().unwrap_or(0);
    let last = annual.keys().next_back().copied().unwrap_or(0);
    let max = annual.values().copied().max().unwrap_or(0);
    let y_max = padded_max(max as f64, MIN_COUNT_AXIS) as u64;
    let color = rgb(meta.highlight);

    let mut chart = ChartBuilder::on(&root)
        .caption(&meta.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((first..last + 1).into_segmented(), 0u64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Year")
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(y) | SegmentValue::Exact(y) => y.to_string(),
            SegmentValue::Last => String::new(),
        })
        .y_desc("Total Annual Observations")
        .y_label_formatter(&|v| format_thousands(*v))
        .draw()?;

    chart.draw_series(annual.iter().map(|(year, count)| {
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(*year), 0), (SegmentValue::Exact(*year + 1), *count as u64)],
            color.filled(),
        );
        bar.set_margin(0, 0, 1, 1);
        bar
    }))?;

    root.present()?;
    Ok(())
}

impl Renderer for PlottersRenderer {
    fn counts_overview(
        &self,
        counts: &CountSeries,
        highlighted: Option<&str>,
        meta: &ChartMeta,
    ) -> Result<(), RenderError> {
        prepare_output(&meta.output)?;
        draw_counts_overview(self.size, counts, highlighted, meta).map_err(drawing_error)?;
        info!("Chart saved: {}", meta.output.display());
        Ok(())
    }

    fn counts_zoomed(
        &self,
        window: &CountSeries,
        highlighted: &str,
        meta: &ChartMeta,
    ) -> Result<(), RenderError> {
        prepare_output(&meta.output)?;
        draw_counts_zoomed(self.size, window, highlighted, meta).map_err(drawing_error)?;
        info!("Chart saved: {}", meta.output.display());
        Ok(())
    }

    fn daily_trend(
        &self,
        daily: &DailyCountSeries,
        rolling: &[f64],
        x_bounds: (NaiveDate, NaiveDate),
        meta: &ChartMeta,
    ) -> Result<(), RenderError> {
        prepare_output(&meta.output)?;
        draw_daily_trend(self.size, daily, rolling, x_bounds, meta).map_err(drawing_error)?;
        info!("Chart saved: {}", meta.output.display());
        Ok(())
    }

    fn annual_trend(&self, annual: &AnnualCountSeries, meta: &ChartMeta) -> Result<(), RenderError> {
        prepare_output(&meta.output)?;
        draw_annual_trend(self.size, annual, meta).map_err(drawing_error)?;
        info!("Chart saved: {}", meta.output.display());
        Ok(())
    }

    fn observation_map(
        &self,
        points: &[EnrichedObservation],
        token: &str,
        view: &MapConfig,
        meta: &ChartMeta,
    ) -> Result<(), RenderError> {
        prepare_output(&meta.output)?;
        let figure = build_figure(points, token, view, &meta.title, meta.highlight);
        let html = render_html(&figure, &meta.title)?;
        fs::write(&meta.output, html).map_err(|source| RenderError::Io {
            path: meta.output.clone(),
            source,
        })?;
        info!("Map saved: {} ({} points)", meta.output.display(), points.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily_2022() -> DailyCountSeries {
        DailyCountSeries {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            counts: vec![0; 365],
        }
    }

    #[test]
    fn test_day_range_within_year() {
        let daily = daily_2022();
        let bounds = (
            NaiveDate::from_ymd_opt(2022, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2022, 12, 30).unwrap(),
        );
        assert_eq!(day_range(&daily, bounds), (2, 364));
    }

    #[test]
    fn test_day_range_outside_year_falls_back() {
        let daily = daily_2022();
        let bounds = (
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 2, 1).unwrap(),
        );
        assert_eq!(day_range(&daily, bounds), (0, 365));
    }

    #[test]
    fn test_padded_max_has_floor() {
        assert_eq!(padded_max(3.0, MIN_COUNT_AXIS), 10.0);
        assert_eq!(padded_max(100.0, MIN_COUNT_AXIS), 105.0);
        assert_eq!(padded_max(0.0, 1.0), 1.0);
    }

    #[test]
    fn test_segment_labels() {
        let entries = vec![("Owls".to_string(), 3), ("Blackbirds".to_string(), 7)];
        assert_eq!(segment_label(&entries, &SegmentValue::CenterOf(1)), "Blackbirds");
        assert_eq!(segment_label(&entries, &SegmentValue::Exact(0)), "Owls");
        assert_eq!(segment_label(&entries, &SegmentValue::CenterOf(5)), "");
        assert_eq!(segment_label(&entries, &SegmentValue::Last), "");
    }

    #[test]
    fn test_map_is_written_as_html() {
        let dir = tempfile::tempdir().unwrap();
        let meta = ChartMeta {
            title: "2022 Observations of Rusty Blackbird (Euphagus carolinus)".into(),
            output: dir.path().join("maps").join("map.html"),
            highlight: Rgb(102, 51, 153),
        };
        let points = vec![EnrichedObservation {
            common_name: "Rusty Blackbird".into(),
            scientific_name: "Euphagus carolinus".into(),
            observation_date: NaiveDate::from_ymd_opt(2022, 4, 12).unwrap(),
            latitude: 53.5,
            longitude: -113.5,
            species_group: "Blackbirds".into(),
        }];
        PlottersRenderer::new()
            .observation_map(&points, "pk.test", &MapConfig::default(), &meta)
            .unwrap();
        let html = fs::read_to_string(&meta.output).unwrap();
        assert!(html.contains("pk.test"));
        assert!(html.contains("scattermapbox"));
    }
}
