mod analyzer;
mod config;
mod loader;
mod merger;
mod model;
mod renderer;
mod storage;
mod utils;

use analyzer::window::ZOOM_WIDTH;
use analyzer::{
    annual_counts, daily_counts, group_counts, observation_span, rolling_mean, select_window,
    species_counts,
};
use config::{AppConfig, load_config};
use loader::{load_observations, load_taxonomy, read_token};
use merger::{merge, resolve_highlight};
use model::{AppError, EnrichedObservation, HighlightTarget};
use renderer::colors::Rgb;
use renderer::{ChartMeta, PlottersRenderer, Renderer};
use std::path::PathBuf;
use std::process::ExitCode;
use storage::HistoryCache;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use utils::file_safe;

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));

    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let renderer = PlottersRenderer::new();
    match run(&config, &renderer) {
        Ok(summary) => {
            info!(
                "Finished: {} enriched observations ({} dropped), {} artifacts written",
                summary.enriched, summary.dropped, summary.artifacts
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RunSummary {
    enriched: usize,
    dropped: usize,
    artifacts: usize,
}

/// File names and titles of every artifact, derived from the config and the highlighted species.
struct ChartPlan<'a> {
    config: &'a AppConfig,
    target: &'a HighlightTarget,
    color: Rgb,
}

impl<'a> ChartPlan<'a> {
    fn meta(&self, file_name: String, title: String) -> ChartMeta {
        ChartMeta {
            title,
            output: self.config.output_dir.join(file_name),
            highlight: self.color,
        }
    }

    fn name(&self) -> String {
        file_safe(&self.target.common_name)
    }

    fn groups_overview(&self) -> ChartMeta {
        let year = self.config.year;
        self.meta(
            format!("{} obs Counts - All Species Groups.png", year),
            format!("{} Observation Count by Species Group", year),
        )
    }

    fn groups_highlighted(&self) -> ChartMeta {
        let year = self.config.year;
        self.meta(
            format!("{} Obs Counts - {} - Species Groups.png", year, self.name()),
            format!("{} Observation Count by Species Group", year),
        )
    }

    fn groups_zoomed(&self) -> ChartMeta {
        let year = self.config.year;
        self.meta(
            format!("{} obs Counts - {} - Species Groups - Zoomed IN.png", year, self.name()),
            format!("{} Obs Count by Species Group - Zoomed IN", year),
        )
    }

    fn species_overview(&self) -> ChartMeta {
        let year = self.config.year;
        self.meta(
            format!("{} obs Counts - {} - All Species.png", year, self.name()),
            format!("{} Obs Counts ({})", year, self.target.species_group),
        )
    }

    fn species_zoomed(&self) -> ChartMeta {
        let year = self.config.year;
        self.meta(
            format!("{} obs Counts - {}.png", year, self.name()),
            format!("{} obs Counts ({})", year, self.target.species_group),
        )
    }

    fn daily(&self) -> ChartMeta {
        self.meta(
            format!("Daily Observation Counts - {}.png", self.name()),
            format!(
                "Daily Observations + {}-Day Rolling Average: {} ({})",
                self.config.rolling_window_days, self.target.common_name, self.target.scientific_name
            ),
        )
    }

    fn map(&self) -> ChartMeta {
        self.meta(
            format!("{} Observations Map - {}.html", self.config.year, self.name()),
            format!(
                "{} Observations of {} ({})",
                self.config.year, self.target.common_name, self.target.scientific_name
            ),
        )
    }

    fn annual(&self) -> ChartMeta {
        self.meta(
            format!("Historical Annual Obs - {}.png", self.name()),
            format!(
                "Historical Annual Observation Counts: {} ({})",
                self.target.common_name, self.target.scientific_name
            ),
        )
    }
}

/// Runs the whole analysis once. The first failure stops the run.
fn run(config: &AppConfig, renderer: &dyn Renderer) -> Result<RunSummary, AppError> {
    let color = config.highlight_color()?;

    info!("Loading observation and taxonomy tables...");
    let observations = load_observations(&config.observations_path)?;
    let taxonomy = load_taxonomy(&config.taxonomy_path)?;

    let target = resolve_highlight(&taxonomy, &config.highlight_species)?;
    info!(
        "Highlighted species: {} ({}), group: {}",
        target.common_name, target.scientific_name, target.species_group
    );

    info!("Merging observations with taxonomy...");
    let outcome = merge(observations, &taxonomy);
    if outcome.dropped > 0 {
        warn!(
            "{} observations had no taxonomy match and were dropped",
            outcome.dropped
        );
    }
    let records = outcome.records;
    info!("{} enriched observations", records.len());

    let plan = ChartPlan {
        config,
        target: &target,
        color,
    };
    let mut artifacts = 0;

    info!("Counting observations by species group...");
    let groups = group_counts(&records);
    info!(
        "{} species groups, {} observations; {} in {}",
        groups.len(),
        groups.total(),
        groups.get(&target.species_group).unwrap_or(0),
        target.species_group
    );
    renderer.counts_overview(&groups, None, &plan.groups_overview())?;
    renderer.counts_overview(
        &groups,
        Some(target.species_group.as_str()),
        &plan.groups_highlighted(),
    )?;
    let group_window = select_window(&groups, &target.species_group)?;
    renderer.counts_zoomed(&group_window, &target.species_group, &plan.groups_zoomed())?;
    artifacts += 3;

    info!("Counting species in {}...", target.species_group);
    let species = species_counts(&records, &target.species_group);
    if species.len() > ZOOM_WIDTH {
        renderer.counts_overview(
            &species,
            Some(target.common_name.as_str()),
            &plan.species_overview(),
        )?;
        artifacts += 1;
    }
    let species_window = select_window(&species, &target.common_name)?;
    renderer.counts_zoomed(&species_window, &target.common_name, &plan.species_zoomed())?;
    artifacts += 1;

    info!("Computing daily observations...");
    let daily = daily_counts(&records, &target.scientific_name, config.year)?;
    let rolling = rolling_mean(&daily.counts, config.rolling_window_days);
    let year_span = (daily.start, daily.date_at(daily.len().saturating_sub(1)));
    let x_bounds = observation_span(&records).unwrap_or(year_span);
    renderer.daily_trend(&daily, &rolling, x_bounds, &plan.daily())?;
    artifacts += 1;

    info!("Building observation map...");
    let token = read_token(&config.token_path)?;
    let points: Vec<EnrichedObservation> = records
        .iter()
        .filter(|r| r.scientific_name == target.scientific_name)
        .cloned()
        .collect();
    renderer.observation_map(&points, &token, &config.map, &plan.map())?;
    artifacts += 1;

    info!("Preparing historical annual trend...");
    let cache = HistoryCache::for_species(config.cache_dir(), &target.common_name);
    cache.ensure(
        &config.archive_path,
        &target.scientific_name,
        config.archive_chunk_size,
    )?;
    info!("Reading history extract {}", cache.path().display());
    let dates = cache.observation_dates()?;
    let annual = annual_counts(&dates, config.history_start_year, config.history_end_year);
    info!(
        "{} historical observations across {} years",
        annual.values().sum::<usize>(),
        annual.len()
    );
    renderer.annual_trend(&annual, &plan.annual())?;
    artifacts += 1;

    Ok(RunSummary {
        enriched: records.len(),
        dropped: outcome.dropped,
        artifacts,
    })
}
