use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use plotcraft::{
    report::ReportWriter,
    scenario::ScenarioLoader,
    strategy::{run_strategy, run_with_roads, search, RoadStrategy},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Plot layout optimizer")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/starter_town.yaml")]
    scenario: PathBuf,

    /// Road layout: search, none, central-cross, grid-network, plot-borders or sparse
    #[arg(long, default_value = "search")]
    strategy: String,

    /// Directory for JSON reports
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Print the ASCII grid of the chosen layout
    #[arg(long)]
    show_grid: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = std::str::FromStr::from_str(&cli.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let config = scenario.plot_configuration()?;
    let resolved = scenario.resolve_buildings()?;
    log::info!(
        "Scenario '{}': {} buildings on {}x{} plots",
        scenario.name,
        resolved.buildings.len(),
        config.plots_x,
        config.plots_y
    );

    let result = match cli.strategy.as_str() {
        "search" if !scenario.roads.is_empty() => {
            run_with_roads("custom", config, &resolved.buildings, &scenario.roads)
        }
        "search" => search(config, &resolved.buildings),
        label => match RoadStrategy::from_label(label) {
            Some(strategy) => run_strategy(strategy, config, &resolved.buildings),
            None => bail!("unknown strategy '{label}'"),
        },
    };

    if let Some(dir) = cli.report_dir {
        let path = ReportWriter::new(dir).write(&scenario.name, &resolved.missing, &result)?;
        log::info!("Report written to {}", path.display());
    }

    println!(
        "Scenario '{}' with strategy '{}': {} placed, {} failed, {} coins ({:.1}/h), {} passengers ({:.1}/h)",
        scenario.name,
        result.strategy,
        result.placed_buildings.len(),
        result.failed_buildings.len(),
        result.total_coins_revenue,
        result.coins_revenue_per_hour,
        result.total_passengers_revenue,
        result.passengers_revenue_per_hour
    );
    if !resolved.missing.is_empty() {
        println!("Missing from catalog: {}", resolved.missing.join(", "));
    }
    if !result.validation.is_valid {
        for error in &result.validation.errors {
            println!("  error: {error}");
        }
    }
    if cli.show_grid {
        println!("{}", result.grid_visualization);
    }
    Ok(())
}
