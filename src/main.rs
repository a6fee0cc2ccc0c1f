use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::DataFrame;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

use lifechart::{
    aggregate, load_table, render_chart, user_message_from_report, Args, ChartKind, ChartPlan,
    ChartSpec, ChartStyle, LoadOptions,
};

fn init_logging(args: &Args) {
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");
}

/// Handle --init-plan: write the default chart plan template and exit.
fn handle_init_plan(args: &Args) -> Result<()> {
    let path = args
        .plan
        .clone()
        .unwrap_or_else(|| PathBuf::from("charts.toml"));
    let written = lifechart::write_default_plan(&path, args.force)?;
    println!("Wrote default chart plan to {}", written.display());
    Ok(())
}

/// Aggregate and render one chart; returns the path of the written image.
fn render_one(df: &DataFrame, spec: &ChartSpec, index: usize, args: &Args) -> Result<PathBuf> {
    let result = aggregate(df, &spec.group_by, &spec.value, spec.sort_spec(), spec.limit)?;
    debug!(chart = %spec.name, groups = result.len(), "aggregated");

    // Default axis labels follow the chart orientation: horizontal bars put
    // the value on x and the groups on y.
    let (x_default, y_default) = match spec.kind {
        ChartKind::BarHorizontal => (spec.value.as_str(), spec.group_by.as_str()),
        _ => (spec.group_by.as_str(), spec.value.as_str()),
    };
    let style = ChartStyle {
        title: spec.title.clone(),
        x_label: spec.x_label.clone().unwrap_or_else(|| x_default.to_string()),
        y_label: spec.y_label.clone().unwrap_or_else(|| y_default.to_string()),
        palette_index: index,
    };

    let path = args
        .out_dir
        .join(format!("{}.{}", spec.name, args.format.extension()));
    render_chart(&path, &result, spec.kind, &style, args.format)?;
    Ok(path)
}

fn run(args: &Args) -> Result<()> {
    let data_path = args
        .path
        .as_ref()
        .ok_or_else(|| eyre!("missing data file argument (see --help)"))?;

    let plan = match &args.plan {
        Some(path) => ChartPlan::load(path)?,
        None => ChartPlan::default(),
    };
    if plan.charts.is_empty() {
        return Err(eyre!("chart plan contains no charts"));
    }

    let opts: LoadOptions = args.into();
    let df = load_table(data_path, &opts)?;
    debug!(rows = df.height(), columns = df.width(), "loaded table");

    std::fs::create_dir_all(&args.out_dir)?;

    let mut failed = 0usize;
    for (index, spec) in plan.charts.iter().enumerate() {
        match render_one(&df, spec, index, args) {
            Ok(path) => info!("wrote {}", path.display()),
            Err(report) => {
                failed += 1;
                warn!(
                    "chart '{}' failed: {}",
                    spec.name,
                    user_message_from_report(&report)
                );
            }
        }
    }

    if failed == plan.charts.len() {
        return Err(eyre!("all {} charts failed", failed));
    }
    if failed > 0 {
        info!(
            "finished with {} of {} charts failed",
            failed,
            plan.charts.len()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_plan {
        return handle_init_plan(&args);
    }

    color_eyre::install()?;
    init_logging(&args);
    run(&args)
}
