use anyhow::{anyhow, Result};
use catch_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use catch_autopilot::runner::{
    load_chart, plan_chart, resolve_catcher, score_table, write_json, CatcherOverrides,
};
use catch_autopilot::util::{discover_charts, parse_chart_csv, parse_chart_list};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "catch-autopilot")]
#[command(about = "Optimal autoplay planner for falling-object catch charts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct CatcherArgs {
    /// Dash speed in normalized units per millisecond (overrides the chart)
    #[arg(long)]
    dash_speed: Option<f64>,
    /// Catcher half width in normalized units (overrides the chart)
    #[arg(long)]
    half_width: Option<f64>,
    /// Playback rate, e.g. 1.5 for double time (overrides the chart)
    #[arg(long)]
    clock_rate: Option<f64>,
}

impl From<CatcherArgs> for CatcherOverrides {
    fn from(value: CatcherArgs) -> Self {
        Self {
            dash_speed: value.dash_speed,
            half_width: value.half_width,
            clock_rate: value.clock_rate,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan the catcher trajectory for one chart
    Plan {
        #[arg(long)]
        chart: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        catcher: CatcherArgs,
    },
    /// Dump the per-object continuation scores of one chart
    Scores {
        #[arg(long)]
        chart: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        catcher: CatcherArgs,
    },
    /// Plan many charts in parallel and summarise capture ratios
    Benchmark {
        /// Comma-separated chart paths
        #[arg(long)]
        charts: Option<String>,
        /// Directory scanned for *.json charts
        #[arg(long)]
        chart_dir: Option<PathBuf>,
        /// File listing one chart path per line
        #[arg(long)]
        chart_list: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        jobs: Option<usize>,
        #[command(flatten)]
        catcher: CatcherArgs,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let Cli { command } = Cli::parse();

    match command {
        Commands::Plan {
            chart,
            output,
            catcher,
        } => {
            let file = load_chart(&chart)?;
            let catcher = resolve_catcher(&file, &catcher.into());
            let artifact = plan_chart(&file, catcher)?;
            let metrics = &artifact.metrics;

            println!("chart={}", chart.display());
            println!("dash_speed={}", artifact.catcher.dash_speed);
            println!("half_width={}", artifact.catcher.half_width);
            println!("clock_rate={}", artifact.catcher.clock_rate);
            println!("objects={}", metrics.object_count);
            println!("total_value={}", metrics.total_value);
            println!("best_score={}", metrics.best_score);
            println!("caught_value={}", metrics.caught_value);
            println!("caught={}", metrics.caught_count);
            println!("capture_ratio={:.4}", metrics.capture_ratio());
            println!("keyframes={}", metrics.keyframe_count);
            println!("evaluations={}", metrics.evaluations);
            println!("hyperdashes={}", metrics.hyperdash_transitions);

            if let Some(path) = output {
                write_json(&path, &artifact)?;
                println!("output={}", path.display());
            }
        }
        Commands::Scores {
            chart,
            output,
            catcher,
        } => {
            let file = load_chart(&chart)?;
            let catcher = resolve_catcher(&file, &catcher.into());
            let rows = score_table(&file, catcher)?;

            if let Some(path) = output {
                write_json(&path, &rows)?;
                println!("rows={}", rows.len());
                println!("output={}", path.display());
            } else {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
        }
        Commands::Benchmark {
            charts,
            chart_dir,
            chart_list,
            out_dir,
            jobs,
            catcher,
        } => {
            let charts = resolve_charts(
                charts.as_deref(),
                chart_dir.as_deref(),
                chart_list.as_deref(),
            )?;
            let out_dir = out_dir
                .unwrap_or_else(|| PathBuf::from(format!("benchmarks/{}", timestamp_suffix())));

            let report = run_benchmark(BenchmarkConfig {
                charts,
                overrides: catcher.into(),
                out_dir: out_dir.clone(),
                jobs,
            })?;

            println!("charts={}", report.chart_count);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("objects={}", report.total_objects);
            println!("total_value={}", report.total_value);
            println!("caught_value={}", report.caught_value);
            println!("avg_capture_ratio={:.4}", report.avg_capture_ratio);
            println!("min_capture_ratio={:.4}", report.min_capture_ratio);
            println!("out_dir={}", out_dir.display());
            println!("weakest charts:");
            for (idx, record) in report.charts.iter().take(5).enumerate() {
                println!(
                    "  {}. {}  capture={:.2}% caught={}/{} best={} evaluations={} elapsed_ms={:.1}",
                    idx + 1,
                    record.chart_id,
                    record.capture_ratio * 100.0,
                    record.caught_value,
                    record.total_value,
                    record.best_score,
                    record.evaluations,
                    record.elapsed_ms,
                );
            }
        }
    }

    Ok(())
}

fn resolve_charts(
    charts: Option<&str>,
    chart_dir: Option<&Path>,
    chart_list: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    match (charts, chart_dir, chart_list) {
        (Some(csv), None, None) => parse_chart_csv(csv),
        (None, Some(dir), None) => discover_charts(dir),
        (None, None, Some(list)) => parse_chart_list(list),
        (None, None, None) => Err(anyhow!(
            "one of --charts, --chart-dir or --chart-list is required"
        )),
        _ => Err(anyhow!(
            "--charts, --chart-dir and --chart-list are mutually exclusive"
        )),
    }
}

fn timestamp_suffix() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("{secs}")
}
