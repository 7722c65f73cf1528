use crate::runner::{load_chart, plan_chart, resolve_catcher, write_json, CatcherOverrides};
use crate::util::chart_id;
use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub charts: Vec<PathBuf>,
    pub overrides: CatcherOverrides,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartRecord {
    pub chart_id: String,
    pub path: String,
    pub object_count: usize,
    pub total_value: u64,
    pub best_score: u64,
    pub caught_value: u64,
    pub caught_count: usize,
    pub capture_ratio: f64,
    pub keyframe_count: usize,
    pub evaluations: usize,
    pub hyperdash_transitions: usize,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub jobs: Option<usize>,
    pub chart_count: usize,
    pub total_objects: usize,
    pub total_value: u64,
    pub caught_value: u64,
    pub avg_capture_ratio: f64,
    pub min_capture_ratio: f64,
    pub charts: Vec<ChartRecord>,
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.charts.is_empty() {
        return Err(anyhow!("benchmark requires at least one chart"));
    }
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_one = |path: &PathBuf| -> Result<ChartRecord> {
        let started = Instant::now();
        let file = load_chart(path)?;
        let catcher = resolve_catcher(&file, &config.overrides);
        let artifact = plan_chart(&file, catcher)
            .with_context(|| format!("benchmark run failed for {}", path.display()))?;
        let metrics = &artifact.metrics;
        Ok(ChartRecord {
            chart_id: chart_id(path),
            path: path.to_string_lossy().into_owned(),
            object_count: metrics.object_count,
            total_value: metrics.total_value,
            best_score: metrics.best_score,
            caught_value: metrics.caught_value,
            caught_count: metrics.caught_count,
            capture_ratio: metrics.capture_ratio(),
            keyframe_count: metrics.keyframe_count,
            evaluations: metrics.evaluations,
            hyperdash_transitions: metrics.hyperdash_transitions,
            elapsed_ms: started.elapsed().as_secs_f64() * 1_000.0,
        })
    };

    let results: Vec<Result<ChartRecord>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.charts.par_iter().map(run_one).collect())
    } else {
        config.charts.par_iter().map(run_one).collect()
    };

    let mut records = Vec::with_capacity(results.len());
    for result in results {
        records.push(result?);
    }

    // weakest charts first
    records.sort_by(|a, b| {
        a.capture_ratio
            .total_cmp(&b.capture_ratio)
            .then_with(|| b.total_value.cmp(&a.total_value))
            .then_with(|| a.chart_id.cmp(&b.chart_id))
    });

    let chart_count = records.len();
    let avg_capture_ratio =
        records.iter().map(|r| r.capture_ratio).sum::<f64>() / chart_count as f64;
    let min_capture_ratio = records
        .iter()
        .map(|r| r.capture_ratio)
        .fold(f64::INFINITY, f64::min);

    tracing::info!(
        charts = chart_count,
        avg_capture_ratio,
        min_capture_ratio,
        "benchmark finished"
    );

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        jobs: config.jobs,
        chart_count,
        total_objects: records.iter().map(|r| r.object_count).sum(),
        total_value: records.iter().map(|r| r.total_value).sum(),
        caught_value: records.iter().map(|r| r.caught_value).sum(),
        avg_capture_ratio,
        min_capture_ratio,
        charts: records,
    };

    write_runs_csv(&config.out_dir.join("runs.csv"), &report.charts)?;
    write_json(&config.out_dir.join("summary.json"), &report)?;

    Ok(report)
}

fn write_runs_csv(path: &Path, rows: &[ChartRecord]) -> Result<()> {
    let mut csv = String::from(
        "rank,chart_id,object_count,total_value,best_score,caught_value,caught_count,capture_ratio,keyframe_count,evaluations,hyperdash_transitions,elapsed_ms\n",
    );
    for (idx, row) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{:.4},{},{},{},{:.3}\n",
            idx + 1,
            row.chart_id,
            row.object_count,
            row.total_value,
            row.best_score,
            row.caught_value,
            row.caught_count,
            row.capture_ratio,
            row.keyframe_count,
            row.evaluations,
            row.hyperdash_transitions,
            row.elapsed_ms
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}
