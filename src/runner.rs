use crate::catcher::CatcherConfig;
use crate::object::{CatchEvent, Chart};
use crate::path::{reconstruct, Trajectory};
use crate::score::{ObjectScore, ScoreEngine};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk chart: already flattened events plus optional catcher parameters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChartFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catcher: Option<CatcherConfig>,
    pub objects: Vec<CatchEvent>,
}

/// Command-line overrides layered over a chart's embedded catcher block.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatcherOverrides {
    pub dash_speed: Option<f64>,
    pub half_width: Option<f64>,
    pub clock_rate: Option<f64>,
}

impl CatcherOverrides {
    pub fn apply(&self, base: CatcherConfig) -> CatcherConfig {
        CatcherConfig {
            dash_speed: self.dash_speed.unwrap_or(base.dash_speed),
            half_width: self.half_width.unwrap_or(base.half_width),
            clock_rate: self.clock_rate.unwrap_or(base.clock_rate),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanMetrics {
    pub object_count: usize,
    pub total_value: u64,
    pub best_score: u64,
    pub caught_value: u64,
    pub caught_count: usize,
    pub keyframe_count: usize,
    pub evaluations: usize,
    pub hyperdash_transitions: usize,
}

impl PlanMetrics {
    pub fn capture_ratio(&self) -> f64 {
        if self.total_value == 0 {
            1.0
        } else {
            self.caught_value as f64 / self.total_value as f64
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanArtifact {
    pub catcher: CatcherConfig,
    pub metrics: PlanMetrics,
    pub trajectory: Trajectory,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScoreRow {
    pub index: usize,
    pub position: f64,
    pub time: f64,
    pub value: u32,
    pub score: Option<ObjectScore>,
}

pub fn load_chart(path: &Path) -> Result<ChartFile> {
    let data =
        fs::read(path).with_context(|| format!("failed reading chart {}", path.display()))?;
    serde_json::from_slice(&data)
        .with_context(|| format!("failed parsing chart json {}", path.display()))
}

pub fn resolve_catcher(file: &ChartFile, overrides: &CatcherOverrides) -> CatcherConfig {
    overrides.apply(file.catcher.unwrap_or_default())
}

pub fn plan_chart(file: &ChartFile, catcher: CatcherConfig) -> Result<PlanArtifact> {
    let chart = Chart::new(&file.objects).map_err(|err| anyhow!("chart rejected: {err}"))?;
    let mut engine =
        ScoreEngine::new(&chart, catcher).map_err(|err| anyhow!("catcher rejected: {err}"))?;
    let start = engine.compute_start();
    let trajectory = reconstruct(&mut engine);

    let metrics = PlanMetrics {
        object_count: chart.len() - 1,
        total_value: chart.total_value(),
        best_score: start.best(),
        caught_value: trajectory.caught_value,
        caught_count: trajectory.visited.len(),
        keyframe_count: trajectory.keyframes.len(),
        evaluations: engine.evaluations(),
        hyperdash_transitions: trajectory.hyperdash_transitions(&chart),
    };

    Ok(PlanArtifact {
        catcher,
        metrics,
        trajectory,
    })
}

/// Scores every object of the chart and returns the full table.
pub fn score_table(file: &ChartFile, catcher: CatcherConfig) -> Result<Vec<ScoreRow>> {
    let chart = Chart::new(&file.objects).map_err(|err| anyhow!("chart rejected: {err}"))?;
    let mut engine =
        ScoreEngine::new(&chart, catcher).map_err(|err| anyhow!("catcher rejected: {err}"))?;
    for index in (0..chart.len()).rev() {
        engine.compute(index);
    }

    Ok(chart
        .objects()
        .iter()
        .zip(engine.table())
        .enumerate()
        .map(|(index, (object, score))| ScoreRow {
            index,
            position: object.position,
            time: object.time,
            value: object.value,
            score: *score,
        })
        .collect())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    let encoded = serde_json::to_vec_pretty(value).context("failed to serialize json")?;
    fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_fields() {
        let file = ChartFile {
            catcher: Some(CatcherConfig::new(0.004, 0.1)),
            objects: Vec::new(),
        };
        let overrides = CatcherOverrides {
            half_width: Some(0.05),
            ..CatcherOverrides::default()
        };
        let catcher = resolve_catcher(&file, &overrides);
        assert_eq!(catcher.dash_speed, 0.004);
        assert_eq!(catcher.half_width, 0.05);
        assert_eq!(catcher.clock_rate, 1.0);
    }

    #[test]
    fn plan_reports_metrics() -> Result<()> {
        let file = ChartFile {
            catcher: None,
            objects: vec![
                CatchEvent::fruit(0.2, 500.0),
                CatchEvent::tick(0.8, 500.0),
            ],
        };
        let artifact = plan_chart(&file, CatcherConfig::default())?;
        assert_eq!(artifact.metrics.object_count, 2);
        assert_eq!(artifact.metrics.total_value, 101);
        assert_eq!(artifact.metrics.best_score, 100);
        assert_eq!(artifact.metrics.caught_value, 100);
        assert_eq!(artifact.metrics.caught_count, 1);
        assert_eq!(artifact.metrics.keyframe_count, 2);
        Ok(())
    }

    #[test]
    fn invalid_input_fails_before_scoring() {
        let file = ChartFile {
            catcher: None,
            objects: vec![CatchEvent::fruit(1.5, 0.0)],
        };
        let err = plan_chart(&file, CatcherConfig::default()).unwrap_err();
        assert!(err.to_string().contains("outside [0, 1]"), "{err}");

        let err = plan_chart(&ChartFile::default(), CatcherConfig::new(-1.0, 0.1)).unwrap_err();
        assert!(err.to_string().contains("dash_speed"), "{err}");
    }

    #[test]
    fn score_table_covers_every_object() -> Result<()> {
        let file = ChartFile {
            catcher: None,
            objects: vec![
                CatchEvent::fruit(0.1, 100.0),
                CatchEvent::fruit(0.9, 110.0),
            ],
        };
        let rows = score_table(&file, CatcherConfig::default())?;
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.score.is_some()));
        assert_eq!(rows[0].value, 0);
        Ok(())
    }
}
