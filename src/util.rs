use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn parse_chart_csv(input: &str) -> Result<Vec<PathBuf>> {
    let mut charts = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        charts.push(PathBuf::from(token));
    }
    if charts.is_empty() {
        return Err(anyhow!("no chart paths parsed from --charts"));
    }
    Ok(charts)
}

/// One chart path per line; blank lines and `#` comments are skipped.
/// Relative paths resolve against the list file's directory.
pub fn parse_chart_list(path: &Path) -> Result<Vec<PathBuf>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading chart list {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let mut charts = Vec::new();
    for line in data.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        charts.push(base.join(trimmed));
    }
    if charts.is_empty() {
        return Err(anyhow!("chart list {} had no charts", path.display()));
    }
    Ok(charts)
}

/// Every `*.json` file directly inside `dir`, sorted by path.
pub fn discover_charts(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed reading directory {}", dir.display()))?;
    let mut charts = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed listing {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            charts.push(path);
        }
    }
    if charts.is_empty() {
        return Err(anyhow!("no *.json charts found in {}", dir.display()));
    }
    charts.sort();
    Ok(charts)
}

/// Short display name for a chart path.
pub fn chart_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
