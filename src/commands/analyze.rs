use crate::config::{self, PulsemapConfig};
use crate::core::PulseEntry;
use crate::formatting::ColorMode;
use crate::io::{self, OutputFormat};
use crate::pipeline::{analyze_entries_with_notes, recent_entries};
use crate::risk::assess_risk_with;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub notes: Option<String>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub plain: bool,
    pub color: Option<ColorMode>,
    pub jobs: usize,
}

pub struct RiskCommandConfig {
    pub path: PathBuf,
    pub notes: Option<String>,
    pub format: OutputFormat,
    pub config: Option<PathBuf>,
    pub plain: bool,
    pub color: Option<ColorMode>,
}

pub fn handle_analyze(config: AnalyzeConfig) -> Result<()> {
    color_mode(config.plain || config.output.is_some(), config.color).apply();
    crate::cli::configure_thread_pool(config.jobs);

    let settings = resolve_config(config.config.as_deref())?;
    let entries = load_entries(&config.path)?;

    let report = analyze_entries_with_notes(&entries, config.notes.as_deref(), &settings);

    let mut sink = open_sink(config.output.as_deref())?;
    io::create_writer(config.format, &mut sink).write_report(&report)?;
    sink.flush()?;
    Ok(())
}

pub fn handle_risk(config: RiskCommandConfig) -> Result<()> {
    color_mode(config.plain, config.color).apply();

    let settings = resolve_config(config.config.as_deref())?;
    let entries = load_entries(&config.path)?;
    let recent = recent_entries(&entries, settings.risk.window_days.saturating_mul(2));

    let risk = assess_risk_with(&recent, config.notes.as_deref(), &settings.risk);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    io::create_writer(config.format, &mut handle).write_risk(&risk)?;
    Ok(())
}

/// `--plain` wins, then `--color`, then the environment.
fn color_mode(plain: bool, requested: Option<ColorMode>) -> ColorMode {
    if plain {
        return ColorMode::Never;
    }
    requested.unwrap_or_else(ColorMode::from_env)
}

/// An explicit `--config` must load; otherwise fall back to discovery.
fn resolve_config(path: Option<&Path>) -> Result<PulsemapConfig> {
    match path {
        Some(path) => Ok(config::load_config_from_path(path)?),
        None => Ok(config::load_config()),
    }
}

fn load_entries(path: &Path) -> Result<Vec<PulseEntry>> {
    io::read_entries(path).with_context(|| format!("Failed to load entries from {}", path.display()))
}

fn open_sink(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}
