// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::app::services::completion::DEFAULT_TAIL_LINES;
use crate::app::services::kinds::{CompletionRule, JobKind, KindSpec, KindTable};
use crate::app::services::report::ClassificationPolicy;

const APP_DIR_NAME: &str = "batchscan";
const CONFIG_FILE_NAME: &str = "batchscan.toml";
const CONFIG_ENV_VAR: &str = "BATCHSCAN_CONFIG_PATH";
const QUEUE_FILE_NAME: &str = "queue.json";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    tail_lines: Option<usize>,
    workers: Option<usize>,
    on_classification_error: Option<ClassificationPolicy>,
    queue_path: Option<String>,
    slurm_user: Option<String>,
    #[serde(default)]
    kinds: BTreeMap<String, FileKind>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileKind {
    inputs: Vec<String>,
    #[serde(default)]
    checks: Vec<CompletionRule>,
}

#[derive(Debug)]
pub struct Config {
    pub tail_lines: usize,
    pub workers: usize,
    pub on_classification_error: ClassificationPolicy,
    pub queue_path: PathBuf,
    pub slurm_user: Option<String>,
    pub kinds: Arc<KindTable>,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Override,
    Env,
    ConfigFile,
    Default,
}

impl ConfigSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigSource::Override => "override",
            ConfigSource::Env => "env",
            ConfigSource::ConfigFile => "config",
            ConfigSource::Default => "default",
        }
    }
}

#[derive(Debug)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

#[derive(Debug)]
pub struct ConfigReport {
    pub config_path: Option<PathBuf>,
    pub config_path_source: Option<ConfigSource>,
    pub config_file_present: bool,
    pub tail_lines: ConfigValue<usize>,
    pub workers: ConfigValue<usize>,
    pub on_classification_error: ConfigValue<ClassificationPolicy>,
    pub queue_path: ConfigValue<PathBuf>,
    pub slurm_user: ConfigValue<Option<String>>,
    pub kinds: Vec<ConfigValue<JobKind>>,
}

#[derive(Debug)]
pub struct LoadResult {
    pub config: Config,
    pub report: ConfigReport,
}

#[derive(Debug, Default)]
pub struct Overrides {
    pub tail_lines: Option<usize>,
    pub workers: Option<usize>,
    pub on_classification_error: Option<ClassificationPolicy>,
}

pub fn load(config_path_override: Option<PathBuf>, overrides: Overrides) -> Result<Config> {
    Ok(load_with_report(config_path_override, overrides)?.config)
}

pub fn load_with_report(
    config_path_override: Option<PathBuf>,
    overrides: Overrides,
) -> Result<LoadResult> {
    let (config_path, config_path_source, required) = match config_path_override {
        Some(path) => (Some(expand_path(path)), Some(ConfigSource::Override), true),
        None => match config_path_from_env()? {
            Some(path) => (Some(expand_path(path)), Some(ConfigSource::Env), true),
            None => match default_config_path().ok() {
                Some(path) => (Some(path), Some(ConfigSource::Default), false),
                None => (None, None, false),
            },
        },
    };
    let config_file_present = config_path
        .as_deref()
        .map(|path| path.exists())
        .unwrap_or(false);

    let file_config = match config_path.as_deref() {
        Some(path) => read_config_file(path, required)?,
        None => FileConfig::default(),
    };
    let base_dir = config_path.as_deref().and_then(|path| path.parent());

    let (tail_lines, tail_lines_source) = pick(
        overrides.tail_lines,
        file_config.tail_lines,
        DEFAULT_TAIL_LINES,
    );
    if tail_lines == 0 {
        anyhow::bail!("tail_lines must be greater than zero");
    }

    let (workers, workers_source) =
        pick(overrides.workers, file_config.workers, default_workers());
    if workers == 0 {
        anyhow::bail!("workers must be greater than zero");
    }

    let (on_classification_error, policy_source) = pick(
        overrides.on_classification_error,
        file_config.on_classification_error,
        ClassificationPolicy::default(),
    );

    let (queue_path, queue_path_source) = match file_config.queue_path {
        Some(raw) => (resolve_path(&raw, base_dir), ConfigSource::ConfigFile),
        None => (
            default_queue_path().with_context(|| {
                "failed to resolve default queue path; set queue_path in the config file"
            })?,
            ConfigSource::Default,
        ),
    };

    let slurm_user = file_config
        .slurm_user
        .map(|user| user.trim().to_string())
        .filter(|user| !user.is_empty());
    let slurm_user_source = if slurm_user.is_some() {
        ConfigSource::ConfigFile
    } else {
        ConfigSource::Default
    };

    let mut kinds = KindTable::default();
    let mut kind_sources: BTreeMap<JobKind, ConfigSource> = JobKind::ALL
        .iter()
        .map(|kind| (*kind, ConfigSource::Default))
        .collect();
    for (name, file_kind) in file_config.kinds {
        let kind = JobKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .with_context(|| format!("unknown job kind [kinds.{name}]"))?;
        let spec = validate_kind(kind, file_kind)?;
        kinds = kinds.with_kind(kind, spec);
        kind_sources.insert(kind, ConfigSource::ConfigFile);
    }

    let config = Config {
        tail_lines,
        workers,
        on_classification_error,
        queue_path,
        slurm_user,
        kinds: Arc::new(kinds),
        config_path: config_path.clone(),
    };

    let report = ConfigReport {
        config_path,
        config_path_source,
        config_file_present,
        tail_lines: ConfigValue {
            value: config.tail_lines,
            source: tail_lines_source,
        },
        workers: ConfigValue {
            value: config.workers,
            source: workers_source,
        },
        on_classification_error: ConfigValue {
            value: config.on_classification_error,
            source: policy_source,
        },
        queue_path: ConfigValue {
            value: config.queue_path.clone(),
            source: queue_path_source,
        },
        slurm_user: ConfigValue {
            value: config.slurm_user.clone(),
            source: slurm_user_source,
        },
        kinds: kind_sources
            .into_iter()
            .map(|(value, source)| ConfigValue { value, source })
            .collect(),
    };

    Ok(LoadResult { config, report })
}

fn pick<T>(overridden: Option<T>, from_file: Option<T>, default: T) -> (T, ConfigSource) {
    match (overridden, from_file) {
        (Some(value), _) => (value, ConfigSource::Override),
        (None, Some(value)) => (value, ConfigSource::ConfigFile),
        (None, None) => (default, ConfigSource::Default),
    }
}

fn validate_kind(kind: JobKind, file_kind: FileKind) -> Result<KindSpec> {
    if file_kind.inputs.iter().all(|name| name.trim().is_empty()) {
        anyhow::bail!("kinds.{kind}.inputs must name at least one file");
    }
    if file_kind.inputs.iter().any(|name| name.trim().is_empty()) {
        anyhow::bail!("kinds.{kind}.inputs contains an empty file name");
    }
    if file_kind.checks.is_empty() {
        anyhow::bail!("kinds.{kind}.checks must contain at least one rule");
    }
    for rule in &file_kind.checks {
        if rule.file.trim().is_empty() {
            anyhow::bail!("kinds.{kind}.checks has a rule without a file");
        }
        if rule.marker.as_deref().is_some_and(str::is_empty) {
            anyhow::bail!("kinds.{kind}.checks marker for {} is empty", rule.file);
        }
        if rule.unique && rule.marker.is_none() {
            anyhow::bail!(
                "kinds.{kind}.checks rule for {} sets unique without a marker",
                rule.file
            );
        }
    }
    Ok(KindSpec::new(file_kind.inputs, file_kind.checks))
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn read_config_file(path: &Path, required: bool) -> Result<FileConfig> {
    if !path.exists() {
        if required {
            anyhow::bail!("config file not found at {}", path.display());
        }
        return Ok(FileConfig::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn resolve_path(raw: &str, base_dir: Option<&Path>) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() {
        return path;
    }
    match base_dir {
        Some(dir) => dir.join(path),
        None => path,
    }
}

fn expand_path(path: PathBuf) -> PathBuf {
    let path_string = path.to_string_lossy().to_string();
    let expanded = shellexpand::tilde(&path_string);
    PathBuf::from(expanded.as_ref())
}

fn config_path_from_env() -> Result<Option<PathBuf>> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(value) => {
            if value.is_empty() {
                anyhow::bail!("{CONFIG_ENV_VAR} is set but empty");
            }
            Ok(Some(PathBuf::from(value)))
        }
        None => Ok(None),
    }
}

fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("failed to resolve config directory")?;
    Ok(base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn default_queue_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("failed to resolve data directory")?;
    Ok(base.join(APP_DIR_NAME).join("submit").join(QUEUE_FILE_NAME))
}
