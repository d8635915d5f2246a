// Configuration loading and parsing (league.toml, pipeline.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::filter::{FilterOrder, OccupancyFilter};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub provider: ProviderConfig,
    pub dataset: DatasetConfig,
    pub training: TrainingConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    provider: ProviderConfig,
}

/// Identifies the fantasy league whose rosters, box scores and player cards
/// are read.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub league_id: u64,
    pub year: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Athlete directory endpoint, including its page-size query.
    pub athletes_url: String,
    /// Base of the fantasy API, up to and including the game segment
    /// (e.g. `.../apis/v3/games/ffl`).
    pub fantasy_base_url: String,
    /// Maximum number of player-card requests in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    8
}

// ---------------------------------------------------------------------------
// pipeline.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire pipeline.toml file.
#[derive(Debug, Clone, Deserialize)]
struct PipelineFile {
    dataset: DatasetConfig,
    training: TrainingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Directory every generated csv is written to (and read back from).
    pub output_dir: String,
    /// Denylist csv: one substring per row, no header.
    pub columns_to_drop: String,
    #[serde(default = "default_global_filter")]
    pub global_filter: OccupancyFilter,
    #[serde(default = "default_position_filter")]
    pub position_filter: OccupancyFilter,
}

fn default_global_filter() -> OccupancyFilter {
    OccupancyFilter {
        threshold: 0.5,
        order: FilterOrder::ColumnsThenRows,
    }
}

fn default_position_filter() -> OccupancyFilter {
    OccupancyFilter {
        threshold: 0.1,
        order: FilterOrder::RowsThenColumns,
    }
}

impl DatasetConfig {
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.output_dir).join(file_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Week whose `{week}_{target_stat}` column is the regression target.
    pub target_week: u32,
    #[serde(default = "default_target_stat")]
    pub target_stat: String,
    #[serde(default)]
    pub excluded_positions: Vec<String>,
    pub test_fraction: f64,
    pub validation_fraction: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub patience: usize,
    pub learning_rate: f64,
    pub dropout: f64,
    pub hidden_units: [usize; 2],
    /// Seed for the train/test split and epoch shuffling. Unseeded runs are
    /// not reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_target_stat() -> String {
    "pointsScored".to_string()
}

impl TrainingConfig {
    /// Name of the target column, e.g. `14_pointsScored`.
    pub fn target_column(&self) -> String {
        format!("{}_{}", self.target_week, self.target_stat)
    }
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

/// Session cookies forwarded verbatim to the fantasy API. Both are absent
/// for public leagues.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub espn_s2: Option<String>,
    pub swid: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml`,
/// `config/pipeline.toml`, and (optionally) `config/credentials.toml`,
/// all relative to the given `base_dir`.
///
/// Does not copy defaults. Prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_file: LeagueFile = parse_file(&league_path)?;

    let pipeline_path = config_dir.join("pipeline.toml");
    let pipeline_file: PipelineFile = parse_file(&pipeline_path)?;

    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        parse_file(&credentials_path)?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        league: league_file.league,
        provider: league_file.provider,
        dataset: pipeline_file.dataset,
        training: pipeline_file.training,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` from `defaults/`, copying only files that are missing.
/// `.example` templates stay behind. Returns the files written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        return if config_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            })
        };
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| copy_err("create", &config_dir, e))?;
    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| copy_err("read", &defaults_dir, e))?;

    let mut copied = Vec::new();
    for entry in entries {
        let source = entry.map_err(|e| copy_err("read", &defaults_dir, e))?.path();
        let Some(name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        if Path::new(name).extension().is_some_and(|ext| ext == "example") {
            continue;
        }
        let target = config_dir.join(name);
        if copy_if_missing(&source, &target)? {
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Copy `source` to `target` unless `target` already exists. The existence
/// check and creation are one `create_new` open.
fn copy_if_missing(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_err("create", target, e)),
    };
    let mut src = std::fs::File::open(source).map_err(|e| copy_err("read", source, e))?;
    std::io::copy(&mut src, &mut dest).map_err(|e| copy_err("write", target, e))?;
    Ok(true)
}

fn copy_err(action: &str, path: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::DefaultsCopyError {
        message: format!("failed to {action} {}: {e}", path.display()),
    }
}

/// Loads config relative to the current working directory, copying any
/// missing files from `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if !(2000..=2100).contains(&config.league.year) {
        return Err(invalid(
            "league.year",
            format!("must be a season year, got {}", config.league.year),
        ));
    }

    if config.provider.concurrency == 0 {
        return Err(invalid("provider.concurrency", "must be greater than 0".into()));
    }

    let filters = [
        ("dataset.global_filter.threshold", config.dataset.global_filter.threshold),
        ("dataset.position_filter.threshold", config.dataset.position_filter.threshold),
    ];
    for (field, value) in filters {
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(
                field,
                format!("must be between 0.0 and 1.0 inclusive, got {value}"),
            ));
        }
    }

    let training = &config.training;
    let fractions = [
        ("training.test_fraction", training.test_fraction),
        ("training.validation_fraction", training.validation_fraction),
    ];
    for (field, value) in fractions {
        if value <= 0.0 || value >= 1.0 {
            return Err(invalid(
                field,
                format!("must be strictly between 0.0 and 1.0, got {value}"),
            ));
        }
    }

    if !(0.0..1.0).contains(&training.dropout) {
        return Err(invalid(
            "training.dropout",
            format!("must be in [0.0, 1.0), got {}", training.dropout),
        ));
    }

    let counts: &[(&str, usize)] = &[
        ("training.epochs", training.epochs),
        ("training.batch_size", training.batch_size),
        ("training.patience", training.patience),
        ("training.hidden_units[0]", training.hidden_units[0]),
        ("training.hidden_units[1]", training.hidden_units[1]),
    ];
    for (field, value) in counts {
        if *value == 0 {
            return Err(invalid(field, "must be > 0".into()));
        }
    }

    if training.learning_rate <= 0.0 || !training.learning_rate.is_finite() {
        return Err(invalid(
            "training.learning_rate",
            format!("must be > 0, got {}", training.learning_rate),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
