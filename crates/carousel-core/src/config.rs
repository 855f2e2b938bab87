//! Configuration loading and typed config structures for the carousel
//! simulation.
//!
//! The canonical configuration lives in `carousel-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads, overrides from the
//! environment, and validates the file. Every field has a default, so a
//! partial (or empty) file is a valid configuration.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// Environment variable overriding `observer.port`.
pub const ENV_OBSERVER_PORT: &str = "CAROUSEL_OBSERVER_PORT";

/// Environment variable overriding `world.seed`.
pub const ENV_SEED: &str = "CAROUSEL_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `carousel-config.yaml`. Defaults reproduce the
/// reference carousel: speed 2 per tick, spawns every 1.5 to 3 seconds,
/// and a 3x3 grid whose first row is priority.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, tick pacing).
    #[serde(default)]
    pub world: WorldConfig,

    /// Carousel track and spawn parameters.
    #[serde(default)]
    pub carousel: CarouselConfig,

    /// Storage grid layout.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Host API server settings.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CAROUSEL_OBSERVER_PORT` overrides `observer.port`
    /// - `CAROUSEL_SEED` overrides `world.seed`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply environment overrides,
    /// and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_overrides_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides using `lookup` to resolve environment variables.
    ///
    /// Unparseable override values are logged and ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(ENV_OBSERVER_PORT) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.observer.port = port,
                Err(e) => warn!(variable = ENV_OBSERVER_PORT, value = %raw, error = %e, "Ignoring override"),
            }
        }
        if let Some(raw) = lookup(ENV_SEED) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.world.seed = seed,
                Err(e) => warn!(variable = ENV_SEED, value = %raw, error = %e, "Ignoring override"),
            }
        }
    }

    /// Check cross-field invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.carousel.validate()?;
        self.storage.validate()?;
        if self.world.drive == TickDriver::Host && !self.observer.enabled {
            return Err(invalid(
                "world.drive is host but observer.enabled is false: nothing could tick".to_owned(),
            ));
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for the spawn-interval RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between ticks when the engine drives its own
    /// clock.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Which side supplies ticks to the session.
    #[serde(default)]
    pub drive: TickDriver,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            drive: TickDriver::default(),
        }
    }
}

/// The single source of ticks for a session.
///
/// Exactly one clock may feed a carousel, so the engine either runs its own
/// tick loop or accepts ticks from the host API, never both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickDriver {
    /// The engine's tick loop paces the session; host tick requests are
    /// refused.
    #[default]
    Engine,
    /// The host calls `onTick(now)` with its own clock; no tick loop runs.
    Host,
}

/// How far an item moves on a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionModel {
    /// Fixed `speed` per tick regardless of wall-clock spacing. Tick rate
    /// determines the effective speed.
    #[default]
    PerTick,
    /// `speed` per reference frame, scaled by the elapsed time since the
    /// previous tick.
    Elapsed,
}

/// How the engine mints item identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// `prefix-1`, `prefix-2`, ... counted per engine instance.
    #[default]
    Sequential,
    /// `prefix-<uuid v7>`.
    TimeOrdered,
}

/// Carousel track and spawn configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CarouselConfig {
    /// Distance an item moves per tick (or per reference frame).
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Lower bound of the randomized spawn interval.
    #[serde(default = "default_min_spawn_interval_ms")]
    pub min_spawn_interval_ms: u32,

    /// Upper bound of the randomized spawn interval.
    #[serde(default = "default_max_spawn_interval_ms")]
    pub max_spawn_interval_ms: u32,

    /// Width of one item along the track.
    #[serde(default = "default_item_width")]
    pub item_width: f64,

    /// Extra offset beyond the item width at which items spawn.
    #[serde(default = "default_spawn_margin")]
    pub spawn_margin: f64,

    /// Minimum distance the previous item must have travelled past the
    /// spawn point before another item can spawn.
    #[serde(default = "default_min_spacing")]
    pub min_spacing: f64,

    /// Slack beyond the visible track before an item is culled.
    #[serde(default = "default_exit_margin")]
    pub exit_margin: f64,

    /// Track width used until the host reports a measurement.
    #[serde(default = "default_initial_track_width")]
    pub initial_track_width: f64,

    /// Whether movement starts suspended.
    #[serde(default)]
    pub reduced_motion: bool,

    /// Per-tick or elapsed-time movement.
    #[serde(default)]
    pub motion: MotionModel,

    /// Length of one reference frame for [`MotionModel::Elapsed`].
    #[serde(default = "default_reference_frame_ms")]
    pub reference_frame_ms: u32,

    /// Prefix for minted item identifiers.
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Identifier scheme.
    #[serde(default)]
    pub id_scheme: IdScheme,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            min_spawn_interval_ms: default_min_spawn_interval_ms(),
            max_spawn_interval_ms: default_max_spawn_interval_ms(),
            item_width: default_item_width(),
            spawn_margin: default_spawn_margin(),
            min_spacing: default_min_spacing(),
            exit_margin: default_exit_margin(),
            initial_track_width: default_initial_track_width(),
            reduced_motion: false,
            motion: MotionModel::default(),
            reference_frame_ms: default_reference_frame_ms(),
            id_prefix: default_id_prefix(),
            id_scheme: IdScheme::default(),
        }
    }
}

impl CarouselConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let lengths = [
            ("carousel.speed", self.speed),
            ("carousel.item_width", self.item_width),
            ("carousel.spawn_margin", self.spawn_margin),
            ("carousel.min_spacing", self.min_spacing),
            ("carousel.exit_margin", self.exit_margin),
            ("carousel.initial_track_width", self.initial_track_width),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{name} must be a finite non-negative number (got {value})"
                )));
            }
        }
        if self.min_spawn_interval_ms > self.max_spawn_interval_ms {
            return Err(invalid(format!(
                "carousel.min_spawn_interval_ms ({}) exceeds max_spawn_interval_ms ({})",
                self.min_spawn_interval_ms, self.max_spawn_interval_ms
            )));
        }
        if self.min_spacing <= self.item_width {
            return Err(invalid(format!(
                "carousel.min_spacing ({}) must exceed item_width ({})",
                self.min_spacing, self.item_width
            )));
        }
        if self.reference_frame_ms == 0 {
            return Err(invalid("carousel.reference_frame_ms must be at least 1".to_owned()));
        }
        Ok(())
    }
}

/// Storage grid layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Total number of cells.
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,

    /// Number of columns the grid is laid out in.
    #[serde(default = "default_grid_columns")]
    pub grid_columns: u32,

    /// Number of leading cells flagged priority.
    #[serde(default = "default_priority_count")]
    pub priority_count: u32,

    /// Prefix for cell identifiers (`cell-0`, `cell-1`, ...).
    #[serde(default = "default_cell_prefix")]
    pub cell_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            grid_columns: default_grid_columns(),
            priority_count: default_priority_count(),
            cell_prefix: default_cell_prefix(),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(invalid("storage.grid_size must be at least 1".to_owned()));
        }
        if self.grid_columns == 0 {
            return Err(invalid("storage.grid_columns must be at least 1".to_owned()));
        }
        if self.grid_size.checked_rem(self.grid_columns) != Some(0) {
            return Err(invalid(format!(
                "storage.grid_size ({}) must be a multiple of grid_columns ({})",
                self.grid_size, self.grid_columns
            )));
        }
        if self.priority_count > self.grid_size {
            return Err(invalid(format!(
                "storage.priority_count ({}) exceeds grid_size ({})",
                self.priority_count, self.grid_size
            )));
        }
        Ok(())
    }
}

/// Simulation boundary parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Stop after this many wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

/// Host API server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether to start the HTTP server at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bind address.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Luggage Carousel".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    16
}

const fn default_speed() -> f64 {
    2.0
}

const fn default_min_spawn_interval_ms() -> u32 {
    1500
}

const fn default_max_spawn_interval_ms() -> u32 {
    3000
}

const fn default_item_width() -> f64 {
    64.0
}

const fn default_spawn_margin() -> f64 {
    20.0
}

const fn default_min_spacing() -> f64 {
    150.0
}

const fn default_exit_margin() -> f64 {
    100.0
}

const fn default_initial_track_width() -> f64 {
    800.0
}

const fn default_reference_frame_ms() -> u32 {
    16
}

fn default_id_prefix() -> String {
    "luggage".to_owned()
}

const fn default_grid_size() -> u32 {
    9
}

const fn default_grid_columns() -> u32 {
    3
}

const fn default_priority_count() -> u32 {
    3
}

fn default_cell_prefix() -> String {
    "cell".to_owned()
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
