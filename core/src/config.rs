//! Immutable tunables handed to the world at round start.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Every adjustable parameter of a chase session.
///
/// Values are loaded once (typically from TOML) and validated before the
/// world is built. The world copies the configuration and never mutates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChaseConfig {
    /// Edge length of a square cell in pixels.
    pub tile_size: f32,
    /// Offset in pixels applied to both axes before the first cell.
    pub padding: f32,
    /// Player travel speed in pixels per second.
    pub player_speed: f32,
    /// Adversary travel speed in pixels per second.
    pub adversary_speed: f32,
    /// Number of coins seeded at round start, capped by the free road cells.
    pub coin_count: u32,
    /// Score awarded for each collected coin.
    pub coin_value: u32,
    /// Pickup radius expressed as a fraction of `tile_size`.
    pub pickup_radius_ratio: f32,
    /// Upper bound in seconds applied to every tick's elapsed time.
    pub max_tick_secs: f32,
    /// Frame-rate cap used by drivers that step the simulation at a fixed rate.
    pub frame_rate_cap: u32,
    /// Seed for spawn and coin placement.
    pub seed: u64,
    /// Adversary planning policy.
    pub planner: PlannerConfig,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            padding: 0.0,
            player_speed: 180.0,
            adversary_speed: 140.0,
            coin_count: 10,
            coin_value: 10,
            pickup_radius_ratio: 0.48,
            max_tick_secs: 0.05,
            frame_rate_cap: 60,
            seed: DEFAULT_SEED,
            planner: PlannerConfig::default(),
        }
    }
}

impl ChaseConfig {
    /// Checks that every tunable lies in its admissible range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tile_size", self.tile_size)?;
        positive("player_speed", self.player_speed)?;
        positive("adversary_speed", self.adversary_speed)?;
        positive("pickup_radius_ratio", self.pickup_radius_ratio)?;
        positive("max_tick_secs", self.max_tick_secs)?;
        positive("planner.interval_secs", self.planner.interval_secs)?;
        representable("max_tick_secs", self.max_tick_secs)?;
        representable("planner.interval_secs", self.planner.interval_secs)?;

        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(ConfigError::NegativePadding(self.padding));
        }
        if self.frame_rate_cap == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        Ok(())
    }

    /// Pickup radius in pixels.
    #[must_use]
    pub fn pickup_radius(&self) -> f32 {
        self.pickup_radius_ratio * self.tile_size
    }

    /// Largest elapsed time a single tick may consume.
    #[must_use]
    pub fn max_tick(&self) -> Duration {
        secs_to_duration(self.max_tick_secs)
    }

    /// Duration of one frame at the configured frame-rate cap.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate_cap.max(1)
    }
}

/// Selects how the adversary's next step is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannerMode {
    /// Plan synchronously on every tick while the adversary is idle.
    #[default]
    Immediate,
    /// Plan in the background at most once per interval.
    Throttled,
}

/// Parameters of the adversary planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Planning policy.
    pub mode: PlannerMode,
    /// Minimum seconds between throttled plan requests.
    pub interval_secs: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            mode: PlannerMode::Immediate,
            interval_secs: 0.18,
        }
    }
}

impl PlannerConfig {
    /// Minimum time between throttled plan requests.
    #[must_use]
    pub fn interval(&self) -> Duration {
        secs_to_duration(self.interval_secs)
    }
}

/// Reasons a configuration is rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A size, speed, ratio or interval was zero, negative or not finite.
    #[error("`{field}` must be a positive finite number, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// Padding must be finite and non-negative.
    #[error("`padding` must be a non-negative finite number, got {0}")]
    NegativePadding(f32),
    /// A number of seconds is too large to express as a duration.
    #[error("`{field}` is out of range for a duration, got {value}")]
    DurationOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// The frame-rate cap must be at least one frame per second.
    #[error("`frame_rate_cap` must be at least 1")]
    ZeroFrameRate,
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn representable(field: &'static str, value: f32) -> Result<(), ConfigError> {
    match Duration::try_from_secs_f32(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(ConfigError::DurationOutOfRange { field, value }),
    }
}

/// Converts seconds to a duration rounded to whole microseconds.
///
/// Going through `f64` keeps decimal settings such as `0.05` exact; negative
/// and NaN inputs become zero and oversized inputs saturate.
fn secs_to_duration(secs: f32) -> Duration {
    let micros = (f64::from(secs) * 1_000_000.0).round();
    Duration::from_micros(micros as u64)
}
