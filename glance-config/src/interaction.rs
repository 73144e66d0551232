//! Tuning knobs for the simulated operator: pointer paths, timings, scrolling.
//!
//! Every struct deserializes with defaults for missing fields, so a config
//! file only needs to mention what it changes.
use serde::{Deserialize, Serialize};

/// Inclusive millisecond range sampled uniformly for randomized pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Bounds ordered low-to-high, tolerating a swapped config entry.
    pub fn bounds(&self) -> (u64, u64) {
        if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub pointer: PointerConfig,
    pub scroll: ScrollConfig,
    pub settle: SettleConfig,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            pointer: PointerConfig::default(),
            scroll: ScrollConfig::default(),
            settle: SettleConfig::default(),
        }
    }
}

impl InteractionConfig {
    /// Same geometry as the default profile but with every pause removed.
    ///
    /// ```
    /// use glance_config::InteractionConfig;
    ///
    /// let cfg = InteractionConfig::instant();
    /// assert_eq!(cfg.pointer.step_delay.max_ms, 0);
    /// assert_eq!(cfg.pointer.hesitation_probability, 0.0);
    /// assert_eq!(cfg.scroll.wheel_steps, 3);
    /// ```
    pub fn instant() -> Self {
        let mut cfg = Self::default();
        cfg.pointer.step_delay = DelayRange::zero();
        cfg.pointer.hesitation_probability = 0.0;
        cfg.pointer.hesitation = DelayRange::zero();
        cfg.pointer.hold = DelayRange::zero();
        cfg.scroll.wheel_pause = DelayRange::zero();
        cfg.scroll.pre_scroll_pause_ms = 0;
        cfg.settle = SettleConfig {
            after_scroll_into_view_ms: 0,
            after_retry_scroll_ms: 0,
            dropdown_open_ms: 0,
            ready_poll_ms: 0,
            ..cfg.settle
        };
        cfg
    }
}

/// Shape and pacing of the virtual pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Where the virtual pointer rests before the first movement.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Travel distance covered by one path step before clamping.
    pub pixels_per_step: f64,
    pub min_steps: usize,
    pub max_steps: usize,
    /// Maximum control-point offset as a fraction of the travel distance.
    pub curvature: f64,
    /// Jitter is `min(max_jitter, distance / jitter_divisor)`.
    pub max_jitter: f64,
    pub jitter_divisor: f64,
    /// Fraction of the path at each end that stays jitter-free.
    pub steady_margin: f64,
    pub step_delay: DelayRange,
    pub hesitation_probability: f64,
    pub hesitation: DelayRange,
    /// How long the button stays pressed during a click.
    pub hold: DelayRange,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            origin_x: 100.0,
            origin_y: 100.0,
            pixels_per_step: 20.0,
            min_steps: 10,
            max_steps: 40,
            curvature: 0.2,
            max_jitter: 10.0,
            jitter_divisor: 50.0,
            steady_margin: 0.1,
            step_delay: DelayRange::new(10, 30),
            hesitation_probability: 0.05,
            hesitation: DelayRange::new(100, 300),
            hold: DelayRange::new(50, 150),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Number of wheel increments for one `up`/`down` unit.
    pub wheel_steps: u32,
    pub wheel_delta: f64,
    pub wheel_pause: DelayRange,
    /// Pause after parking the pointer at the viewport centre.
    pub pre_scroll_pause_ms: u64,
    /// Distance of the single coarse scroll used as a fallback.
    pub fallback_delta: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            wheel_steps: 3,
            wheel_delta: 100.0,
            wheel_pause: DelayRange::new(200, 400),
            pre_scroll_pause_ms: 300,
            fallback_delta: 300.0,
        }
    }
}

/// Fixed waits that let the page react before the next step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub after_scroll_into_view_ms: u64,
    pub after_retry_scroll_ms: u64,
    pub dropdown_open_ms: u64,
    pub ready_poll_ms: u64,
    pub ready_poll_attempts: u32,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            after_scroll_into_view_ms: 800,
            after_retry_scroll_ms: 1000,
            dropdown_open_ms: 1000,
            ready_poll_ms: 250,
            ready_poll_attempts: 8,
        }
    }
}
