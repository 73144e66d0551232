use crate::glance_browser::document::Point;
use glance_config::{DelayRange, PointerConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::sleep;

/// Produces human-like delays and pointer paths.
#[derive(Debug, Clone)]
pub struct BehavioralEngine {
    rng: StdRng,
}

impl Default for BehavioralEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BehavioralEngine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic engine for reproducible paths and timings.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick a duration in `range`, in milliseconds.
    pub fn sample_ms(&mut self, range: DelayRange) -> u64 {
        let (min, max) = range.bounds();
        self.rng.gen_range(min..=max)
    }

    /// Sleep for a random duration drawn from `range`.
    pub async fn random_delay(&mut self, range: DelayRange) {
        let ms = self.sample_ms(range);
        pause(ms).await;
    }

    /// `true` with probability `p` (clamped to `0..=1`).
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    pub fn plan_path(&mut self, from: Point, to: Point, cfg: &PointerConfig) -> Vec<Point> {
        plan_pointer_path(&mut self.rng, from, to, cfg)
    }
}

/// Fixed pause; zero returns immediately.
pub async fn pause(ms: u64) {
    if ms > 0 {
        sleep(Duration::from_millis(ms)).await;
    }
}

/// Quadratic Bézier path from `from` to `to`, both included.
///
/// The control point sits near the midpoint, offset by up to
/// `distance * curvature` on each axis. Interior points outside the steady
/// margins receive a small jitter; every point is rounded to whole pixels.
pub fn plan_pointer_path<R: Rng>(
    rng: &mut R,
    from: Point,
    to: Point,
    cfg: &PointerConfig,
) -> Vec<Point> {
    let distance = from.distance_to(to);
    let min_steps = cfg.min_steps.max(1);
    let max_steps = cfg.max_steps.max(min_steps);
    let raw_steps = if cfg.pixels_per_step > 0.0 {
        (distance / cfg.pixels_per_step) as usize
    } else {
        max_steps
    };
    let steps = raw_steps.clamp(min_steps, max_steps);

    let spread = distance * cfg.curvature;
    let (ox, oy) = if spread > 0.0 {
        (rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread))
    } else {
        (0.0, 0.0)
    };
    let ctrl = Point::new((from.x + to.x) / 2.0 + ox, (from.y + to.y) / 2.0 + oy);

    let jitter = if cfg.jitter_divisor > 0.0 {
        cfg.max_jitter.min(distance / cfg.jitter_divisor)
    } else {
        0.0
    };
    let lo = cfg.steady_margin;
    let hi = 1.0 - cfg.steady_margin;

    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let u = 1.0 - t;
            let mut x = u * u * from.x + 2.0 * u * t * ctrl.x + t * t * to.x;
            let mut y = u * u * from.y + 2.0 * u * t * ctrl.y + t * t * to.y;
            if jitter > 0.0 && t > lo && t < hi {
                x += rng.gen_range(-jitter..=jitter);
                y += rng.gen_range(-jitter..=jitter);
            }
            Point::new(x.round(), y.round())
        })
        .collect()
}
