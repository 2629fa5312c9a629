use std::f64::consts::PI;

use crate::stats::MonthlyStats;

pub const DEFAULT_LABEL_FRACTION: f64 = 0.65;

/// Pure geometry for the segmented mood wheel.
///
/// Angles follow screen convention: 0 points at 3 o'clock and positive
/// angles turn clockwise because y grows downward. The first segment
/// starts at 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialLayout {
    /// Fraction of the chart radius at which label anchors sit.
    pub label_fraction: f64,
}

impl RadialLayout {
    pub fn new(label_fraction: f64) -> Self {
        Self { label_fraction }
    }

    /// Lays the month's stats out as contiguous sweeps covering one
    /// full turn, one segment per stat in the same order. A month with
    /// no entries yields no segments; callers must render their own
    /// empty notice instead of a degenerate wheel. Output depends only
    /// on the arguments, so a resize can recompute it at any time.
    pub fn layout(&self, stats: &MonthlyStats, radius: f64) -> Vec<LayoutEntry> {
        if stats.total == 0 {
            return Vec::new();
        }
        let total = stats.total as f64;
        let label_radius = radius * self.label_fraction;
        let mut start = -PI / 2.0;
        let mut entries = Vec::with_capacity(stats.stats.len());
        for stat in &stats.stats {
            let fraction = stat.count as f64 / total;
            let sweep = fraction * 2.0 * PI;
            let mid = start + sweep / 2.0;
            entries.push(LayoutEntry {
                emotion: stat.emotion.clone(),
                count: stat.count,
                fraction,
                start_angle: start,
                sweep_angle: sweep,
                label_x: mid.cos() * label_radius,
                label_y: mid.sin() * label_radius,
            });
            start += sweep;
        }
        entries
    }
}

impl Default for RadialLayout {
    fn default() -> Self {
        Self {
            label_fraction: DEFAULT_LABEL_FRACTION,
        }
    }
}

/// One wheel segment plus the anchor for its label.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEntry {
    pub emotion: String,
    pub count: usize,
    /// Share of the month total, in `0.0..=1.0`.
    pub fraction: f64,
    pub start_angle: f64,
    pub sweep_angle: f64,
    /// Label anchor offset from the wheel's center.
    pub label_x: f64,
    pub label_y: f64,
}

impl LayoutEntry {
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep_angle
    }
}
