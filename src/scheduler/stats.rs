use std::{collections::VecDeque, fmt};

/// Letter grade for frame pacing relative to the target frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum Grade {
    /// At least 95% of target.
    A,
    /// At least 85% of target.
    B,
    /// At least 70% of target.
    C,
    /// At least 50% of target.
    D,
    /// Below 50% of target, or no samples.
    F,
}

impl Grade {
    /// Grade for `fps / target_fps`.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.95 {
            Self::A
        } else if ratio >= 0.85 {
            Self::B
        } else if ratio >= 0.70 {
            Self::C
        } else if ratio >= 0.50 {
            Self::D
        } else {
            Self::F
        }
    }

    /// One letter worse, bottoming out at `F`.
    pub fn demote(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::C,
            Self::C => Self::D,
            Self::D | Self::F => Self::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(s)
    }
}

/// Snapshot of the rolling frame statistics.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PerformanceMetrics {
    /// Frames per second over the window.
    pub fps: f64,
    /// Mean frame delta, in milliseconds.
    pub average_frame_time_ms: f64,
    /// Population variance of the frame deltas, in ms².
    pub frame_time_variance: f64,
    /// Variance is below the stability threshold.
    pub stable: bool,
    /// Pacing grade.
    pub grade: Grade,
}

impl PerformanceMetrics {
    /// Metrics of an empty window.
    pub const EMPTY: Self = Self {
        fps: 0.0,
        average_frame_time_ms: 0.0,
        frame_time_variance: 0.0,
        stable: true,
        grade: Grade::F,
    };
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Fixed-size window of recent frame deltas.
#[derive(Clone, Debug)]
pub(crate) struct FrameWindow {
    deltas: VecDeque<f64>,
    capacity: usize,
}

impl FrameWindow {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            deltas: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, delta_ms: f64) {
        if self.deltas.len() == self.capacity {
            self.deltas.pop_front();
        }
        self.deltas.push_back(delta_ms);
    }

    pub(crate) fn clear(&mut self) {
        self.deltas.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.deltas.len()
    }

    pub(crate) fn fps(&self) -> f64 {
        let sum: f64 = self.deltas.iter().sum();
        if self.deltas.is_empty() || sum <= 0.0 {
            return 0.0;
        }
        self.deltas.len() as f64 / sum * 1000.0
    }

    pub(crate) fn metrics(&self, target_fps: f64, variance_threshold: f64) -> PerformanceMetrics {
        let n = self.deltas.len();
        if n == 0 {
            return PerformanceMetrics::EMPTY;
        }

        let sum: f64 = self.deltas.iter().sum();
        let mean = sum / n as f64;
        let variance = self.deltas.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64;
        let fps = self.fps();
        let stable = variance < variance_threshold;

        let mut grade = Grade::from_ratio(fps / target_fps);
        if !stable {
            grade = grade.demote();
        }

        PerformanceMetrics {
            fps,
            average_frame_time_ms: mean,
            frame_time_variance: variance,
            stable,
            grade,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/stats.rs"]
mod tests;
