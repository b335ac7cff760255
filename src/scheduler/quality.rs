use crate::scheduler::stats::PerformanceMetrics;

/// Adaptive quality advice settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QualityOpts {
    /// Run assessments at all.
    pub enabled: bool,
    /// Tick time between assessments, in milliseconds.
    pub interval_ms: f64,
    /// Frame rate below which an assessment counts as low.
    pub low_fps: f64,
    /// Frame rate above which an assessment counts as high.
    pub high_fps: f64,
    /// Consecutive low (or high) assessments needed before advice is issued.
    pub sustain_checks: u32,
}

impl Default for QualityOpts {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 1000.0,
            low_fps: 45.0,
            high_fps: 58.0,
            sustain_checks: 3,
        }
    }
}

/// Advice delivered to quality subscribers.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct QualityChange {
    /// `-1` to lower quality, `+1` to raise it.
    pub delta: i32,
    /// Metrics at the assessment that triggered the advice.
    pub metrics: PerformanceMetrics,
}

/// Counts consecutive low and high assessments on a tick-time cadence.
#[derive(Clone, Debug)]
pub(crate) struct QualityMonitor {
    opts: QualityOpts,
    next_check_ms: Option<f64>,
    low_streak: u32,
    high_streak: u32,
}

impl QualityMonitor {
    pub(crate) fn new(opts: QualityOpts) -> Self {
        Self {
            opts,
            next_check_ms: None,
            low_streak: 0,
            high_streak: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.next_check_ms = None;
        self.low_streak = 0;
        self.high_streak = 0;
    }

    /// Feed one tick. Returns advice when a streak reaches `sustain_checks`.
    pub(crate) fn observe(
        &mut self,
        now_ms: f64,
        metrics: &PerformanceMetrics,
    ) -> Option<QualityChange> {
        if !self.opts.enabled {
            return None;
        }
        let Some(due) = self.next_check_ms else {
            self.next_check_ms = Some(now_ms + self.opts.interval_ms);
            return None;
        };
        if now_ms < due {
            return None;
        }
        self.next_check_ms = Some(now_ms + self.opts.interval_ms);
        self.assess(metrics)
    }

    fn assess(&mut self, metrics: &PerformanceMetrics) -> Option<QualityChange> {
        let sustain = self.opts.sustain_checks.max(1);
        let advice = if metrics.fps < self.opts.low_fps {
            self.low_streak += 1;
            self.high_streak = 0;
            (self.low_streak >= sustain).then_some(-1)
        } else if metrics.fps > self.opts.high_fps {
            self.high_streak += 1;
            self.low_streak = 0;
            (self.high_streak >= sustain).then_some(1)
        } else {
            self.low_streak = 0;
            self.high_streak = 0;
            None
        };
        let delta = advice?;

        self.low_streak = 0;
        self.high_streak = 0;
        Some(QualityChange {
            delta,
            metrics: *metrics,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/quality.rs"]
mod tests;
