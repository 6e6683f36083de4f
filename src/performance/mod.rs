//! # Frame Timing
//!
//! Produces the per-frame delta time fed to the simulation host and keeps a short
//! history of frame times for the selector panel.
//!
//! ## Usage
//!
//! ```rust
//! use simdeck::performance::{FrameClock, FrameStats};
//!
//! let mut clock = FrameClock::new(0.25);
//! let mut stats = FrameStats::new();
//!
//! // In your main loop
//! let dt = clock.tick();
//! stats.record(dt);
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Measures the time between frames
///
/// Deltas are never negative and never exceed `max_frame_dt`, so a stalled frame
/// (window drag, breakpoint) does not throw the simulations forward.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame: Option<Instant>,
    max_frame_dt: f32,
}

impl FrameClock {
    /// # Arguments
    /// * `max_frame_dt` - Largest delta in seconds ever reported
    pub fn new(max_frame_dt: f32) -> Self {
        Self {
            last_frame: None,
            max_frame_dt: max_frame_dt.max(0.0),
        }
    }

    /// Delta since the previous tick, measured now
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Delta since the previous tick, measured at `now`. The first tick returns 0.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = match self.last_frame {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_frame = Some(now);
        delta.clamp(0.0, self.max_frame_dt)
    }

    /// Forget the previous frame, e.g. after the window was suspended
    pub fn reset(&mut self) {
        self.last_frame = None;
    }

    pub fn max_frame_dt(&self) -> f32 {
        self.max_frame_dt
    }
}

/// Frame time statistics over a rolling window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    /// Frames per second derived from the average frame time
    pub fps: f32,
    /// Average frame time in milliseconds
    pub frame_time_ms: f32,
    /// Minimum frame time in the current window
    pub min_frame_time_ms: f32,
    /// Maximum frame time in the current window
    pub max_frame_time_ms: f32,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time_ms: 0.0,
            min_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
        }
    }
}

/// Rolling window of recent frame times
pub struct FrameStats {
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    metrics: FrameMetrics,
}

impl FrameStats {
    /// Keeps about two seconds at 60 fps
    pub fn new() -> Self {
        Self::with_samples(120)
    }

    pub fn with_samples(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
            metrics: FrameMetrics::default(),
        }
    }

    /// Add a frame time sample in seconds and refresh the metrics
    pub fn record(&mut self, frame_time: f32) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times
            .push_back(Duration::from_secs_f32(frame_time.max(0.0)));
        self.update_metrics();
    }

    fn update_metrics(&mut self) {
        if self.frame_times.is_empty() {
            self.metrics = FrameMetrics::default();
            return;
        }

        let total_time: Duration = self.frame_times.iter().sum();
        let avg_frame_time_ms =
            total_time.as_secs_f32() * 1000.0 / self.frame_times.len() as f32;

        self.metrics.frame_time_ms = avg_frame_time_ms;
        self.metrics.fps = if avg_frame_time_ms > 0.0 {
            1000.0 / avg_frame_time_ms
        } else {
            0.0
        };

        if let (Some(min_time), Some(max_time)) =
            (self.frame_times.iter().min(), self.frame_times.iter().max())
        {
            self.metrics.min_frame_time_ms = min_time.as_secs_f32() * 1000.0;
            self.metrics.max_frame_time_ms = max_time.as_secs_f32() * 1000.0;
        }
    }

    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.frame_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_times.is_empty()
    }

    /// Frame times in milliseconds, oldest first, for graphing
    pub fn frame_time_history(&self) -> Vec<f32> {
        self.frame_times
            .iter()
            .map(|duration| duration.as_secs_f32() * 1000.0)
            .collect()
    }

    pub fn reset(&mut self) {
        self.frame_times.clear();
        self.metrics = FrameMetrics::default();
    }

    /// Draws the FPS readout and frame time graph into the current window
    pub fn render_ui(&self, ui: &imgui::Ui) {
        let metrics = &self.metrics;
        ui.text(format!("FPS: {:.1}", metrics.fps));
        ui.same_line();
        ui.text(format!("Frame Time: {:.2}ms", metrics.frame_time_ms));
        ui.text(format!(
            "Min/Max: {:.2}ms / {:.2}ms",
            metrics.min_frame_time_ms, metrics.max_frame_time_ms
        ));

        if !self.frame_times.is_empty() {
            let frame_time_history = self.frame_time_history();
            ui.plot_lines("##frame_times", &frame_time_history)
                .graph_size([260.0, 50.0])
                .scale_min(0.0)
                .scale_max(50.0)
                .build();
        }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = FrameClock::new(0.25);
        assert_eq!(clock.tick_at(Instant::now()), 0.0);
    }

    #[test]
    fn test_tick_measures_elapsed_time() {
        let mut clock = FrameClock::new(0.25);
        let start = Instant::now();
        clock.tick_at(start);
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_tick_is_clamped() {
        let mut clock = FrameClock::new(0.25);
        let start = Instant::now();
        clock.tick_at(start);
        assert_eq!(clock.tick_at(start + Duration::from_secs(3)), 0.25);
    }

    #[test]
    fn test_tick_never_negative() {
        let mut clock = FrameClock::new(0.25);
        let start = Instant::now();
        clock.tick_at(start + Duration::from_millis(100));
        assert_eq!(clock.tick_at(start), 0.0);
    }

    #[test]
    fn test_reset_restarts_measurement() {
        let mut clock = FrameClock::new(1.0);
        let start = Instant::now();
        clock.tick_at(start);
        clock.reset();
        assert_eq!(clock.tick_at(start + Duration::from_millis(500)), 0.0);
    }

    #[test]
    fn test_stats_window() {
        let mut stats = FrameStats::with_samples(3);
        assert!(stats.is_empty());
        for dt in [0.010, 0.020, 0.030, 0.040] {
            stats.record(dt);
        }
        assert_eq!(stats.len(), 3);

        let metrics = stats.metrics();
        assert!((metrics.frame_time_ms - 30.0).abs() < 1e-3);
        assert!((metrics.fps - 1000.0 / 30.0).abs() < 1e-2);
        assert!((metrics.min_frame_time_ms - 20.0).abs() < 1e-3);
        assert!((metrics.max_frame_time_ms - 40.0).abs() < 1e-3);

        stats.reset();
        assert_eq!(stats.metrics(), &FrameMetrics::default());
    }
}
