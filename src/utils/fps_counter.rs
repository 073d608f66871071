use std::time::{Duration, Instant};

/// Frame-rate sampler.
///
/// Call [`tick`](Self::tick) once per presented frame. Every full second it
/// reports the average rate over that second; the editor shows it in the
/// window title.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
    accumulated_time: Duration,
    current_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    /// Reporting interval.
    pub const INTERVAL: Duration = Duration::from_secs(1);

    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
            accumulated_time: Duration::ZERO,
            current_fps: 0.0,
        }
    }

    /// Counts a frame presented now.
    pub fn update(&mut self) -> Option<f32> {
        let now = Instant::now();
        let delta = now - self.last_update;
        self.last_update = now;
        self.tick(delta)
    }

    /// Counts a frame that took `delta`. Returns the new rate once per
    /// [`INTERVAL`](Self::INTERVAL).
    pub fn tick(&mut self, delta: Duration) -> Option<f32> {
        self.frame_count += 1;
        self.accumulated_time += delta;

        if self.accumulated_time < Self::INTERVAL {
            return None;
        }

        self.current_fps = self.frame_count as f32 / self.accumulated_time.as_secs_f32();
        self.accumulated_time = Duration::ZERO;
        self.frame_count = 0;
        Some(self.current_fps)
    }

    /// Rate reported by the last completed interval.
    #[must_use]
    pub fn current_fps(&self) -> f32 {
        self.current_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_interval() {
        let mut counter = FpsCounter::new();
        let frame = Duration::from_millis(10);

        let reports: Vec<f32> = (0..250).filter_map(|_| counter.tick(frame)).collect();

        assert_eq!(reports.len(), 2);
        assert!((reports[0] - 100.0).abs() < 1.0, "got {}", reports[0]);
        assert!((counter.current_fps() - 100.0).abs() < 1.0);
    }
}
