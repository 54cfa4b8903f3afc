use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Default, Debug)]
pub struct TrackProgress {
    current_position_millis: AtomicU64,
    total_duration_millis: AtomicU64,
    generation: AtomicU64,
}

impl TrackProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current_position(&self, position: Duration) {
        self.current_position_millis
            .store(position.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn set_total_duration(&self, duration: Duration) {
        self.total_duration_millis
            .store(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// `(position, total)` in milliseconds.
    pub fn get_progress(&self) -> (u64, u64) {
        (
            self.current_position_millis.load(Ordering::Relaxed),
            self.total_duration_millis.load(Ordering::Relaxed),
        )
    }

    pub fn ratio(&self) -> f64 {
        let (pos, total) = self.get_progress();
        if total == 0 {
            0.0
        } else {
            (pos as f64 / total as f64).clamp(0.0, 1.0)
        }
    }

    pub fn get_generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.set_current_position(Duration::ZERO);
        self.set_total_duration(Duration::ZERO);
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_clamped() {
        let p = TrackProgress::new();
        assert_eq!(p.ratio(), 0.0);
        p.set_total_duration(Duration::from_secs(10));
        p.set_current_position(Duration::from_secs(5));
        assert_eq!(p.ratio(), 0.5);
        p.set_current_position(Duration::from_secs(20));
        assert_eq!(p.ratio(), 1.0);
    }

    #[test]
    fn reset_bumps_generation() {
        let p = TrackProgress::new();
        p.set_current_position(Duration::from_secs(3));
        assert_eq!(p.reset(), 1);
        assert_eq!(p.get_generation(), 1);
        assert_eq!(p.get_progress(), (0, 0));
    }
}
