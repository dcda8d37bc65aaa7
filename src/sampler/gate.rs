use std::time::{Duration, Instant};

use crate::sampler::color::SampledColor;

/// Decides whether a freshly sampled color should replace the displayed one.
///
/// Two independent policies, both configurable from the CLI:
/// - throttling: reject anything sampled less than `min_interval` after the
///   last accepted color (a zero interval disables this);
/// - change detection: reject colors within `distance_threshold` normalized
///   RGB distance of the last accepted color (zero disables).
///
/// Rejected samples leave the previous display value untouched.
pub struct UpdateGate {
    min_interval: Duration,
    distance_threshold: f64,
    last_accepted_at: Option<Instant>,
    previous: Option<SampledColor>,
}

impl UpdateGate {
    pub fn new(min_interval: Duration, distance_threshold: f64) -> Self {
        Self {
            min_interval,
            distance_threshold,
            last_accepted_at: None,
            previous: None,
        }
    }

    pub fn accept(&mut self, color: SampledColor) -> bool {
        self.accept_at(color, Instant::now())
    }

    fn accept_at(&mut self, color: SampledColor, now: Instant) -> bool {
        if !self.min_interval.is_zero() {
            if let Some(last) = self.last_accepted_at {
                if now.duration_since(last) < self.min_interval {
                    return false;
                }
            }
        }

        if self.distance_threshold > 0.0 {
            if let Some(previous) = self.previous {
                if color.distance_to(&previous) <= self.distance_threshold {
                    return false;
                }
            }
        }

        self.last_accepted_at = Some(now);
        self.previous = Some(color);
        true
    }

    /// The last accepted color, if any.
    pub fn current(&self) -> Option<SampledColor> {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_always_accepted() {
        let mut gate = UpdateGate::new(Duration::from_secs(1), 0.1);
        assert!(gate.accept(SampledColor::new(10, 20, 30)));
        assert_eq!(gate.current(), Some(SampledColor::new(10, 20, 30)));
    }

    #[test]
    fn test_throttle_rejects_within_interval() {
        let mut gate = UpdateGate::new(Duration::from_secs(1), 0.0);
        let start = Instant::now();

        assert!(gate.accept_at(SampledColor::new(0, 0, 0), start));
        assert!(!gate.accept_at(
            SampledColor::new(255, 255, 255),
            start + Duration::from_millis(500)
        ));
        assert!(gate.accept_at(
            SampledColor::new(255, 255, 255),
            start + Duration::from_millis(1500)
        ));
    }

    #[test]
    fn test_interval_restarts_on_acceptance_only() {
        let mut gate = UpdateGate::new(Duration::from_secs(1), 0.0);
        let start = Instant::now();

        assert!(gate.accept_at(SampledColor::new(0, 0, 0), start));
        // A rejected sample must not push the window forward
        assert!(!gate.accept_at(
            SampledColor::new(1, 1, 1),
            start + Duration::from_millis(900)
        ));
        assert!(gate.accept_at(
            SampledColor::new(2, 2, 2),
            start + Duration::from_millis(1100)
        ));
    }

    #[test]
    fn test_change_detection_rejects_near_identical() {
        let mut gate = UpdateGate::new(Duration::ZERO, 0.1);
        let start = Instant::now();

        assert!(gate.accept_at(SampledColor::new(100, 100, 100), start));
        // 10/255 per channel ~ 0.068 distance: visually identical
        assert!(!gate.accept_at(SampledColor::new(110, 100, 100), start));
        assert_eq!(gate.current(), Some(SampledColor::new(100, 100, 100)));

        assert!(gate.accept_at(SampledColor::new(200, 100, 100), start));
        assert_eq!(gate.current(), Some(SampledColor::new(200, 100, 100)));
    }

    #[test]
    fn test_zero_knobs_disable_policies() {
        let mut gate = UpdateGate::new(Duration::ZERO, 0.0);
        let start = Instant::now();

        assert!(gate.accept_at(SampledColor::new(1, 1, 1), start));
        assert!(gate.accept_at(SampledColor::new(1, 1, 1), start));
        assert!(gate.accept_at(SampledColor::new(2, 2, 2), start));
    }
}
