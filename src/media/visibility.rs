/// Shared visibility tracking
///
/// One tracker serves every loader of a gallery. Loaders register by
/// instance id; each registration fires at most once and is released as
/// soon as it fires, so callers see per-instance, trigger-once semantics.

use log::debug;
use std::collections::BTreeSet;

use crate::layout::Rect;
use crate::state::load::{InstanceId, VISIBILITY_THRESHOLD};

#[derive(Debug, Clone, Default)]
pub struct VisibilityTracker {
    watched: BTreeSet<InstanceId>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching an instance; returns false if it was already watched
    pub fn register(&mut self, instance: InstanceId) -> bool {
        self.watched.insert(instance)
    }

    /// Stop watching an instance; returns false if it was not watched
    pub fn unregister(&mut self, instance: InstanceId) -> bool {
        self.watched.remove(&instance)
    }

    pub fn is_watching(&self, instance: InstanceId) -> bool {
        self.watched.contains(&instance)
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Evaluate watched targets against the viewport
    ///
    /// Returns the instances whose intersection ratio reached the threshold,
    /// with that ratio. They are unregistered before returning.
    pub fn observe<I>(&mut self, viewport: Rect, targets: I) -> Vec<(InstanceId, f32)>
    where
        I: IntoIterator<Item = (InstanceId, Rect)>,
    {
        let mut fired = Vec::new();

        for (instance, target) in targets {
            if !self.watched.contains(&instance) {
                continue;
            }

            let ratio = intersection_ratio(&target, &viewport);
            if ratio >= VISIBILITY_THRESHOLD {
                self.watched.remove(&instance);
                debug!("Instance {} visible ({:.0}%)", instance, ratio * 100.0);
                fired.push((instance, ratio));
            }
        }

        fired
    }
}

/// Fraction of `target`'s area inside `viewport`
///
/// A zero-area target counts as fully visible when it touches the viewport.
pub fn intersection_ratio(target: &Rect, viewport: &Rect) -> f32 {
    match target.intersection(viewport) {
        None => 0.0,
        Some(overlap) => {
            let area = target.area();
            if area <= 0.0 {
                1.0
            } else {
                (overlap.area() / area).clamp(0.0, 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn test_ratio() {
        let target = Rect::new(0.0, 700.0, 100.0, 200.0);
        assert!((intersection_ratio(&target, &viewport()) - 0.5).abs() < 1e-6);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 900.0, 10.0, 10.0), &viewport()), 0.0);
        assert_eq!(intersection_ratio(&Rect::new(5.0, 5.0, 0.0, 0.0), &viewport()), 1.0);
    }

    #[test]
    fn test_fires_at_threshold_and_releases() {
        let mut tracker = VisibilityTracker::new();
        let a = InstanceId(1);
        tracker.register(a);

        // 5% visible
        let fired = tracker.observe(viewport(), [(a, Rect::new(0.0, 790.0, 100.0, 200.0))]);
        assert!(fired.is_empty());
        assert!(tracker.is_watching(a));

        // 10% visible
        let fired = tracker.observe(viewport(), [(a, Rect::new(0.0, 780.0, 100.0, 200.0))]);
        assert_eq!(fired.len(), 1);
        assert!(!tracker.is_watching(a));

        // scrolling back in does not fire again
        let fired = tracker.observe(viewport(), [(a, Rect::new(0.0, 0.0, 100.0, 200.0))]);
        assert!(fired.is_empty());
    }

    #[test]
    fn test_instances_are_independent() {
        let mut tracker = VisibilityTracker::new();
        let (a, b, c) = (InstanceId(1), InstanceId(2), InstanceId(3));
        tracker.register(a);
        tracker.register(b);

        let fired = tracker.observe(
            viewport(),
            [
                (a, Rect::new(0.0, 0.0, 100.0, 100.0)),
                (b, Rect::new(0.0, 2000.0, 100.0, 100.0)),
                (c, Rect::new(0.0, 0.0, 100.0, 100.0)),
            ],
        );

        assert_eq!(fired.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![a]);
        assert!(tracker.is_watching(b));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_unregister_stops_observation() {
        let mut tracker = VisibilityTracker::new();
        let a = InstanceId(4);
        assert!(tracker.register(a));
        assert!(!tracker.register(a));
        assert!(tracker.unregister(a));
        assert!(tracker.is_empty());

        let fired = tracker.observe(viewport(), [(a, Rect::new(0.0, 0.0, 10.0, 10.0))]);
        assert!(fired.is_empty());
    }
}
