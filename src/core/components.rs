use bevy::prelude::*;
use std::collections::VecDeque;

/// Travel history capacity. The bounding box is always derived from the
/// points currently inside this window, never from positions that have
/// been evicted.
pub const TRAVEL_HISTORY_CAP: usize = 200;

/// Weight of the previous value when folding the per-frame displacement
/// magnitude into `distance_ema` (0.9 old / 0.1 new).
pub const DISTANCE_EMA_KEEP: f32 = 0.9;

/// One half of a split glyph contour, simulated as an independent rigid body.
/// Physics state (translation, rotation, velocity) lives on the usual
/// `Transform`/`Velocity` components and is written only by the simulation;
/// this component holds the bookkeeping the force model owns.
#[derive(Component, Debug)]
pub struct Fragment {
    /// Stable id, also the key for render records (body i <-> drawable i).
    pub id: u32,
    /// Body position at creation time; anchor for the restoring force. Never mutated.
    pub rest_position: Vec2,
    /// Original local offset of the piece geometry; rotation in the emitted
    /// transform string pivots around this point.
    pub pivot_offset: Vec2,
    /// Recent positions, bounded FIFO.
    pub travel_history: VecDeque<Vec2>,
    /// Axis-aligned bounds over `travel_history`, seeded from the current
    /// position on the first observed frame.
    pub travel_bounds: Option<TravelBounds>,
    /// EMA of displacement magnitude from the scroll-adjusted rest position.
    /// Defined only after the first simulated frame.
    pub distance_ema: Option<f32>,
    /// Earliest time (seconds since startup) after which the annealing lift
    /// stops. 0 = not annealing. Monotonic: only ever extended.
    pub anneal_until: f64,
    /// Render-facing classification: stopped moving near home.
    pub settled: bool,
}

impl Fragment {
    pub fn new(id: u32, rest_position: Vec2) -> Self {
        Self {
            id,
            rest_position,
            pivot_offset: rest_position,
            travel_history: VecDeque::with_capacity(TRAVEL_HISTORY_CAP),
            travel_bounds: None,
            distance_ema: None,
            anneal_until: 0.0,
            settled: false,
        }
    }

    /// Record the current position: push into the history (evicting past
    /// capacity) and recompute the bounds over the retained window.
    pub fn push_travel(&mut self, position: Vec2) {
        self.travel_history.push_back(position);
        while self.travel_history.len() > TRAVEL_HISTORY_CAP {
            self.travel_history.pop_front();
        }
        let mut bounds = TravelBounds::seeded(position);
        for p in &self.travel_history {
            bounds.include(*p);
        }
        self.travel_bounds = Some(bounds);
    }

    /// Diagonal length of the travel bounds; 0 before the first observation.
    pub fn max_travel(&self) -> f32 {
        self.travel_bounds.map(|b| b.diagonal()).unwrap_or(0.0)
    }

    pub fn update_distance_ema(&mut self, magnitude: f32) {
        self.distance_ema = Some(match self.distance_ema {
            None => magnitude,
            Some(prev) => prev * DISTANCE_EMA_KEEP + magnitude * (1.0 - DISTANCE_EMA_KEEP),
        });
    }
}

/// Axis-aligned box over a fragment's travel history (y-up coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl TravelBounds {
    pub fn seeded(p: Vec2) -> Self {
        Self {
            left: p.x,
            right: p.x,
            top: p.y,
            bottom: p.y,
        }
    }

    pub fn include(&mut self, p: Vec2) {
        self.left = self.left.min(p.x);
        self.right = self.right.max(p.x);
        self.bottom = self.bottom.min(p.y);
        self.top = self.top.max(p.y);
    }

    pub fn diagonal(&self) -> f32 {
        Vec2::new(self.right - self.left, self.top - self.bottom).length()
    }

    /// Corner the annealing lift is applied at.
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.bottom && p.y <= self.top
    }
}

/// Marker for the four static viewport boundary bodies.
#[derive(Component)]
pub struct BoundaryWall;

/// Marker for the kinematic pointer collider disc.
#[derive(Component)]
pub struct PointerBall;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_history_never_exceeds_cap() {
        let mut frag = Fragment::new(0, Vec2::ZERO);
        for i in 0..(TRAVEL_HISTORY_CAP + 57) {
            frag.push_travel(Vec2::new(i as f32, -(i as f32)));
            assert!(frag.travel_history.len() <= TRAVEL_HISTORY_CAP);
        }
        assert_eq!(frag.travel_history.len(), TRAVEL_HISTORY_CAP);
    }

    #[test]
    fn bounds_contain_every_retained_point() {
        let mut frag = Fragment::new(0, Vec2::ZERO);
        for i in 0..500u32 {
            let p = Vec2::new((i as f32 * 0.7).sin() * 40.0, (i as f32 * 1.3).cos() * 25.0);
            frag.push_travel(p);
            let bounds = frag.travel_bounds.expect("bounds after push");
            for q in &frag.travel_history {
                assert!(bounds.contains(*q), "bounds {bounds:?} missing {q:?}");
            }
        }
    }

    #[test]
    fn ema_is_convex_combination() {
        let mut frag = Fragment::new(0, Vec2::ZERO);
        assert!(frag.distance_ema.is_none());
        frag.update_distance_ema(10.0);
        assert_eq!(frag.distance_ema, Some(10.0));
        frag.update_distance_ema(0.0);
        let ema = frag.distance_ema.unwrap();
        assert!((ema - 9.0).abs() < 1e-5);
        // Never jumps further than the instantaneous displacement.
        frag.update_distance_ema(100.0);
        let next = frag.distance_ema.unwrap();
        assert!(next > ema && next < 100.0);
    }

    #[test]
    fn bounds_shrink_when_old_extremes_evict() {
        let mut frag = Fragment::new(0, Vec2::ZERO);
        frag.push_travel(Vec2::new(1000.0, 0.0));
        for _ in 0..TRAVEL_HISTORY_CAP {
            frag.push_travel(Vec2::ZERO);
        }
        let bounds = frag.travel_bounds.unwrap();
        assert!(bounds.right < 1.0, "evicted extreme still in bounds: {bounds:?}");
    }
}
