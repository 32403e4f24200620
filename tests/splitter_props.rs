use geo::{Area, BoundingRect, Coord, LineString, Polygon};
use rand::rngs::StdRng;
use rand::SeedableRng;

use glyph_shatter::geometry::splitter::MAX_SPLIT_ATTEMPTS;
use glyph_shatter::{split_outline, SplitOutcome};

fn square(half: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::new(vec![
            Coord { x: -half, y: -half },
            Coord { x: half, y: -half },
            Coord { x: half, y: half },
            Coord { x: -half, y: half },
            Coord { x: -half, y: -half },
        ]),
        vec![],
    )
}

fn l_shape() -> Polygon<f64> {
    Polygon::new(
        LineString::new(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 40.0, y: 0.0 },
            Coord { x: 40.0, y: 15.0 },
            Coord { x: 15.0, y: 15.0 },
            Coord { x: 15.0, y: 50.0 },
            Coord { x: 0.0, y: 50.0 },
            Coord { x: 0.0, y: 0.0 },
        ]),
        vec![],
    )
}

#[test]
fn square_splits_1000_times_without_fallback() {
    let outline = square(50.0);
    let total = outline.unsigned_area();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    for i in 0..1000 {
        match split_outline(&outline, MAX_SPLIT_ATTEMPTS, &mut rng) {
            SplitOutcome::Pair(a, b) => {
                let (aa, ab) = (a.unsigned_area(), b.unsigned_area());
                assert!(
                    (aa + ab - total).abs() < total * 1e-6,
                    "iteration {i}: area not conserved ({aa} + {ab} != {total})"
                );
                // A chord through the centroid of a square bisects it; allow 5%.
                assert!(
                    (aa - total / 2.0).abs() < total * 0.05,
                    "iteration {i}: uneven halves ({aa} vs {ab})"
                );
            }
            SplitOutcome::Unsplit(_) => {
                panic!("iteration {i}: retry cap exhausted on a convex square")
            }
        }
    }
}

#[test]
fn concave_outline_splits_with_area_conserved() {
    let outline = l_shape();
    let total = outline.unsigned_area();
    let mut rng = StdRng::seed_from_u64(42);
    let mut splits = 0;
    for _ in 0..100 {
        if let SplitOutcome::Pair(a, b) = split_outline(&outline, MAX_SPLIT_ATTEMPTS, &mut rng) {
            splits += 1;
            let sum = a.unsigned_area() + b.unsigned_area();
            assert!((sum - total).abs() < total * 1e-6, "area not conserved: {sum} vs {total}");
        }
    }
    // Concave shapes reject some chords (3+ pieces) but must still split
    // almost always within the cap.
    assert!(splits > 90, "only {splits}/100 splits succeeded");
}

#[test]
fn pieces_carry_disjoint_bounds_along_some_axis() {
    // The two halves of a square sit on opposite sides of the chord; their
    // combined bounding boxes must still cover the original outline.
    let outline = square(30.0);
    let mut rng = StdRng::seed_from_u64(7);
    let SplitOutcome::Pair(a, b) = split_outline(&outline, MAX_SPLIT_ATTEMPTS, &mut rng) else {
        panic!("square must split");
    };
    let (ra, rb) = (a.bounding_rect().unwrap(), b.bounding_rect().unwrap());
    let eps = 1e-6;
    let min_x = ra.min().x.min(rb.min().x);
    let max_x = ra.max().x.max(rb.max().x);
    let min_y = ra.min().y.min(rb.min().y);
    let max_y = ra.max().y.max(rb.max().y);
    assert!((min_x + 30.0).abs() < eps && (max_x - 30.0).abs() < eps);
    assert!((min_y + 30.0).abs() < eps && (max_y - 30.0).abs() < eps);
}

#[test]
fn unsplit_fallback_preserves_outline() {
    let outline = square(10.0);
    let mut rng = StdRng::seed_from_u64(1);
    match split_outline(&outline, 0, &mut rng) {
        SplitOutcome::Unsplit(p) => {
            assert!((p.unsigned_area() - outline.unsigned_area()).abs() < 1e-9);
        }
        SplitOutcome::Pair(..) => panic!("zero attempts must fall back"),
    }
}
