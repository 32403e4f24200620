//! Splits one closed glyph contour into exactly two pieces with a randomized
//! chord through its centroid. A candidate chord is valid when it crosses the
//! boundary at least twice and the boolean divide yields exactly two
//! non-sliver pieces; anything else redraws at a new angle, up to a hard cap.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BooleanOps, Centroid, Coord, Line, LineString, Polygon};
use rand::Rng;
use smallvec::SmallVec;

/// Chord extends this far on each side of the centroid (total length 2000).
pub const CHORD_HALF_LEN: f64 = 1000.0;
/// Default redraw cap before the contour falls back to a single fragment.
pub const MAX_SPLIT_ATTEMPTS: u32 = 50;
/// Pieces below this share of the source area are clipping slivers, not fragments.
const MIN_PIECE_AREA_RATIO: f64 = 1e-6;
/// Intersection points closer than this along the chord count as one crossing.
const CROSSING_MERGE_EPS: f64 = 1e-9;

/// Result of one contour decomposition.
#[derive(Debug, Clone)]
pub enum SplitOutcome {
    /// Two non-overlapping pieces whose union reconstructs the contour.
    Pair(Polygon<f64>, Polygon<f64>),
    /// Retry cap exhausted (or degenerate contour); ships as one body.
    Unsplit(Polygon<f64>),
}

impl SplitOutcome {
    pub fn pieces(self) -> Vec<Polygon<f64>> {
        match self {
            SplitOutcome::Pair(a, b) => vec![a, b],
            SplitOutcome::Unsplit(p) => vec![p],
        }
    }
}

/// Split `outline` with a chord at a uniformly random angle in [0, pi),
/// redrawn up to `max_attempts` times.
pub fn split_outline<R: Rng + ?Sized>(
    outline: &Polygon<f64>,
    max_attempts: u32,
    rng: &mut R,
) -> SplitOutcome {
    let Some(centroid) = outline.centroid() else {
        return SplitOutcome::Unsplit(outline.clone());
    };
    let center = Coord {
        x: centroid.x(),
        y: centroid.y(),
    };
    for _ in 0..max_attempts {
        let theta = rng.gen_range(0.0..std::f64::consts::PI);
        if let Some((a, b)) = try_chord_split(outline, center, theta) {
            return SplitOutcome::Pair(a, b);
        }
    }
    SplitOutcome::Unsplit(outline.clone())
}

fn try_chord_split(
    outline: &Polygon<f64>,
    center: Coord<f64>,
    theta: f64,
) -> Option<(Polygon<f64>, Polygon<f64>)> {
    let dir = Coord {
        x: theta.cos(),
        y: theta.sin(),
    };
    let chord = Line::new(
        Coord {
            x: center.x - dir.x * CHORD_HALF_LEN,
            y: center.y - dir.y * CHORD_HALF_LEN,
        },
        Coord {
            x: center.x + dir.x * CHORD_HALF_LEN,
            y: center.y + dir.y * CHORD_HALF_LEN,
        },
    );

    // The trimmed chord runs from the first to the last boundary crossing;
    // fewer than two crossings means a tangent or fully external candidate.
    let crossings = chord_crossings(outline, &chord, center, dir);
    if crossings.len() < 2 {
        return None;
    }

    let (side_a, side_b) = half_plane_quads(center, dir);
    let total_area = outline.unsigned_area();
    let mut pieces: Vec<Polygon<f64>> = Vec::with_capacity(2);
    for side in [&side_a, &side_b] {
        for piece in outline.intersection(side) {
            if piece.unsigned_area() > total_area * MIN_PIECE_AREA_RATIO {
                pieces.push(piece);
            }
        }
    }
    if pieces.len() != 2 {
        return None;
    }
    let b = pieces.pop()?;
    let a = pieces.pop()?;
    Some((a, b))
}

/// Boundary crossings ordered by projection along the chord direction.
fn chord_crossings(
    outline: &Polygon<f64>,
    chord: &Line<f64>,
    center: Coord<f64>,
    dir: Coord<f64>,
) -> SmallVec<[Coord<f64>; 8]> {
    let mut hits: SmallVec<[(f64, Coord<f64>); 8]> = SmallVec::new();
    for edge in outline.exterior().lines() {
        match line_intersection(*chord, edge) {
            Some(LineIntersection::SinglePoint { intersection, .. }) => {
                let t = (intersection.x - center.x) * dir.x + (intersection.y - center.y) * dir.y;
                hits.push((t, intersection));
            }
            // A collinear overlap means the chord grazes an edge; let the
            // piece-count check reject the candidate if it matters.
            Some(LineIntersection::Collinear { .. }) | None => {}
        }
    }
    hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let mut out: SmallVec<[Coord<f64>; 8]> = SmallVec::new();
    let mut last_t = f64::NEG_INFINITY;
    for (t, p) in hits {
        if t - last_t > CROSSING_MERGE_EPS {
            out.push(p);
        }
        last_t = t;
    }
    out
}

/// Two quads flanking the chord line, each large enough to cover the whole
/// reachable outline (chord length on one axis, 2 * CHORD_HALF_LEN on the other).
fn half_plane_quads(center: Coord<f64>, dir: Coord<f64>) -> (Polygon<f64>, Polygon<f64>) {
    let normal = Coord {
        x: -dir.y,
        y: dir.x,
    };
    let quad = |sign: f64| {
        let a = Coord {
            x: center.x - dir.x * CHORD_HALF_LEN,
            y: center.y - dir.y * CHORD_HALF_LEN,
        };
        let b = Coord {
            x: center.x + dir.x * CHORD_HALF_LEN,
            y: center.y + dir.y * CHORD_HALF_LEN,
        };
        let reach = 2.0 * CHORD_HALF_LEN * sign;
        let c = Coord {
            x: b.x + normal.x * reach,
            y: b.y + normal.y * reach,
        };
        let d = Coord {
            x: a.x + normal.x * reach,
            y: a.y + normal.y * reach,
        };
        Polygon::new(LineString::new(vec![a, b, c, d, a]), vec![])
    };
    (quad(1.0), quad(-1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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

    #[test]
    fn square_splits_into_equal_halves() {
        let outline = square(50.0);
        let total = outline.unsigned_area();
        let mut rng = StdRng::seed_from_u64(7);
        let SplitOutcome::Pair(a, b) = split_outline(&outline, MAX_SPLIT_ATTEMPTS, &mut rng) else {
            panic!("square must split");
        };
        let (aa, ab) = (a.unsigned_area(), b.unsigned_area());
        assert!((aa + ab - total).abs() < total * 1e-6, "area not conserved");
        assert!((aa - total / 2.0).abs() < total * 0.05, "uneven halves: {aa} vs {ab}");
    }

    #[test]
    fn degenerate_contour_falls_back_unsplit() {
        // Zero-area contour has no centroid-splittable interior.
        let line = Polygon::new(
            LineString::new(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 10.0, y: 0.0 },
                Coord { x: 0.0, y: 0.0 },
            ]),
            vec![],
        );
        let mut rng = StdRng::seed_from_u64(1);
        match split_outline(&line, 10, &mut rng) {
            SplitOutcome::Unsplit(_) => {}
            SplitOutcome::Pair(..) => panic!("degenerate contour must not split"),
        }
    }

    #[test]
    fn zero_attempts_always_unsplit() {
        let mut rng = StdRng::seed_from_u64(2);
        match split_outline(&square(10.0), 0, &mut rng) {
            SplitOutcome::Unsplit(_) => {}
            SplitOutcome::Pair(..) => panic!("cap of zero must skip splitting"),
        }
    }

    #[test]
    fn crossings_are_ordered_and_deduped() {
        let outline = square(50.0);
        let chord = Line::new(
            Coord { x: -CHORD_HALF_LEN, y: 0.0 },
            Coord { x: CHORD_HALF_LEN, y: 0.0 },
        );
        let hits = chord_crossings(
            &outline,
            &chord,
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
        );
        assert_eq!(hits.len(), 2);
        assert!(hits[0].x < hits[1].x);
        assert!((hits[0].x + 50.0).abs() < 1e-9);
        assert!((hits[1].x - 50.0).abs() < 1e-9);
    }
}
