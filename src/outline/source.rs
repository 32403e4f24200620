//! Outline source: turns a string into closed vector contours positioned
//! along a baseline. Consumers treat this as a black box yielding one
//! `GlyphOutline` per closed glyph contour; multi-contour glyphs (i, %, ...)
//! yield several, each split independently downstream.

use anyhow::anyhow;
use bevy::math::Vec2;
use bevy::prelude::{info, warn};
use geo::{Coord, LineString, Polygon};

/// Line segments per quadratic bézier when flattening.
const QUAD_SEGMENTS: u32 = 8;
/// Line segments per cubic bézier when flattening.
const CUBIC_SEGMENTS: u32 = 12;
/// Contours with fewer boundary points than this are degenerate and dropped.
const MIN_CONTOUR_POINTS: usize = 3;

/// One closed contour of a laid-out glyph, in world units (y-up).
#[derive(Debug, Clone)]
pub struct GlyphOutline {
    /// Index of the source character within the input string.
    pub char_index: usize,
    /// Closed boundary ring.
    pub ring: LineString<f64>,
}

impl GlyphOutline {
    pub fn polygon(&self) -> Polygon<f64> {
        Polygon::new(self.ring.clone(), vec![])
    }
}

/// Try each candidate path in order; first readable file wins. `None` keeps
/// the effect idle (missing geometry is a precondition, not an error).
pub fn load_font_data(search_paths: &[String]) -> Option<Vec<u8>> {
    for path in search_paths {
        match std::fs::read(path) {
            Ok(bytes) => {
                if ttf_parser::Face::parse(&bytes, 0).is_ok() {
                    info!(target: "outline", "Loaded font '{path}'");
                    return Some(bytes);
                }
                warn!(target: "outline", "'{path}' is not a parsable TTF; skipping");
            }
            Err(e) => warn!(target: "outline", "Cannot read font '{path}': {e}"),
        }
    }
    warn!(
        target: "outline",
        "No usable font among {} candidate path(s); effect stays idle",
        search_paths.len()
    );
    None
}

/// Lay out `text` on a baseline starting at `origin`, scaled so the whole
/// string spans approximately `target_width`, and return every closed glyph
/// contour. Whitespace advances the pen without emitting contours.
pub fn outlines(
    font_data: &[u8],
    text: &str,
    origin: Vec2,
    target_width: f32,
) -> anyhow::Result<Vec<GlyphOutline>> {
    let face = ttf_parser::Face::parse(font_data, 0)
        .map_err(|e| anyhow!("parse font face: {e}"))?;

    // First pass: total advance in font units, for the width-fitting scale.
    let mut total_advance: f64 = 0.0;
    for ch in text.chars() {
        let Some(glyph) = face.glyph_index(ch) else { continue };
        total_advance += face.glyph_hor_advance(glyph).unwrap_or(0) as f64;
    }
    if total_advance <= 0.0 {
        return Err(anyhow!("no outlinable glyphs in {text:?}"));
    }
    let scale = target_width as f64 / total_advance;

    let mut result = Vec::new();
    let mut pen_x = origin.x as f64;
    for (char_index, ch) in text.chars().enumerate() {
        let Some(glyph) = face.glyph_index(ch) else {
            warn!(target: "outline", "No glyph for {ch:?}; skipped");
            continue;
        };
        let advance = face.glyph_hor_advance(glyph).unwrap_or(0) as f64 * scale;
        if !ch.is_whitespace() {
            let mut collector = ContourCollector::new(scale, pen_x, origin.y as f64);
            if face.outline_glyph(glyph, &mut collector).is_some() {
                for ring in collector.finish() {
                    result.push(GlyphOutline { char_index, ring });
                }
            }
        }
        pen_x += advance;
    }
    if result.is_empty() {
        return Err(anyhow!("text {text:?} produced no contours"));
    }
    Ok(result)
}

/// Flattens the ttf-parser outline callbacks into closed polyline rings.
/// Font units are y-up, matching world space, so only scale + pen offset apply.
struct ContourCollector {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    current: Vec<Coord<f64>>,
    contours: Vec<LineString<f64>>,
}

impl ContourCollector {
    fn new(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            scale,
            offset_x,
            offset_y,
            current: Vec::new(),
            contours: Vec::new(),
        }
    }

    fn map(&self, x: f32, y: f32) -> Coord<f64> {
        Coord {
            x: self.offset_x + x as f64 * self.scale,
            y: self.offset_y + y as f64 * self.scale,
        }
    }

    fn last(&self) -> Coord<f64> {
        *self.current.last().unwrap_or(&Coord { x: 0.0, y: 0.0 })
    }

    fn flush(&mut self) {
        if self.current.len() >= MIN_CONTOUR_POINTS {
            let mut ring = std::mem::take(&mut self.current);
            if ring.first() != ring.last() {
                ring.push(ring[0]);
            }
            self.contours.push(LineString::new(ring));
        } else {
            self.current.clear();
        }
    }

    fn finish(mut self) -> Vec<LineString<f64>> {
        self.flush();
        self.contours
    }
}

impl ttf_parser::OutlineBuilder for ContourCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        let p = self.map(x, y);
        self.current.push(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.current.push(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let from = self.last();
        let ctrl = self.map(x1, y1);
        let to = self.map(x, y);
        for i in 1..=QUAD_SEGMENTS {
            let t = i as f64 / QUAD_SEGMENTS as f64;
            let u = 1.0 - t;
            self.current.push(Coord {
                x: u * u * from.x + 2.0 * u * t * ctrl.x + t * t * to.x,
                y: u * u * from.y + 2.0 * u * t * ctrl.y + t * t * to.y,
            });
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let from = self.last();
        let c1 = self.map(x1, y1);
        let c2 = self.map(x2, y2);
        let to = self.map(x, y);
        for i in 1..=CUBIC_SEGMENTS {
            let t = i as f64 / CUBIC_SEGMENTS as f64;
            let u = 1.0 - t;
            self.current.push(Coord {
                x: u * u * u * from.x
                    + 3.0 * u * u * t * c1.x
                    + 3.0 * u * t * t * c2.x
                    + t * t * t * to.x,
                y: u * u * u * from.y
                    + 3.0 * u * u * t * c1.y
                    + 3.0 * u * t * t * c2.y
                    + t * t * t * to.y,
            });
        }
    }

    fn close(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttf_parser::OutlineBuilder;

    #[test]
    fn collector_emits_closed_rings() {
        let mut c = ContourCollector::new(1.0, 0.0, 0.0);
        c.move_to(0.0, 0.0);
        c.line_to(10.0, 0.0);
        c.line_to(10.0, 10.0);
        c.line_to(0.0, 10.0);
        c.close();
        let rings = c.finish();
        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert_eq!(ring.0.first(), ring.0.last());
        assert!(ring.0.len() >= 5);
    }

    #[test]
    fn collector_drops_degenerate_contours() {
        let mut c = ContourCollector::new(1.0, 0.0, 0.0);
        c.move_to(0.0, 0.0);
        c.line_to(5.0, 0.0);
        c.close();
        assert!(c.finish().is_empty());
    }

    #[test]
    fn quad_flattening_subdivides() {
        let mut c = ContourCollector::new(1.0, 0.0, 0.0);
        c.move_to(0.0, 0.0);
        c.quad_to(5.0, 10.0, 10.0, 0.0);
        c.line_to(5.0, -5.0);
        c.close();
        let rings = c.finish();
        assert_eq!(rings.len(), 1);
        // 1 start + QUAD_SEGMENTS curve samples + 1 line + closing point.
        assert_eq!(rings[0].0.len(), 1 + QUAD_SEGMENTS as usize + 1 + 1);
    }

    #[test]
    fn pen_offset_and_scale_apply() {
        let mut c = ContourCollector::new(0.5, 100.0, -20.0);
        c.move_to(0.0, 0.0);
        c.line_to(10.0, 0.0);
        c.line_to(10.0, 10.0);
        c.close();
        let rings = c.finish();
        let first = rings[0].0[0];
        assert_eq!((first.x, first.y), (100.0, -20.0));
        let second = rings[0].0[1];
        assert_eq!((second.x, second.y), (105.0, -20.0));
    }
}
