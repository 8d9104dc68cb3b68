//! Pixel-space strokes and markers on the braille canvas.

use crate::braille::BrailleCanvas;

/// Outline weight
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stroke {
    Thin,
    /// Doubled right and down, for the selected region
    Thick,
}

/// Pixels from `a` to `b`, both ends included (Bresenham)
pub struct Segment {
    at: (i32, i32),
    end: (i32, i32),
    step: (i32, i32),
    dx: i32,
    dy: i32,
    err: i32,
    done: bool,
}

impl Segment {
    pub fn new(a: (i32, i32), b: (i32, i32)) -> Self {
        let dx = (b.0 - a.0).abs();
        let dy = -(b.1 - a.1).abs();
        Self {
            at: a,
            end: b,
            step: (if a.0 < b.0 { 1 } else { -1 }, if a.1 < b.1 { 1 } else { -1 }),
            dx,
            dy,
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for Segment {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        if self.done {
            return None;
        }
        let p = self.at;
        if p == self.end {
            self.done = true;
            return Some(p);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.at.0 += self.step.0;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.at.1 += self.step.1;
        }
        Some(p)
    }
}

pub fn stroke_segment(canvas: &mut BrailleCanvas, a: (i32, i32), b: (i32, i32), stroke: Stroke) {
    for (x, y) in Segment::new(a, b) {
        canvas.set_pixel_signed(x, y);
        if stroke == Stroke::Thick {
            canvas.set_pixel_signed(x + 1, y);
            canvas.set_pixel_signed(x, y + 1);
        }
    }
}

/// Polyline through projected points. Segments rejected by `keep` are skipped
/// but the path continues from their far end.
pub fn stroke_path(
    canvas: &mut BrailleCanvas,
    points: impl IntoIterator<Item = (i32, i32)>,
    stroke: Stroke,
    keep: impl Fn((i32, i32), (i32, i32)) -> bool,
) {
    let mut prev: Option<(i32, i32)> = None;
    for p in points {
        if let Some(a) = prev {
            if keep(a, p) {
                stroke_segment(canvas, a, p, stroke);
            }
        }
        prev = Some(p);
    }
}

/// Filled disc; radius 0 is a single pixel
pub fn fill_disc(canvas: &mut BrailleCanvas, center: (i32, i32), radius: i32) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                canvas.set_pixel_signed(center.0 + dx, center.1 + dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_includes_both_ends() {
        let pts: Vec<_> = Segment::new((0, 0), (3, 1)).collect();
        assert_eq!(pts.first(), Some(&(0, 0)));
        assert_eq!(pts.last(), Some(&(3, 1)));
        assert_eq!(pts.len(), 4);
        assert_eq!(Segment::new((2, 2), (2, 2)).count(), 1);
    }

    #[test]
    fn test_horizontal_stroke() {
        let mut canvas = BrailleCanvas::new(5, 1);
        stroke_segment(&mut canvas, (0, 0), (9, 0), Stroke::Thin);
        // Top dots of every cell
        assert_eq!(canvas.row_to_string(0), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_stroke() {
        let mut canvas = BrailleCanvas::new(1, 2);
        stroke_segment(&mut canvas, (0, 7), (0, 0), Stroke::Thin);
        assert_eq!(canvas.glyph(0, 0), Some('⡇'));
        assert_eq!(canvas.glyph(0, 1), Some('⡇'));
    }

    #[test]
    fn test_path_skips_rejected_segments() {
        let mut canvas = BrailleCanvas::new(4, 1);
        // The jump from x=1 to x=6 is rejected, then 6 → 7 is drawn
        stroke_path(&mut canvas, [(0, 0), (1, 0), (6, 0), (7, 0)], Stroke::Thin, |a, b| {
            (b.0 - a.0).abs() < 3
        });
        assert_eq!(canvas.row_to_string(0), "⠉⠀⠀⠉");
    }

    #[test]
    fn test_disc_radius_zero_is_one_dot() {
        let mut canvas = BrailleCanvas::new(2, 2);
        fill_disc(&mut canvas, (1, 1), 0);
        assert_eq!(canvas.glyph(0, 0), Some('⠐'));
        assert_eq!(canvas.glyph(1, 0), None);
    }
}
