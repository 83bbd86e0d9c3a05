//! Connector outlines between two positioned entities.
//!
//! A connector is a closed shape hanging on a vertical spine. Each side is a
//! chain of circular arcs whose diameters lie on the spine, pinched at a waist
//! halfway across the gap between the two entities.

use std::f64::consts::FRAC_PI_2;
use std::fmt::Write;

use crate::model::LinkKind;
use crate::scale::TimeScale;

use super::types::ConnectorAnchors;

/// Smallest allowed waist half-gap, so the waist points never coincide.
const MIN_PINCH: f64 = 0.01;

/// An axis-aligned band occupied by a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Band {
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line((f64, f64)),
    Cubic((f64, f64), (f64, f64), (f64, f64)),
}

impl Segment {
    pub fn end(&self) -> (f64, f64) {
        match *self {
            Segment::Line(p) | Segment::Cubic(_, _, p) => p,
        }
    }
}

/// A polyline of curve segments starting at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub start: (f64, f64),
    pub segments: Vec<Segment>,
}

impl Outline {
    pub fn end(&self) -> (f64, f64) {
        self.segments.last().map_or(self.start, Segment::end)
    }

    pub fn to_svg(&self) -> String {
        let mut d = String::new();
        write_point(&mut d, 'M', self.start);
        write_segments(&mut d, &self.segments);
        d
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPath {
    /// source top -> waist bottom -> target top
    pub top: Outline,
    /// target bottom -> waist top -> source bottom
    pub bottom: Outline,
    pub anchors: ConnectorAnchors,
}

impl ConnectorPath {
    /// Both sides joined by vertical closures along each entity's edge.
    pub fn closed_outline(&self) -> Outline {
        let mut segments = self.top.segments.clone();
        segments.push(Segment::Line(self.bottom.start));
        segments.extend_from_slice(&self.bottom.segments);
        segments.push(Segment::Line(self.top.start));
        Outline {
            start: self.top.start,
            segments,
        }
    }

    pub fn to_svg(&self) -> String {
        let mut d = self.closed_outline().to_svg();
        d.push_str(" Z");
        d
    }
}

fn write_point(d: &mut String, command: char, (x, y): (f64, f64)) {
    if !d.is_empty() {
        d.push(' ');
    }
    write!(d, "{command} {x:.2} {y:.2}").unwrap();
}

fn write_segments(d: &mut String, segments: &[Segment]) {
    for segment in segments {
        match *segment {
            Segment::Line(p) => write_point(d, 'L', p),
            Segment::Cubic((x1, y1), (x2, y2), (x, y)) => {
                write!(d, " C {x1:.2} {y1:.2} {x2:.2} {y2:.2} {x:.2} {y:.2}").unwrap();
            }
        }
    }
}

/// Builds connector geometry. Holds the shape parameters.
#[derive(Debug, Clone, Copy)]
pub struct ConnectorBuilder {
    pub waist_pinch: f64,
    pub lens_bulge: f64,
}

impl ConnectorBuilder {
    pub fn new(waist_pinch: f64, lens_bulge: f64) -> Self {
        Self {
            waist_pinch,
            lens_bulge,
        }
    }

    /// Connector between `source` and `target`, or `None` when the two sit on
    /// one lane and the link is a plain transition (drawn as a marker instead).
    pub fn build(
        &self,
        source: Band,
        target: Band,
        same_lane: bool,
        year: i32,
        kind: LinkKind,
        scale: &TimeScale,
    ) -> Option<ConnectorPath> {
        if same_lane && !kind.is_branching() {
            return None;
        }

        let x = spine_x(&source, &target, scale.x_of(year));

        let (gap_top, gap_bottom) = if source.y <= target.y {
            (source.bottom(), target.y)
        } else {
            (target.bottom(), source.y)
        };
        let waist_y = (gap_top + gap_bottom) / 2.0;
        let pinch = self
            .waist_pinch
            .min((gap_bottom - gap_top).abs() / 4.0)
            .max(MIN_PINCH);

        let anchors = ConnectorAnchors {
            spine_x: x,
            source_top: (x, source.y),
            source_bottom: (x, source.bottom()),
            target_top: (x, target.y),
            target_bottom: (x, target.bottom()),
            waist_top: (x, waist_y - pinch),
            waist_bottom: (x, waist_y + pinch),
        };

        let top = self.side(
            [anchors.source_top, anchors.waist_bottom, anchors.target_top],
            1.0,
            waist_y,
        );
        let bottom = self.side(
            [anchors.target_bottom, anchors.waist_top, anchors.source_bottom],
            -1.0,
            waist_y,
        );

        Some(ConnectorPath {
            top,
            bottom,
            anchors,
        })
    }

    /// Two arcs through three spine points, bulging towards `side` (+1 right, -1 left).
    fn side(&self, points: [(f64, f64); 3], side: f64, waist_y: f64) -> Outline {
        let [from, waist, to] = points;
        let mut segments = arc(from, waist, side);
        segments.extend(arc(waist, to, side));

        // Alternating quarters, starting at the entity edge.
        for segment in segments.iter_mut().step_by(2) {
            self.bulge(segment, side, waist_y, from.0);
        }

        Outline {
            start: from,
            segments,
        }
    }

    fn bulge(&self, segment: &mut Segment, side: f64, waist_y: f64, spine_x: f64) {
        let Segment::Cubic(c1, c2, end) = *segment else {
            return;
        };
        let push = |(x, y): (f64, f64)| {
            let dx = (x - spine_x).abs();
            let away = (y - waist_y).signum();
            (x + side * dx * self.lens_bulge, y + away * dx * self.lens_bulge)
        };
        *segment = Segment::Cubic(push(c1), push(c2), end);
    }
}

/// Spine position: the event year clamped into the shared horizontal span,
/// or the midpoint between facing edges when the spans do not overlap.
pub fn spine_x(source: &Band, target: &Band, event_x: f64) -> f64 {
    let lo = source.x.max(target.x);
    let hi = source.right().min(target.right());
    if lo <= hi {
        event_x.clamp(lo, hi)
    } else if source.x <= target.x {
        (source.right() + target.x) / 2.0
    } else {
        (target.right() + source.x) / 2.0
    }
}

/// Circular arc from `a` to `b` (same x) with the diameter on the segment ab,
/// as cubic Bezier segments of at most 90 degrees each.
fn arc(a: (f64, f64), b: (f64, f64), side: f64) -> Vec<Segment> {
    let r = (b.1 - a.1).abs() / 2.0;
    if r < 1e-9 {
        return vec![Segment::Line(b)];
    }
    let (cx, cy) = (a.0, (a.1 + b.1) / 2.0);

    let theta_a = if a.1 < b.1 { -FRAC_PI_2 } else { FRAC_PI_2 };
    let sweep = side * (-theta_a - theta_a);

    let steps = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
    let delta = sweep / steps as f64;
    let t = 4.0 / 3.0 * (delta / 4.0).tan();

    let point = |theta: f64| (cx + r * theta.cos(), cy + r * theta.sin());
    let tangent = |theta: f64| (-r * theta.sin(), r * theta.cos());

    let mut segments = Vec::with_capacity(steps);
    for i in 0..steps {
        let t0 = theta_a + delta * i as f64;
        let t1 = t0 + delta;
        let (p0, p3) = (point(t0), point(t1));
        let (d0, d1) = (tangent(t0), tangent(t1));
        let end = if i + 1 == steps { b } else { p3 };
        segments.push(Segment::Cubic(
            (p0.0 + t * d0.0, p0.1 + t * d0.1),
            (p3.0 - t * d1.0, p3.1 - t * d1.1),
            end,
        ));
    }
    segments
}
