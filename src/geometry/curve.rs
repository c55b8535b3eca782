use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::{GlowError, GlowResult};
use crate::foundation::math::wrap_arc;
use kurbo::{
    CubicBez, Line, ParamCurve, ParamCurveArclen, PathEl, PathSeg, QuadBez, Shape as _,
};

/// Accuracy passed to kurbo arc-length routines, in curve units.
pub(crate) const ARCLEN_ACCURACY: f64 = 1e-3;

const CLOSE_EPS: f64 = 1e-6;

/// Path data of the looping glyph used by the built-in loaders, in a 162x162 view box.
pub const LOADER_LOOP_PATH: &str = "M70.3853 148.98 \
C179.5 142.5 166.347 -3.95972 71.4235 1.02014 \
C-23.5 6 -21.9998 141.5 70.3853 148.98 \
C158 143.777 73.5 90 73.5 90 \
C36.5 62.5 51.1843 30 73.5 30 \
C95.8156 30 116.056 59.9065 73.5 90 \
C29 126 37.0001 131.5 42.5766 139.206 \
C47 142.5 55.9799 148.811 70.3853 148.98";

/// Immutable closed planar curve with a cached arc-length index.
///
/// Only the first subpath is used. An open subpath is closed with a straight segment.
#[derive(Clone, Debug)]
pub struct Curve {
    path: BezPath,
    segs: Vec<PathSeg>,
    ends: Vec<f64>,
    total_length: f64,
    view_box: Rect,
}

impl PartialEq for Curve {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.view_box == other.view_box
    }
}

impl Curve {
    /// Build a curve from a path, using its bounding box as the view box.
    pub fn new(path: BezPath) -> GlowResult<Self> {
        let view_box = path.bounding_box();
        Self::with_view_box(path, view_box)
    }

    /// Build a curve from a path with an explicit view box.
    pub fn with_view_box(path: BezPath, view_box: Rect) -> GlowResult<Self> {
        let segs = first_subpath_segments(&path)?;
        if !(view_box.x0.is_finite()
            && view_box.y0.is_finite()
            && view_box.x1.is_finite()
            && view_box.y1.is_finite())
        {
            return Err(GlowError::geometry("view box must be finite"));
        }

        let mut ends = Vec::with_capacity(segs.len());
        let mut acc = 0.0;
        for seg in &segs {
            acc += seg.arclen(ARCLEN_ACCURACY);
            ends.push(acc);
        }

        let mut closed = BezPath::new();
        if let Some(first) = segs.first() {
            closed.move_to(first.start());
            for seg in &segs {
                match *seg {
                    PathSeg::Line(l) => closed.line_to(l.p1),
                    PathSeg::Quad(q) => closed.quad_to(q.p1, q.p2),
                    PathSeg::Cubic(c) => closed.curve_to(c.p1, c.p2, c.p3),
                }
            }
            closed.close_path();
        }

        Ok(Self {
            path: closed,
            segs,
            ends,
            total_length: acc,
            view_box: view_box.abs(),
        })
    }

    /// Parse SVG path data (`d` attribute syntax).
    pub fn from_svg(d: &str) -> GlowResult<Self> {
        let path = BezPath::from_svg(d)
            .map_err(|e| GlowError::geometry(format!("parse svg path data: {e}")))?;
        Self::new(path)
    }

    /// Extract the first visible path of an SVG document, with its absolute transform applied.
    ///
    /// The document's size becomes the view box.
    #[tracing::instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
    pub fn from_svg_document(bytes: &[u8]) -> GlowResult<Self> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts)
            .map_err(|e| GlowError::geometry(format!("parse svg document: {e}")))?;

        let node = find_first_path(tree.root())
            .ok_or_else(|| GlowError::geometry("svg document contains no path"))?;
        let mut path = usvg_path_to_bez(node);
        let ts = node.abs_transform();
        let xf = Affine::new([
            f64::from(ts.sx),
            f64::from(ts.ky),
            f64::from(ts.kx),
            f64::from(ts.sy),
            f64::from(ts.tx),
            f64::from(ts.ty),
        ]);
        path.apply_affine(xf);

        let size = tree.size();
        let view_box = Rect::new(
            0.0,
            0.0,
            f64::from(size.width()),
            f64::from(size.height()),
        );
        tracing::debug!(w = view_box.width(), h = view_box.height(), "svg curve extracted");
        Self::with_view_box(path, view_box)
    }

    /// The looping glyph with its nested group transforms, in a 162x162 view box.
    pub fn loader_loop() -> GlowResult<Self> {
        let path = BezPath::from_svg(LOADER_LOOP_PATH)
            .map_err(|e| GlowError::geometry(format!("parse loader path: {e}")))?;
        let inner = Affine::scale_non_uniform(1.094_594_595, 1.08);
        let outer = Affine::translate((80.9, 80.87))
            * Affine::scale(0.92)
            * Affine::translate((-80.9, -80.87));
        let mut path = path;
        path.apply_affine(outer * inner);
        Self::with_view_box(path, Rect::new(0.0, 0.0, 162.0, 162.0))
    }

    /// A new curve with `xf` applied to the geometry and the view box.
    pub fn transformed(&self, xf: Affine) -> GlowResult<Self> {
        let mut path = self.path.clone();
        path.apply_affine(xf);
        Self::with_view_box(path, xf.transform_rect_bbox(self.view_box))
    }

    /// The closed path.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// View box in curve units.
    pub fn view_box(&self) -> Rect {
        self.view_box
    }

    /// Total arc length `L`.
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Number of segments after closing.
    pub fn segment_count(&self) -> usize {
        self.segs.len()
    }

    /// `true` when the curve has no measurable length.
    pub fn is_degenerate(&self) -> bool {
        self.total_length <= CLOSE_EPS
    }

    /// Point at arc length `s`, wrapped into `[0, L)`.
    ///
    /// A degenerate curve returns its start point (or the origin when empty).
    pub fn point_at_length(&self, s: f64) -> Point {
        let Some(first) = self.segs.first() else {
            return Point::ORIGIN;
        };
        if self.is_degenerate() {
            return first.start();
        }
        let s = wrap_arc(s, self.total_length);
        let i = self
            .ends
            .partition_point(|&e| e <= s)
            .min(self.segs.len() - 1);
        let start = if i == 0 { 0.0 } else { self.ends[i - 1] };
        let seg = self.segs[i];
        let local = (s - start).max(0.0);
        let seg_len = self.ends[i] - start;
        if seg_len <= CLOSE_EPS {
            return seg.start();
        }
        let t = seg.inv_arclen(local, ARCLEN_ACCURACY).clamp(0.0, 1.0);
        seg.eval(t)
    }
}

fn check_point(p: Point) -> GlowResult<Point> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(p)
    } else {
        Err(GlowError::geometry("curve coordinates must be finite"))
    }
}

fn first_subpath_segments(path: &BezPath) -> GlowResult<Vec<PathSeg>> {
    let mut segs = Vec::new();
    let mut start: Option<Point> = None;
    let mut last = Point::ORIGIN;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                if start.is_some() && !segs.is_empty() {
                    tracing::debug!("curve has more than one subpath, using the first");
                    break;
                }
                let p = check_point(p)?;
                start = Some(p);
                last = p;
            }
            PathEl::LineTo(p) => {
                let p = check_point(p)?;
                segs.push(PathSeg::Line(Line::new(last, p)));
                last = p;
            }
            PathEl::QuadTo(p1, p2) => {
                let (p1, p2) = (check_point(p1)?, check_point(p2)?);
                segs.push(PathSeg::Quad(QuadBez::new(last, p1, p2)));
                last = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let (p1, p2, p3) = (check_point(p1)?, check_point(p2)?, check_point(p3)?);
                segs.push(PathSeg::Cubic(CubicBez::new(last, p1, p2, p3)));
                last = p3;
            }
            PathEl::ClosePath => break,
        }
    }

    if let Some(s) = start
        && !segs.is_empty()
        && last.distance(s) > CLOSE_EPS
    {
        segs.push(PathSeg::Line(Line::new(last, s)));
    }
    Ok(segs)
}

fn find_first_path(group: &usvg::Group) -> Option<&usvg::Path> {
    for node in group.children() {
        match node {
            usvg::Node::Path(p) => return Some(p.as_ref()),
            usvg::Node::Group(g) => {
                if let Some(p) = find_first_path(g.as_ref()) {
                    return Some(p);
                }
            }
            _ => {}
        }
    }
    None
}

fn usvg_path_to_bez(node: &usvg::Path) -> BezPath {
    use usvg::tiny_skia_path::PathSegment;

    let pt = |p: usvg::tiny_skia_path::Point| Point::new(f64::from(p.x), f64::from(p.y));
    let mut out = BezPath::new();
    for seg in node.data().segments() {
        match seg {
            PathSegment::MoveTo(p) => out.move_to(pt(p)),
            PathSegment::LineTo(p) => out.line_to(pt(p)),
            PathSegment::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathSegment::CubicTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathSegment::Close => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/curve.rs"]
mod tests;
