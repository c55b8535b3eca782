use crate::foundation::core::{Affine, Canvas, Rect};

/// Handle of one requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Host-side frame callback scheduling, one callback per display refresh.
pub trait FrameScheduler {
    /// Request the next frame. `None` when the environment cannot schedule frames.
    fn request_frame(&mut self) -> Option<FrameId>;

    /// Cancel a previously requested frame. Unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);
}

/// Host-side surface and layout queries.
pub trait GeometryHost {
    /// Current drawing surface size, or `None` while no surface is attached.
    fn surface(&self) -> Option<Canvas>;

    /// Transform from curve space (`view_box`) into surface pixels.
    ///
    /// `None` when layout cannot be resolved right now; the animator retries later.
    fn view_transform(&self, view_box: Rect, surface: Canvas) -> Option<Affine>;

    /// User or system reduced-motion preference.
    fn prefers_reduced_motion(&self) -> bool;
}

/// Uniformly scale and center `view_box` inside `surface`, leaving `padding_px` on every side.
///
/// A flat axis borrows the size of the other one, and a point gets a unit box around it.
pub fn fit_view_box(view_box: Rect, surface: Canvas, padding_px: f64) -> Option<Affine> {
    let view_box = view_box.abs();
    let (w, h) = (view_box.width(), view_box.height());
    if !(w.is_finite() && h.is_finite()) {
        return None;
    }
    let (vw, vh) = match (w > 0.0, h > 0.0) {
        (true, true) => (w, h),
        (true, false) => (w, w),
        (false, true) => (h, h),
        (false, false) => (1.0, 1.0),
    };
    let view_box = Rect::from_center_size(view_box.center(), (vw, vh));
    let pad = if padding_px.is_finite() {
        padding_px.max(0.0)
    } else {
        0.0
    };
    let avail_w = f64::from(surface.width) - 2.0 * pad;
    let avail_h = f64::from(surface.height) - 2.0 * pad;
    if avail_w <= 0.0 || avail_h <= 0.0 {
        return None;
    }
    let scale = (avail_w / vw).min(avail_h / vh);
    let tx = pad + 0.5 * (avail_w - vw * scale) - view_box.x0 * scale;
    let ty = pad + 0.5 * (avail_h - vh * scale) - view_box.y0 * scale;
    Some(Affine::translate((tx, ty)) * Affine::scale(scale))
}

/// Fixed-size host for offline rendering and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticHost {
    surface: Option<Canvas>,
    padding_px: f64,
    reduced_motion: bool,
    layout_ready: bool,
}

impl StaticHost {
    /// Host with an attached surface of size `canvas`.
    pub fn new(canvas: Canvas, padding_px: f64) -> Self {
        Self {
            surface: Some(canvas),
            padding_px,
            reduced_motion: false,
            layout_ready: true,
        }
    }

    /// Host without a surface; mounting stays idle until one is attached.
    pub fn detached(padding_px: f64) -> Self {
        Self {
            surface: None,
            padding_px,
            reduced_motion: false,
            layout_ready: true,
        }
    }

    /// Builder-style reduced-motion preference.
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Attach a surface of size `canvas`.
    pub fn attach(&mut self, canvas: Canvas) {
        self.surface = Some(canvas);
    }

    /// Remove the surface.
    pub fn detach(&mut self) {
        self.surface = None;
    }

    /// Change the reduced-motion preference.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    /// Simulate layout that temporarily cannot be resolved.
    pub fn set_layout_ready(&mut self, ready: bool) {
        self.layout_ready = ready;
    }
}

impl GeometryHost for StaticHost {
    fn surface(&self) -> Option<Canvas> {
        self.surface
    }

    fn view_transform(&self, view_box: Rect, surface: Canvas) -> Option<Affine> {
        if !self.layout_ready {
            return None;
        }
        fit_view_box(view_box, surface, self.padding_px)
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
}

/// Scheduler driven by hand: the caller pops the due frame and forwards it to the animator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManualScheduler {
    supported: bool,
    next_id: u64,
    pending: Option<FrameId>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    /// A scheduler that accepts frame requests.
    pub fn new() -> Self {
        Self {
            supported: true,
            ..Self::default()
        }
    }

    /// A scheduler for an environment without frame callbacks.
    pub fn unsupported() -> Self {
        Self::default()
    }

    /// Frame waiting to fire, if any.
    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    /// Fire the pending frame: returns its id and clears it.
    pub fn take_due(&mut self) -> Option<FrameId> {
        self.pending.take()
    }

    /// Number of successful `request_frame` calls.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Number of `cancel_frame` calls that hit the pending frame.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameId> {
        if !self.supported {
            return None;
        }
        self.next_id += 1;
        let id = FrameId(self.next_id);
        self.pending = Some(id);
        self.requested += 1;
        Some(id)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.pending == Some(id) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lifecycle/host.rs"]
mod tests;
