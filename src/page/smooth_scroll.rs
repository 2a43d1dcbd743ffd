// Smooth-scroll: eased animation of the vertical scroll position.

/// Ease-in-out quadratic.
///
/// `t` is elapsed time, `b` the start value, `c` the total change and `d` the
/// duration. Accelerates through the first half and mirrors it in the second.
pub fn ease_in_out_quad(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let mut t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t * t + b;
    }
    t -= 1.0;
    -c / 2.0 * (t * (t - 2.0) - 1.0) + b
}

/// Result of advancing a [`ScrollAnimation`] by one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub position: f64,
    /// Whether another frame should be requested.
    pub more: bool,
}

/// State of one smooth-scroll invocation. The start time is latched from the
/// first frame timestamp, matching `requestAnimationFrame` semantics.
#[derive(Clone, Debug)]
pub struct ScrollAnimation {
    from: f64,
    distance: f64,
    duration_ms: f64,
    start_ms: Option<f64>,
}

impl ScrollAnimation {
    pub fn new(from: f64, to: f64, duration_ms: f64) -> Self {
        Self {
            from,
            distance: to - from,
            duration_ms,
            start_ms: None,
        }
    }

    pub fn target(&self) -> f64 {
        self.from + self.distance
    }

    /// Computes the position for the frame at `now_ms`. The final frame is not
    /// clamped to the duration.
    pub fn frame(&mut self, now_ms: f64) -> Frame {
        let start = *self.start_ms.get_or_insert(now_ms);
        let elapsed = now_ms - start;
        Frame {
            position: ease_in_out_quad(elapsed, self.from, self.distance, self.duration_ms),
            more: elapsed < self.duration_ms,
        }
    }
}
