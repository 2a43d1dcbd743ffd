// Parallax: each section drifts at a rate proportional to its position.

use crate::config::PageConfig;

/// Vertical translation in pixels for the section at `index`.
pub fn parallax_offset(cfg: &PageConfig, scroll_y: f64, index: usize) -> f64 {
    let speed = cfg.parallax_step * (index as f64 + 1.0);
    scroll_y * speed * cfg.parallax_damping
}

/// CSS `transform` value for a section. Transforms do not affect layout, so
/// `offsetTop` (used by the scroll-spy) is unchanged.
pub fn parallax_transform(cfg: &PageConfig, scroll_y: f64, index: usize) -> String {
    format!("translateY({}px)", parallax_offset(cfg, scroll_y, index))
}
