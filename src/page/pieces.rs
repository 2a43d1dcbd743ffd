//! Falling-piece decoration.
//!
//! Pieces are `div`s carrying the piece class and a randomized `fall`
//! animation. When a piece's animation ends it is removed and exactly one
//! replacement is spawned, so the population in flight stays constant once the
//! staggered start-up has finished.
//!
//! Resizing below the breakpoint clears every live piece and schedules a small
//! fresh batch. Spawns still pending from earlier batches are not cancelled,
//! so repeated resizes accumulate batches without bound.

use crate::config::PageConfig;

/// Placement and timing for one piece, derived from two uniform samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceStyle {
    pub left_px: f64,
    pub fall_secs: f64,
}

impl PieceStyle {
    /// `left_sample` and `duration_sample` are uniform in `[0, 1)`.
    pub fn from_samples(
        cfg: &PageConfig,
        viewport_width: f64,
        left_sample: f64,
        duration_sample: f64,
    ) -> Self {
        Self {
            left_px: left_sample * viewport_width,
            fall_secs: duration_sample * cfg.fall_spread_secs + cfg.fall_min_secs,
        }
    }

    pub fn left_css(&self) -> String {
        format!("{}px", self.left_px)
    }

    pub fn animation_css(&self, animation: &str) -> String {
        format!("{animation} {}s linear", self.fall_secs)
    }
}

/// A batch of spawns, the `i`th scheduled `i * stagger_ms` after the batch starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnBatch {
    pub count: u32,
    pub stagger_ms: i32,
}

impl SpawnBatch {
    pub fn delays(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.count).map(move |i| self.delay_at(i))
    }

    /// Delay of the `i`th spawn, saturating at `i32::MAX` milliseconds.
    pub fn delay_at(&self, i: u32) -> i32 {
        i32::try_from(i)
            .unwrap_or(i32::MAX)
            .saturating_mul(self.stagger_ms)
    }
}

/// Start-up population: a large one on wide viewports, a small one on narrow ones.
pub fn initial_batch(cfg: &PageConfig, viewport_width: f64) -> SpawnBatch {
    let count = if cfg.is_narrow(viewport_width) {
        cfg.narrow_piece_count
    } else {
        cfg.wide_piece_count
    };
    SpawnBatch {
        count,
        stagger_ms: cfg.spawn_stagger_ms,
    }
}

/// Batch to schedule after a resize, if any.
pub fn resize_batch(cfg: &PageConfig, viewport_width: f64) -> Option<SpawnBatch> {
    cfg.is_narrow(viewport_width).then_some(SpawnBatch {
        count: cfg.resize_piece_count,
        stagger_ms: cfg.spawn_stagger_ms,
    })
}

/// Where pieces live and how spawns get scheduled.
pub trait PieceHost {
    /// Removes every live piece, returning how many were removed.
    fn remove_all_pieces(&mut self) -> usize;
    fn schedule_spawn(&mut self, delay_ms: i32);
}

pub fn schedule_batch<H: PieceHost + ?Sized>(host: &mut H, batch: SpawnBatch) {
    for delay in batch.delays() {
        host.schedule_spawn(delay);
    }
}

/// Applies the resize rule. Returns the batch that was scheduled, if any.
pub fn handle_resize<H: PieceHost + ?Sized>(
    cfg: &PageConfig,
    viewport_width: f64,
    host: &mut H,
) -> Option<SpawnBatch> {
    let batch = resize_batch(cfg, viewport_width)?;
    let removed = host.remove_all_pieces();
    log::debug!(
        "resize to {viewport_width}px: removed {removed} pieces, respawning {}",
        batch.count
    );
    schedule_batch(host, batch);
    Some(batch)
}
