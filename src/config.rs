//! Tunables for the page controller. Defaults reproduce the stock page
//! behaviour; with the `serde` feature a partial JSON document can override any
//! subset of fields.

use crate::error::{PageError, Result};

/// Upper bound for any piece batch size.
pub const MAX_PIECE_COUNT: u32 = 1_000;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PageConfig {
    pub section_selector: String,
    pub nav_link_selector: String,
    /// Marker class for the highlighted nav link and for revealed sections.
    pub active_class: String,
    /// Sections count as "current" once their top is within this many pixels
    /// below the scroll position.
    pub spy_offset_px: f64,
    /// Fraction of a section that must intersect the viewport to reveal it.
    pub reveal_threshold: f64,
    pub scroll_duration_ms: f64,
    pub piece_class: String,
    /// Keyframe animation name applied to each piece.
    pub fall_animation: String,
    pub fall_min_secs: f64,
    pub fall_spread_secs: f64,
    /// Viewport widths below this are "narrow".
    pub breakpoint_px: f64,
    pub wide_piece_count: u32,
    pub narrow_piece_count: u32,
    /// Pieces respawned after a resize below the breakpoint.
    pub resize_piece_count: u32,
    pub spawn_stagger_ms: i32,
    pub parallax_step: f64,
    pub parallax_damping: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            section_selector: ".section".into(),
            nav_link_selector: "nav a".into(),
            active_class: "active".into(),
            spy_offset_px: 50.0,
            reveal_threshold: 0.15,
            scroll_duration_ms: 1000.0,
            piece_class: "tetris-piece".into(),
            fall_animation: "fall".into(),
            fall_min_secs: 2.0,
            fall_spread_secs: 3.0,
            breakpoint_px: 768.0,
            wide_piece_count: 100,
            narrow_piece_count: 15,
            resize_piece_count: 5,
            spawn_stagger_ms: 500,
            parallax_step: 0.2,
            parallax_damping: 0.4,
        }
    }
}

impl PageConfig {
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: PageConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let names = [
            ("section_selector", &self.section_selector),
            ("nav_link_selector", &self.nav_link_selector),
            ("active_class", &self.active_class),
            ("piece_class", &self.piece_class),
            ("fall_animation", &self.fall_animation),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(PageError::InvalidConfig(format!("{field} is empty")));
            }
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(PageError::InvalidConfig(format!(
                "reveal_threshold {} outside [0, 1]",
                self.reveal_threshold
            )));
        }
        let positive = [
            ("scroll_duration_ms", self.scroll_duration_ms),
            ("fall_min_secs", self.fall_min_secs),
            ("breakpoint_px", self.breakpoint_px),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PageError::InvalidConfig(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }
        let finite = [
            ("spy_offset_px", self.spy_offset_px),
            ("fall_spread_secs", self.fall_spread_secs),
            ("parallax_step", self.parallax_step),
            ("parallax_damping", self.parallax_damping),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(PageError::InvalidConfig(format!("{field} is not finite")));
            }
        }
        // Zero spread is fine (every piece falls for `fall_min_secs`).
        if self.fall_spread_secs < 0.0 {
            return Err(PageError::InvalidConfig(format!(
                "fall_spread_secs must not be negative, got {}",
                self.fall_spread_secs
            )));
        }
        if self.spawn_stagger_ms < 0 {
            return Err(PageError::InvalidConfig(
                "spawn_stagger_ms must not be negative".into(),
            ));
        }
        let counts = [
            ("wide_piece_count", self.wide_piece_count),
            ("narrow_piece_count", self.narrow_piece_count),
            ("resize_piece_count", self.resize_piece_count),
        ];
        for (field, value) in counts {
            if value > MAX_PIECE_COUNT {
                return Err(PageError::InvalidConfig(format!(
                    "{field} {value} exceeds {MAX_PIECE_COUNT}"
                )));
            }
        }
        Ok(())
    }

    /// Whether a viewport of `width` pixels counts as narrow.
    pub fn is_narrow(&self, width: f64) -> bool {
        width < self.breakpoint_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PageConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_threshold_above_one() {
        let cfg = PageConfig {
            reveal_threshold: 1.5,
            ..PageConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PageError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_empty_selector() {
        let cfg = PageConfig {
            nav_link_selector: "  ".into(),
            ..PageConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("nav_link_selector"));
    }

    #[test]
    fn rejects_zero_duration() {
        let cfg = PageConfig {
            scroll_duration_ms: 0.0,
            ..PageConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_negative_fall_spread() {
        let cfg = PageConfig {
            fall_spread_secs: -3.0,
            ..PageConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("fall_spread_secs"));

        let cfg = PageConfig {
            fall_spread_secs: 0.0,
            ..PageConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_oversized_piece_batches() {
        let cfg = PageConfig {
            resize_piece_count: u32::MAX,
            ..PageConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PageError::InvalidConfig(_))));
        let cfg = PageConfig {
            wide_piece_count: MAX_PIECE_COUNT,
            ..PageConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn breakpoint_is_exclusive() {
        let cfg = PageConfig::default();
        assert!(cfg.is_narrow(767.0));
        assert!(!cfg.is_narrow(768.0));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = PageConfig::from_json(r#"{ "breakpoint_px": 1024, "resize_piece_count": 3 }"#)
            .unwrap();
        assert_eq!(cfg.breakpoint_px, 1024.0);
        assert_eq!(cfg.resize_piece_count, 3);
        assert_eq!(cfg.wide_piece_count, 100);
        assert_eq!(cfg.active_class, "active");
    }
}
