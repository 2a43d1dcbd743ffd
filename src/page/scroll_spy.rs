// Scroll-spy: pick the section the reader is currently in and highlight its link.

use crate::error::{PageError, Result};

/// Index of the "current" section for a scroll position.
///
/// Scans from the last section down and returns the first index whose top is at
/// or above `scroll_y + offset`. Index 0 is never tested: it is the default when
/// no later section qualifies, including when there are no sections at all.
pub fn active_section_index(section_tops: &[f64], scroll_y: f64, offset: f64) -> usize {
    let line = scroll_y + offset;
    (1..section_tops.len())
        .rev()
        .find(|&i| section_tops[i] <= line)
        .unwrap_or(0)
}

/// Nav link surface the scroll-spy writes to.
pub trait NavLinks {
    fn len(&self) -> usize;
    fn set_active(&mut self, index: usize, active: bool);
}

/// Clears every link then marks the one at `index`.
///
/// Links are cleared even when `index` has no link, so a count mismatch leaves
/// nothing highlighted rather than a stale highlight.
pub fn highlight<L: NavLinks + ?Sized>(links: &mut L, index: usize) -> Result<()> {
    let count = links.len();
    for i in 0..count {
        links.set_active(i, false);
    }
    if index >= count {
        return Err(PageError::MissingNavLink {
            index,
            links: count,
        });
    }
    links.set_active(index, true);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeLinks(Vec<bool>);

    impl NavLinks for FakeLinks {
        fn len(&self) -> usize {
            self.0.len()
        }
        fn set_active(&mut self, index: usize, active: bool) {
            self.0[index] = active;
        }
    }

    const TOPS: [f64; 4] = [0.0, 600.0, 1200.0, 1800.0];

    #[test]
    fn picks_highest_section_above_the_line() {
        assert_eq!(active_section_index(&TOPS, 0.0, 50.0), 0);
        assert_eq!(active_section_index(&TOPS, 549.0, 50.0), 0);
        assert_eq!(active_section_index(&TOPS, 550.0, 50.0), 1);
        assert_eq!(active_section_index(&TOPS, 1300.0, 50.0), 2);
        assert_eq!(active_section_index(&TOPS, 10_000.0, 50.0), 3);
    }

    #[test]
    fn index_zero_is_the_fallback() {
        // First section starts below the fold: still index 0.
        let tops = [400.0, 900.0];
        assert_eq!(active_section_index(&tops, 0.0, 50.0), 0);
        assert_eq!(active_section_index(&[], 500.0, 50.0), 0);
        assert_eq!(active_section_index(&[250.0], 0.0, 50.0), 0);
    }

    #[test]
    fn exactly_one_link_active_for_every_position() {
        let mut links = FakeLinks(vec![false; TOPS.len()]);
        let mut y = 0.0;
        while y < 2500.0 {
            let idx = active_section_index(&TOPS, y, 50.0);
            highlight(&mut links, idx).unwrap();
            assert_eq!(links.0.iter().filter(|a| **a).count(), 1, "y = {y}");
            assert!(links.0[idx]);
            assert!(TOPS[idx] <= y + 50.0 || idx == 0);
            y += 37.0;
        }
    }

    #[test]
    fn missing_link_clears_and_reports() {
        let mut links = FakeLinks(vec![true, false]);
        let err = highlight(&mut links, 3).unwrap_err();
        assert!(matches!(err, PageError::MissingNavLink { index: 3, links: 2 }));
        assert!(links.0.iter().all(|a| !a));
    }
}
