// Reveal-on-view: one-shot activation of sections entering the viewport.

/// A single observation delivered by the intersection observer, already mapped
/// to the section it concerns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub section: usize,
    pub intersecting: bool,
}

/// Side effects of revealing a section.
pub trait RevealTarget {
    fn mark_revealed(&mut self, section: usize);
    fn unobserve(&mut self, section: usize);
}

/// Tracks which sections have already been revealed.
///
/// The browser stops delivering entries after `unobserve`, but a batch may
/// already hold a second entry for the same target, so the tracker keeps its
/// own record.
#[derive(Debug, Default)]
pub struct RevealTracker {
    revealed: Vec<bool>,
}

impl RevealTracker {
    pub fn new(sections: usize) -> Self {
        Self {
            revealed: vec![false; sections],
        }
    }

    pub fn is_revealed(&self, section: usize) -> bool {
        self.revealed.get(section).copied().unwrap_or(false)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|r| **r).count()
    }

    /// Processes one observer batch. Returns how many sections were newly revealed.
    pub fn apply<T, I>(&mut self, entries: I, target: &mut T) -> usize
    where
        T: RevealTarget + ?Sized,
        I: IntoIterator<Item = Intersection>,
    {
        let mut newly = 0;
        for entry in entries {
            if !entry.intersecting {
                continue;
            }
            if entry.section >= self.revealed.len() {
                self.revealed.resize(entry.section + 1, false);
            }
            if self.revealed[entry.section] {
                continue;
            }
            self.revealed[entry.section] = true;
            target.mark_revealed(entry.section);
            target.unobserve(entry.section);
            newly += 1;
        }
        newly
    }
}
