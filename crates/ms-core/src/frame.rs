/// Taille de fenêtre et pas d'analyse, en échantillons.
///
/// # Example
/// ```
/// use ms_core::frame::FrameGeometry;
/// let g = FrameGeometry { window: 400, hop: 160 };
/// assert_eq!(g.window_starts(1000).count(), 7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Window length in samples.
    pub window: usize,
    /// Hop length in samples.
    pub hop: usize,
}

impl FrameGeometry {
    /// Start offsets `0, hop, 2·hop, …` strictly below `len`.
    ///
    /// # Panics
    /// Panics if `hop` is 0. A validated config never produces one.
    pub fn window_starts(self, len: usize) -> impl Iterator<Item = usize> {
        assert!(self.hop > 0, "hop must be > 0");
        (0..len).step_by(self.hop)
    }
}

/// Plage de frames conservée après détection des silences, `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TrimBounds {
    /// First retained frame.
    pub start: usize,
    /// One past the last retained frame.
    pub end: usize,
}

impl TrimBounds {
    /// Frames in the range; 0 when `start >= end`.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if no frame is retained.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Clamp both ends to `frames`, keeping `start <= end`.
    ///
    /// # Example
    /// ```
    /// use ms_core::frame::TrimBounds;
    /// let b = TrimBounds { start: 2, end: 12 }.clamp_to(10);
    /// assert_eq!(b, TrimBounds { start: 2, end: 10 });
    /// ```
    #[must_use]
    pub fn clamp_to(self, frames: usize) -> Self {
        let end = self.end.min(frames);
        Self {
            start: self.start.min(end),
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_starts_cover_partial_tail() {
        let g = FrameGeometry { window: 4, hop: 3 };
        let starts: Vec<usize> = g.window_starts(10).collect();
        assert_eq!(starts, vec![0, 3, 6, 9]);
    }

    #[test]
    fn window_starts_empty_signal() {
        let g = FrameGeometry { window: 4, hop: 2 };
        assert_eq!(g.window_starts(0).count(), 0);
    }

    #[test]
    fn clamp_keeps_order() {
        let b = TrimBounds { start: 8, end: 12 }.clamp_to(5);
        assert_eq!(b, TrimBounds { start: 5, end: 5 });
        assert!(b.is_empty());
    }
}
