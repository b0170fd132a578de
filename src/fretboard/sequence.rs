//! Fixed sweep order for sequential mode
//!
//! Positions are ordered by distance from the commonly drilled frets (open
//! string and the inlay frets). Within one distance, positions are grouped
//! by fret so each fret is swept across all six strings, and ties inside a
//! fret go by string index ascending. The order never looks at mastery.

use super::note::{Position, FRET_COUNT};

/// Frets drilled first: open position and the 3rd/5th/7th/9th inlays
pub const COMMON_FRETS: [usize; 5] = [0, 3, 5, 7, 9];

fn distance_from_common(fret: usize) -> usize {
    COMMON_FRETS
        .iter()
        .map(|&common| common.abs_diff(fret))
        .min()
        .unwrap_or(FRET_COUNT)
}

/// Restartable cursor over all 72 positions in sweep order
#[derive(Clone, Debug)]
pub struct SequentialOrder {
    order: Vec<Position>,
    cursor: usize,
}

impl SequentialOrder {
    pub fn new() -> Self {
        let mut order: Vec<Position> = Position::all().collect();
        order.sort_by_key(|p| (distance_from_common(p.fret()), p.fret(), p.string()));
        SequentialOrder { order, cursor: 0 }
    }

    /// Number of positions already handed out
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.order.len()
    }

    /// Position at `index` in the sweep, without moving the cursor
    pub fn get(&self, index: usize) -> Option<Position> {
        self.order.get(index).copied()
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl Default for SequentialOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for SequentialOrder {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        let position = self.get(self.cursor)?;
        self.cursor += 1;
        Some(position)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.order.len().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fretboard::POSITION_COUNT;
    use std::collections::HashSet;

    #[test]
    fn test_covers_every_position_once() {
        let sweep: Vec<Position> = SequentialOrder::new().collect();
        assert_eq!(sweep.len(), POSITION_COUNT);
        let unique: HashSet<Position> = sweep.iter().copied().collect();
        assert_eq!(unique.len(), POSITION_COUNT);
    }

    #[test]
    fn test_order_is_deterministic() {
        let a: Vec<Position> = SequentialOrder::new().collect();
        let b: Vec<Position> = SequentialOrder::new().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_common_frets_come_first() {
        let sweep: Vec<Position> = SequentialOrder::new().collect();
        // Open strings, low E first
        for (string, position) in sweep.iter().take(6).enumerate() {
            assert_eq!(position.fret(), 0);
            assert_eq!(position.string(), string);
        }
        let first_block: HashSet<usize> = sweep[..30].iter().map(|p| p.fret()).collect();
        let common: HashSet<usize> = COMMON_FRETS.iter().copied().collect();
        assert_eq!(first_block, common);
        // Fret 11 is furthest from any common fret
        assert!(sweep[66..].iter().all(|p| p.fret() == 11));
    }

    #[test]
    fn test_each_fret_sweeps_strings_in_order() {
        let sweep: Vec<Position> = SequentialOrder::new().collect();
        for block in sweep.chunks(6) {
            let fret = block[0].fret();
            for (string, position) in block.iter().enumerate() {
                assert_eq!(position.fret(), fret);
                assert_eq!(position.string(), string);
            }
        }
        // Frets 3 and 5 share distance 0 with the open string; lower fret first
        let frets: Vec<usize> = sweep.chunks(6).map(|block| block[0].fret()).collect();
        assert_eq!(&frets[..5], &[0, 3, 5, 7, 9]);
    }

    #[test]
    fn test_resumes_position_by_position() {
        let full: Vec<Position> = SequentialOrder::new().collect();
        let mut order = SequentialOrder::new();
        for (i, expected) in full.iter().enumerate().take(10) {
            assert_eq!(order.cursor(), i);
            assert_eq!(order.next(), Some(*expected));
        }
        let rest: Vec<Position> = order.by_ref().collect();
        assert_eq!(rest, full[10..].to_vec());
        assert!(order.is_exhausted());
        assert_eq!(order.next(), None);

        order.reset();
        assert_eq!(order.next(), Some(full[0]));
    }
}
