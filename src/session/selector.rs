//! Weighted position selection for random mode
//!
//! Unlearned positions are drawn three times out of four, learned ones the
//! rest of the time, uniformly within each group. When one group is empty
//! the other takes every draw. The previous position is avoided by drawing
//! once more from the same group when that group has another member.

use super::mastery::MasteryStore;
use crate::fretboard::Position;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Aggregate probability of drawing from the unlearned group
pub const UNMASTERED_WEIGHT: f64 = 0.75;

/// Chooses the next position to quiz, biased toward unlearned positions
pub struct PositionSelector<R: Rng = StdRng> {
    rng: R,
    unmastered_weight: f64,
}

impl<R: Rng> PositionSelector<R> {
    pub fn new(rng: R) -> Self {
        PositionSelector {
            rng,
            unmastered_weight: UNMASTERED_WEIGHT,
        }
    }

    /// Pick from the current mastery partition of the store
    pub fn select(&mut self, store: &MasteryStore, previous: Option<Position>) -> Option<Position> {
        let unmastered = store.unmastered_positions();
        let mastered = store.mastered_positions();
        self.select_from(&unmastered, &mastered, previous)
    }

    /// Pick from an explicit partition; `None` only if both groups are empty
    pub fn select_from(
        &mut self,
        unmastered: &[Position],
        mastered: &[Position],
        previous: Option<Position>,
    ) -> Option<Position> {
        let pool = match (unmastered.is_empty(), mastered.is_empty()) {
            (true, true) => return None,
            (false, true) => unmastered,
            (true, false) => mastered,
            (false, false) => {
                if self.rng.gen::<f64>() < self.unmastered_weight {
                    unmastered
                } else {
                    mastered
                }
            }
        };

        let pick = *pool.choose(&mut self.rng)?;
        if pool.len() > 1 && Some(pick) == previous {
            return pool.choose(&mut self.rng).copied();
        }
        Some(pick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::time::Duration;

    fn selector(seed: u64) -> PositionSelector<StdRng> {
        PositionSelector::new(StdRng::seed_from_u64(seed))
    }

    fn split(unmastered: usize) -> (Vec<Position>, Vec<Position>) {
        let all: Vec<Position> = Position::all().collect();
        let (a, b) = all.split_at(unmastered);
        (a.to_vec(), b.to_vec())
    }

    #[test]
    fn test_draws_from_unmastered_three_quarters_of_the_time() {
        let (unmastered, mastered) = split(18);
        let mut selector = selector(7);
        let draws = 10_000;
        let mut previous = None;
        let mut from_unmastered = 0;
        for _ in 0..draws {
            let pick = selector
                .select_from(&unmastered, &mastered, previous)
                .unwrap();
            if unmastered.contains(&pick) {
                from_unmastered += 1;
            }
            previous = Some(pick);
        }
        let rate = from_unmastered as f64 / draws as f64;
        assert!((rate - 0.75).abs() < 0.02, "rate was {}", rate);
    }

    #[test]
    fn test_single_group_takes_every_draw() {
        let all: Vec<Position> = Position::all().collect();
        let mut selector = selector(11);
        for _ in 0..500 {
            let pick = selector.select_from(&[], &all[..10], None).unwrap();
            assert!(all[..10].contains(&pick));
            let pick = selector.select_from(&all[10..], &[], None).unwrap();
            assert!(all[10..].contains(&pick));
        }
        assert_eq!(selector.select_from(&[], &[], None), None);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let (unmastered, mastered) = split(40);
        let mut a = selector(99);
        let mut b = selector(99);
        for _ in 0..50 {
            assert_eq!(
                a.select_from(&unmastered, &mastered, None),
                b.select_from(&unmastered, &mastered, None)
            );
        }
    }

    #[test]
    fn test_previous_position_is_rarely_repeated() {
        let (pool, _) = split(2);
        let mut selector = selector(3);
        let mut repeats = 0;
        let mut previous = Some(pool[0]);
        for _ in 0..1_000 {
            let pick = selector.select_from(&pool, &[], previous).unwrap();
            if Some(pick) == previous {
                repeats += 1;
            }
            previous = Some(pick);
        }
        // Two members, one redraw: a repeat needs two collisions in a row
        assert!(repeats < 400, "repeats: {}", repeats);
    }

    #[test]
    fn test_single_member_pool_accepts_repeat() {
        let only = Position::new(2, 7).unwrap();
        let mut selector = selector(5);
        for _ in 0..20 {
            assert_eq!(selector.select_from(&[only], &[], Some(only)), Some(only));
        }
    }

    #[test]
    fn test_select_follows_store_partition() {
        let mut store = MasteryStore::default();
        let fast = Duration::from_secs(1);
        for position in Position::all() {
            for _ in 0..3 {
                store.record(position, true, fast);
            }
        }
        let weak = Position::new(4, 4).unwrap();
        let mut selector = selector(21);
        // Everything learned: draws fall through to the learned group
        assert!(selector.select(&store, None).is_some());

        let mut fresh = MasteryStore::default();
        fresh.record(weak, false, fast);
        let picks: Vec<Position> = (0..200)
            .filter_map(|_| selector.select(&fresh, None))
            .collect();
        assert_eq!(picks.len(), 200);
        assert!(picks.iter().all(|p| !fresh.is_learned(*p)));
    }
}
