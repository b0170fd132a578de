//! Per-session scoring
//!
//! Tracks:
//! - Score (+1 per correct answer, no penalty for misses)
//! - Answers, slow answers and misses for the summary
//! - Mean response latency

use std::time::Duration;

/// Running totals for one session
#[derive(Clone, Debug, Default)]
pub struct Scorer {
    /// Correct answers, slow ones included
    score: u32,
    /// Every scored answer
    answers: u32,
    /// Correct answers at or over the response threshold
    slow_answers: u32,
    /// Sum of all answer latencies
    total_latency: Duration,
}

impl Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one answer
    pub fn record(&mut self, correct: bool, latency: Duration, slow: bool) {
        self.answers += 1;
        self.total_latency += latency;
        if correct {
            self.score += 1;
            if slow {
                self.slow_answers += 1;
            }
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answers(&self) -> u32 {
        self.answers
    }

    pub fn misses(&self) -> u32 {
        self.answers - self.score
    }

    pub fn slow_answers(&self) -> u32 {
        self.slow_answers
    }

    /// Correct share of all answers, `None` before the first answer
    pub fn accuracy(&self) -> Option<f32> {
        (self.answers > 0).then(|| self.score as f32 / self.answers as f32)
    }

    pub fn mean_latency(&self) -> Option<Duration> {
        (self.answers > 0).then(|| self.total_latency / self.answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misses_do_not_cost_points() {
        let mut scorer = Scorer::new();
        scorer.record(true, Duration::from_secs(1), false);
        scorer.record(false, Duration::from_secs(2), false);
        scorer.record(true, Duration::from_secs(6), true);
        assert_eq!(scorer.score(), 2);
        assert_eq!(scorer.answers(), 3);
        assert_eq!(scorer.misses(), 1);
        assert_eq!(scorer.slow_answers(), 1);
        assert_eq!(scorer.mean_latency(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_accuracy() {
        let mut scorer = Scorer::new();
        assert_eq!(scorer.accuracy(), None);
        assert_eq!(scorer.mean_latency(), None);
        scorer.record(true, Duration::from_millis(800), false);
        scorer.record(false, Duration::from_millis(800), false);
        assert_eq!(scorer.accuracy(), Some(0.5));
    }
}
