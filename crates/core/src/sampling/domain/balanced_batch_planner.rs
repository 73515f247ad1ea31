use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::shared::error::DatasetError;
use crate::shared::record::Label;

use super::identity_index::IdentityIndex;

/// Plans batches of exactly `n_classes` distinct identities × `n_samples`
/// records each.
///
/// Every identity keeps a shuffled queue of its record positions with a
/// consumption cursor. When a queue would run out before the next take, it is
/// reshuffled and its cursor reset, so an identity can recur within one pass.
/// That in-run reuse is deliberate: downstream consumers depend on the exact
/// batch composition, so a strict without-replacement scheme must not be
/// substituted here.
///
/// Iteration mutates the queues, so [`iter`](Self::iter) takes `&mut self`;
/// the borrow checker thereby rules out concurrent iteration over one
/// planner. Each restart reshuffles all queues and resets all cursors.
#[derive(Debug)]
pub struct BalancedBatchPlanner<'a, R: Rng> {
    index: &'a IdentityIndex,
    n_classes: usize,
    n_samples: usize,
    rng: R,
    queues: BTreeMap<Label, Vec<usize>>,
    consumed: BTreeMap<Label, usize>,
}

impl<'a> BalancedBatchPlanner<'a, StdRng> {
    pub fn with_seed(
        index: &'a IdentityIndex,
        n_classes: usize,
        n_samples: usize,
        seed: u64,
    ) -> Result<Self, DatasetError> {
        Self::new(index, n_classes, n_samples, StdRng::seed_from_u64(seed))
    }
}

impl<'a, R: Rng> BalancedBatchPlanner<'a, R> {
    pub fn new(
        index: &'a IdentityIndex,
        n_classes: usize,
        n_samples: usize,
        rng: R,
    ) -> Result<Self, DatasetError> {
        if n_classes == 0 || n_samples == 0 {
            return Err(DatasetError::LabelPoolTooSmall {
                details: "n_classes and n_samples must both be positive".to_string(),
            });
        }
        if index.labels().len() < n_classes {
            return Err(DatasetError::LabelPoolTooSmall {
                details: format!(
                    "{} distinct identities available, fewer than n_classes = {}",
                    index.labels().len(),
                    n_classes
                ),
            });
        }
        for &label in index.labels() {
            let bucket_size = index.bucket(label).len();
            if bucket_size < n_samples {
                return Err(DatasetError::LabelPoolTooSmall {
                    details: format!(
                        "identity {label} has {bucket_size} record(s), fewer than n_samples = {n_samples}"
                    ),
                });
            }
        }
        Ok(Self {
            index,
            n_classes,
            n_samples,
            rng,
            queues: BTreeMap::new(),
            consumed: BTreeMap::new(),
        })
    }

    /// Records per batch.
    pub fn batch_size(&self) -> usize {
        self.n_classes * self.n_samples
    }

    /// Batches per full pass: `floor(N / batch_size)`.
    pub fn batches_per_pass(&self) -> usize {
        self.index.len() / self.batch_size()
    }

    /// Starts a fresh pass: reshuffles every identity queue, resets every
    /// cursor, and returns the finite batch iterator.
    pub fn iter(&mut self) -> BalancedBatches<'_, 'a, R> {
        self.queues.clear();
        self.consumed.clear();
        for &label in self.index.labels() {
            let mut queue = self.index.bucket(label).to_vec();
            queue.shuffle(&mut self.rng);
            self.queues.insert(label, queue);
            self.consumed.insert(label, 0);
        }
        let remaining = self.batches_per_pass();
        BalancedBatches {
            planner: self,
            remaining,
        }
    }

    fn next_batch(&mut self) -> Vec<usize> {
        let chosen: Vec<Label> = self
            .index
            .labels()
            .choose_multiple(&mut self.rng, self.n_classes)
            .copied()
            .collect();
        let mut batch = Vec::with_capacity(self.batch_size());
        for label in chosen {
            let queue = self
                .queues
                .get_mut(&label)
                .expect("every distinct label has a queue");
            let cursor = self
                .consumed
                .get_mut(&label)
                .expect("every distinct label has a cursor");
            batch.extend_from_slice(&queue[*cursor..*cursor + self.n_samples]);
            *cursor += self.n_samples;
            if *cursor + self.n_samples > queue.len() {
                queue.shuffle(&mut self.rng);
                *cursor = 0;
            }
        }
        batch
    }
}

/// Finite iterator over one pass of balanced batches.
pub struct BalancedBatches<'p, 'a, R: Rng> {
    planner: &'p mut BalancedBatchPlanner<'a, R>,
    remaining: usize,
}

impl<R: Rng> Iterator for BalancedBatches<'_, '_, R> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.planner.next_batch())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<R: Rng> ExactSizeIterator for BalancedBatches<'_, '_, R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::shared::record::Label;

    /// `identities` identities with `per_identity` records each.
    fn uniform_index(identities: usize, per_identity: usize) -> IdentityIndex {
        let labels: Vec<Label> = (0..identities * per_identity)
            .map(|i| (i % identities) as Label)
            .collect();
        IdentityIndex::build(&labels).unwrap()
    }

    #[test]
    fn test_batches_have_exact_shape() {
        let index = uniform_index(6, 4);
        let mut planner = BalancedBatchPlanner::with_seed(&index, 3, 2, 0).unwrap();
        for batch in planner.iter() {
            assert_eq!(batch.len(), 6);
            let labels: HashSet<Label> = batch
                .iter()
                .map(|&pos| index.label_of(pos).unwrap())
                .collect();
            assert_eq!(labels.len(), 3);
            // Each chosen identity contributes exactly n_samples records.
            for &label in &labels {
                let count = batch
                    .iter()
                    .filter(|&&pos| index.label_of(pos).unwrap() == label)
                    .count();
                assert_eq!(count, 2);
            }
        }
    }

    #[test]
    fn test_pass_produces_floor_batches() {
        let index = uniform_index(6, 4); // N = 24
        let mut planner = BalancedBatchPlanner::with_seed(&index, 3, 2, 0).unwrap();
        assert_eq!(planner.batches_per_pass(), 4);
        assert_eq!(planner.iter().count(), 4);
    }

    #[test]
    fn test_total_emitted_never_exceeds_population() {
        let index = uniform_index(5, 3); // N = 15, batch = 6 -> 2 batches
        let mut planner = BalancedBatchPlanner::with_seed(&index, 2, 3, 1).unwrap();
        let total: usize = planner.iter().map(|batch| batch.len()).sum();
        assert!(total <= index.len());
        assert_eq!(total, 12);
    }

    #[test]
    fn test_restart_is_allowed_and_finite() {
        let index = uniform_index(4, 4);
        let mut planner = BalancedBatchPlanner::with_seed(&index, 2, 2, 9).unwrap();
        let first: Vec<Vec<usize>> = planner.iter().collect();
        let second: Vec<Vec<usize>> = planner.iter().collect();
        assert_eq!(first.len(), 4);
        assert_eq!(second.len(), 4);
    }

    #[test]
    fn test_queue_reshuffle_allows_in_run_reuse() {
        // Identity 1 holds exactly n_samples records, and with n_classes
        // equal to the identity count it is drained (and reshuffled) in
        // every batch, so both of its positions recur in every batch.
        let labels: Vec<Label> = vec![0, 0, 0, 0, 0, 0, 1, 1];
        let index = IdentityIndex::build(&labels).unwrap();
        let mut planner = BalancedBatchPlanner::with_seed(&index, 2, 2, 5).unwrap();
        let batches: Vec<Vec<usize>> = planner.iter().collect();
        assert_eq!(batches.len(), 2);
        for batch in &batches {
            assert!(batch.contains(&6));
            assert!(batch.contains(&7));
        }
    }

    #[test]
    fn test_same_seed_same_plan() {
        let index = uniform_index(5, 4);
        let mut a = BalancedBatchPlanner::with_seed(&index, 2, 2, 77).unwrap();
        let mut b = BalancedBatchPlanner::with_seed(&index, 2, 2, 77).unwrap();
        let batches_a: Vec<Vec<usize>> = a.iter().collect();
        let batches_b: Vec<Vec<usize>> = b.iter().collect();
        assert_eq!(batches_a, batches_b);
    }

    #[test]
    fn test_small_bucket_rejected() {
        let index = IdentityIndex::build(&[0, 0, 0, 1, 1, 2]).unwrap();
        let err = BalancedBatchPlanner::with_seed(&index, 2, 2, 0).unwrap_err();
        match err {
            DatasetError::LabelPoolTooSmall { details } => {
                assert!(details.contains("identity 2"));
            }
            other => panic!("expected LabelPoolTooSmall, got {other:?}"),
        }
    }

    #[test]
    fn test_too_few_identities_rejected() {
        let index = uniform_index(2, 4);
        let err = BalancedBatchPlanner::with_seed(&index, 3, 2, 0).unwrap_err();
        assert!(matches!(err, DatasetError::LabelPoolTooSmall { .. }));
    }

    #[test]
    fn test_zero_parameters_rejected() {
        let index = uniform_index(2, 2);
        assert!(BalancedBatchPlanner::with_seed(&index, 0, 2, 0).is_err());
        assert!(BalancedBatchPlanner::with_seed(&index, 2, 0, 0).is_err());
    }
}
