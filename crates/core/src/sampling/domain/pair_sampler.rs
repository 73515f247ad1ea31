use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::shared::constants::{FIXED_SET_SEED, MAX_RESAMPLE_ATTEMPTS};
use crate::shared::error::DatasetError;
use crate::shared::record::{Label, Pair};

use super::identity_index::IdentityIndex;

/// Train-time siamese pair sampler.
///
/// Each call flips a fair coin: heads pairs the anchor with another record of
/// the same identity, tails with a uniformly drawn record of a different
/// identity. The sampler owns its random source, so runs with the same seed
/// and population draw the same sequence.
pub struct RandomPairSampler<'a, R: Rng> {
    index: &'a IdentityIndex,
    rng: R,
}

impl<'a> RandomPairSampler<'a, StdRng> {
    pub fn with_seed(index: &'a IdentityIndex, seed: u64) -> Self {
        Self::new(index, StdRng::seed_from_u64(seed))
    }
}

impl<'a, R: Rng> RandomPairSampler<'a, R> {
    pub fn new(index: &'a IdentityIndex, rng: R) -> Self {
        Self { index, rng }
    }

    /// Draws one pair for the record at `anchor`.
    pub fn sample(&mut self, anchor: usize) -> Result<Pair, DatasetError> {
        let is_same = self.rng.gen_range(0..2) == 1;
        let partner = if is_same {
            same_identity_peer(self.index, anchor, &mut self.rng)?
        } else {
            let anchor_label = self.index.label_of(anchor)?;
            different_identity_member(self.index, anchor_label, &mut self.rng)?
        };
        Ok(Pair {
            anchor,
            partner,
            is_same,
        })
    }
}

/// Uniform draw from the anchor's bucket, excluding the anchor itself.
///
/// Loop-until-distinct rejection sampling, bounded so a pathological random
/// source errors instead of hanging.
pub(crate) fn same_identity_peer<R: Rng>(
    index: &IdentityIndex,
    anchor: usize,
    rng: &mut R,
) -> Result<usize, DatasetError> {
    let label = index.label_of(anchor)?;
    let bucket = index.bucket(label);
    if bucket.len() < 2 {
        return Err(DatasetError::InsufficientPopulation {
            label,
            bucket_size: bucket.len(),
            needed: 2,
        });
    }
    for _ in 0..MAX_RESAMPLE_ATTEMPTS {
        let candidate = bucket[rng.gen_range(0..bucket.len())];
        if candidate != anchor {
            return Ok(candidate);
        }
    }
    Err(DatasetError::InsufficientPopulation {
        label,
        bucket_size: bucket.len(),
        needed: 2,
    })
}

/// Uniform label from the complement of `anchor_label`, then a uniform member
/// of that label's bucket.
pub(crate) fn different_identity_member<R: Rng>(
    index: &IdentityIndex,
    anchor_label: Label,
    rng: &mut R,
) -> Result<usize, DatasetError> {
    let pool = index.negative_labels(anchor_label);
    let negative_label = *pool.choose(rng).ok_or(DatasetError::EmptyLabelSet)?;
    let bucket = index.bucket(negative_label);
    // Buckets are non-empty by construction.
    Ok(bucket[rng.gen_range(0..bucket.len())])
}

/// Reproducible test-time pair set.
///
/// Even positions contribute one same-identity pair, odd positions one
/// different-identity pair; the positive sub-list precedes the negatives.
/// The positive partner is drawn from the anchor's full bucket — the anchor
/// itself included — to stay faithful to the published evaluation sets.
/// Every draw, the negative identity choice included, comes from the single
/// seeded generator, so repeated loads of the same population are identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPairSet {
    pairs: Vec<Pair>,
}

impl FixedPairSet {
    /// Generates the pair set with the reference seed.
    pub fn generate(index: &IdentityIndex) -> Result<Self, DatasetError> {
        Self::generate_with_seed(index, FIXED_SET_SEED)
    }

    pub fn generate_with_seed(index: &IdentityIndex, seed: u64) -> Result<Self, DatasetError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pairs = Vec::with_capacity(index.len());
        for anchor in (0..index.len()).step_by(2) {
            let label = index.label_of(anchor)?;
            let bucket = index.bucket(label);
            let partner = bucket[rng.gen_range(0..bucket.len())];
            pairs.push(Pair {
                anchor,
                partner,
                is_same: true,
            });
        }
        for anchor in (1..index.len()).step_by(2) {
            let anchor_label = index.label_of(anchor)?;
            let partner = different_identity_member(index, anchor_label, &mut rng)?;
            pairs.push(Pair {
                anchor,
                partner,
                is_same: false,
            });
        }
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pair> {
        self.pairs.get(index)
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn index() -> IdentityIndex {
        // Buckets: 0 -> [0,1,2], 1 -> [3,4], 2 -> [5].
        IdentityIndex::build(&[0, 0, 0, 1, 1, 2]).unwrap()
    }

    // --- Random mode ---

    #[test]
    fn test_random_positive_never_self_pairs() {
        let index = IdentityIndex::build(&[0, 0, 1, 1, 2, 2]).unwrap();
        let mut sampler = RandomPairSampler::with_seed(&index, 7);
        for _ in 0..200 {
            for anchor in 0..index.len() {
                let pair = sampler.sample(anchor).unwrap();
                assert_eq!(pair.anchor, anchor);
                if pair.is_same {
                    assert_ne!(pair.partner, anchor);
                    assert_eq!(
                        index.label_of(pair.partner).unwrap(),
                        index.label_of(anchor).unwrap()
                    );
                } else {
                    assert_ne!(
                        index.label_of(pair.partner).unwrap(),
                        index.label_of(anchor).unwrap()
                    );
                }
            }
        }
    }

    #[test]
    fn test_positive_for_singleton_bucket_fails() {
        let index = index();
        // Position 5 is the only record of identity 2.
        let err = same_identity_peer(&index, 5, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::InsufficientPopulation {
                label: 2,
                bucket_size: 1,
                needed: 2,
            }
        ));
    }

    #[test]
    fn test_negative_for_anchor_excludes_own_label() {
        let index = index();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let partner = different_identity_member(&index, 2, &mut rng).unwrap();
            let label = index.label_of(partner).unwrap();
            assert!(label == 0 || label == 1);
        }
    }

    #[test]
    fn test_negative_single_identity_fails() {
        let index = IdentityIndex::build(&[5, 5, 5, 5]).unwrap();
        let err =
            different_identity_member(&index, 5, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, DatasetError::EmptyLabelSet));
    }

    #[test]
    fn test_random_sampler_reproducible_with_same_seed() {
        let index = IdentityIndex::build(&[0, 0, 1, 1, 2, 2]).unwrap();
        let mut a = RandomPairSampler::with_seed(&index, 42);
        let mut b = RandomPairSampler::with_seed(&index, 42);
        for anchor in 0..index.len() {
            assert_eq!(a.sample(anchor).unwrap(), b.sample(anchor).unwrap());
        }
    }

    // --- Fixed mode ---

    #[test]
    fn test_fixed_set_deterministic_across_loads() {
        let index = IdentityIndex::build(&[0, 0, 1, 1, 2, 2, 0, 1]).unwrap();
        let a = FixedPairSet::generate(&index).unwrap();
        let b = FixedPairSet::generate(&index).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fixed_set_layout_positives_then_negatives() {
        let index = IdentityIndex::build(&[0, 0, 1, 1, 2, 2, 0, 1]).unwrap();
        let set = FixedPairSet::generate(&index).unwrap();
        // 8 records: anchors 0,2,4,6 positive; 1,3,5,7 negative.
        assert_eq!(set.len(), 8);
        let (positives, negatives) = set.pairs().split_at(4);
        assert_eq!(
            positives.iter().map(|p| p.anchor).collect::<Vec<_>>(),
            vec![0, 2, 4, 6]
        );
        assert!(positives.iter().all(|p| p.is_same));
        assert_eq!(
            negatives.iter().map(|p| p.anchor).collect::<Vec<_>>(),
            vec![1, 3, 5, 7]
        );
        assert!(negatives.iter().all(|p| !p.is_same));
    }

    #[test]
    fn test_fixed_set_labels_respect_relation() {
        let index = IdentityIndex::build(&[0, 0, 1, 1, 2, 2, 0, 1, 2, 0]).unwrap();
        let set = FixedPairSet::generate(&index).unwrap();
        for pair in set.pairs() {
            let anchor_label = index.label_of(pair.anchor).unwrap();
            let partner_label = index.label_of(pair.partner).unwrap();
            if pair.is_same {
                assert_eq!(anchor_label, partner_label);
            } else {
                assert_ne!(anchor_label, partner_label);
            }
        }
    }

    #[test]
    fn test_fixed_set_single_identity_fails_on_negatives() {
        let index = IdentityIndex::build(&[3, 3, 3, 3]).unwrap();
        assert!(matches!(
            FixedPairSet::generate(&index),
            Err(DatasetError::EmptyLabelSet)
        ));
    }

    #[rstest]
    #[case::odd_population(7, 4, 3)]
    #[case::even_population(8, 4, 4)]
    #[case::single_record(1, 1, 0)]
    fn test_fixed_set_counts(
        #[case] population: usize,
        #[case] expected_positives: usize,
        #[case] expected_negatives: usize,
    ) {
        // Two identities alternating so every bucket has peers. A lone
        // record never reaches negative sampling.
        let labels: Vec<Label> = (0..population).map(|i| (i % 2) as Label).collect();
        let index = IdentityIndex::build(&labels).unwrap();
        let set = FixedPairSet::generate(&index).unwrap();
        let positives = set.pairs().iter().filter(|p| p.is_same).count();
        let negatives = set.pairs().iter().filter(|p| !p.is_same).count();
        assert_eq!(positives, expected_positives);
        assert_eq!(negatives, expected_negatives);
    }

    #[test]
    fn test_fixed_set_seed_changes_output() {
        let index = IdentityIndex::build(&[0, 0, 0, 1, 1, 1, 2, 2, 2, 0, 1, 2]).unwrap();
        let a = FixedPairSet::generate_with_seed(&index, 29).unwrap();
        let b = FixedPairSet::generate_with_seed(&index, 30).unwrap();
        // Same layout, near-certainly different partners somewhere.
        assert_eq!(a.len(), b.len());
        assert_ne!(a.pairs(), b.pairs());
    }
}
