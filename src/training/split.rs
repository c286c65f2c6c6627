//! Stratified train/test split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Fraction of each class held out for evaluation
pub const TEST_FRACTION: f64 = 0.2;

/// Seed shared by the split and tree subsampling
pub const SPLIT_SEED: u64 = 42;

/// Row indices on each side of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices so both sides keep the label ratio.
///
/// Each class contributes `round(count * test_fraction)` rows to the test
/// side. Both index lists come back sorted so row order follows the dataset.
pub fn stratified_split(labels: &[u8], test_fraction: f64, seed: u64) -> SplitIndices {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);

        let held_out = ((members.len() as f64) * test_fraction).round() as usize;
        let held_out = held_out.min(members.len());
        test.extend_from_slice(&members[..held_out]);
        train.extend_from_slice(&members[held_out..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    SplitIndices { train, test }
}
