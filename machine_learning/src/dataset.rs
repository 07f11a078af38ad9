use std::collections::BTreeMap;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{MlErr, Result};

/// A labeled text dataset partitioned into a training and a validation half.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Split {
    pub train_texts: Vec<String>,
    pub train_labels: Vec<String>,
    pub test_texts: Vec<String>,
    pub test_labels: Vec<String>,
}

impl Split {
    /// The amount of samples in the training half.
    pub fn train_len(&self) -> usize {
        self.train_texts.len()
    }

    /// The amount of samples in the validation half.
    pub fn test_len(&self) -> usize {
        self.test_texts.len()
    }
}

/// Randomly partitions `texts` and `labels` into train and test subsets, stratified by label.
///
/// Every class keeps at least one sample on each side, which means every class must have at
/// least two samples. The amount of test samples per class is `round(n * test_size)` clamped
/// to `[1, n - 1]`.
///
/// # Arguments
/// * `texts` - The input documents.
/// * `labels` - The label of each document, same length as `texts`.
/// * `test_size` - The fraction of samples of each class to hold out, in `(0, 1)`.
/// * `seed` - An optional seed, a random one is drawn from the os if missing.
///
/// # Returns
/// The partitioned dataset or an `MlErr` if it can't be split.
pub fn train_test_split(
    texts: &[String],
    labels: &[String],
    test_size: f32,
    seed: Option<u64>,
) -> Result<Split> {
    if texts.len() != labels.len() {
        return Err(MlErr::SizeMismatch {
            a: "texts",
            b: "labels",
            got: texts.len(),
            expected: labels.len(),
        });
    }

    if texts.is_empty() {
        return Err(MlErr::EmptyDataset);
    }

    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(MlErr::InvalidTestSize { test_size });
    }

    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        by_class.entry(label.as_str()).or_default().push(i);
    }

    if let Some((class, idxs)) = by_class.iter().find(|(_, idxs)| idxs.len() < 2) {
        return Err(MlErr::UnsplittableClass {
            class: class.to_string(),
            samples: idxs.len(),
        });
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut train = Vec::with_capacity(texts.len());
    let mut test = Vec::new();

    for mut idxs in by_class.into_values() {
        let n = idxs.len();
        let n_test = ((n as f32 * test_size).round() as usize).clamp(1, n - 1);

        idxs.shuffle(&mut rng);
        let (held_out, kept) = idxs.split_at(n_test);
        test.extend_from_slice(held_out);
        train.extend_from_slice(kept);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    let pick = |idxs: &[usize], src: &[String]| -> Vec<String> {
        idxs.iter().map(|&i| src[i].clone()).collect()
    };

    Ok(Split {
        train_texts: pick(&train, texts),
        train_labels: pick(&train, labels),
        test_texts: pick(&test, texts),
        test_labels: pick(&test, labels),
    })
}
