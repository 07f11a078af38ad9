//! Bag of n-grams TF-IDF features for raw documents.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// Common english words that carry no signal for classification.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Hyperparameters of a `TfidfVectorizer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Inclusive range of n-gram sizes to extract.
    pub ngram_range: (usize, usize),
    /// Terms present in a smaller fraction of documents are ignored.
    pub min_df: f32,
    /// Terms present in a larger fraction of documents are ignored.
    pub max_df: f32,
    pub stop_words: bool,
    pub sublinear_tf: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            ngram_range: (1, 2),
            min_df: 0.0,
            max_df: 1.0,
            stop_words: true,
            sublinear_tf: false,
        }
    }
}

/// A sparse feature vector, `indices` are sorted and unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow {
    pub indices: Vec<usize>,
    pub values: Vec<f32>,
}

impl SparseRow {
    /// Iterates over the non zero `(feature, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }
}

/// Splits a document into lowercase word tokens of at least two characters.
///
/// A word is a run of alphanumeric characters or underscores.
pub fn tokenize(doc: &str, stop_words: bool) -> Vec<String> {
    doc.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|tok| tok.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(|tok| !stop_words || !STOP_WORDS.contains(&tok.as_str()))
        .collect()
}

/// Produces the space separated n-grams of `tokens` for every size in `range`.
fn ngrams(tokens: &[String], (lo, hi): (usize, usize)) -> Vec<String> {
    let mut out = Vec::new();

    for n in lo.max(1)..=hi {
        if n == 1 {
            out.extend(tokens.iter().cloned());
            continue;
        }

        out.extend(tokens.windows(n).map(|w| w.join(" ")));
    }

    out
}

/// Learns a vocabulary and its inverse document frequencies.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
}

impl TfidfVectorizer {
    /// Creates a new `TfidfVectorizer`.
    ///
    /// # Arguments
    /// * `config` - The vectorizer's hyperparameters.
    ///
    /// # Returns
    /// A new `TfidfVectorizer` instance.
    pub fn new(config: TfidfConfig) -> Self {
        Self { config }
    }

    /// Builds the vocabulary of `docs`, pruned by document frequency.
    ///
    /// Term indices follow the alphabetical order of the terms and the idf uses the smoothed
    /// formula `ln((1 + n) / (1 + df)) + 1`.
    ///
    /// # Arguments
    /// * `docs` - The training documents.
    ///
    /// # Returns
    /// A fitted `Tfidf` or an `MlErr` if `docs` is empty or no term survives pruning.
    pub fn fit(&self, docs: &[String]) -> Result<Tfidf> {
        if docs.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        let config = &self.config;
        let mut df: BTreeMap<String, usize> = BTreeMap::new();

        for doc in docs {
            let terms: BTreeSet<String> =
                ngrams(&tokenize(doc, config.stop_words), config.ngram_range)
                    .into_iter()
                    .collect();

            for term in terms {
                *df.entry(term).or_default() += 1;
            }
        }

        let n = docs.len() as f32;
        let min_count = config.min_df * n;
        let max_count = config.max_df * n;

        let kept: Vec<(String, usize)> = df
            .into_iter()
            .filter(|&(_, count)| count as f32 >= min_count && count as f32 <= max_count)
            .collect();

        if kept.is_empty() {
            return Err(MlErr::EmptyVocabulary {
                documents: docs.len(),
            });
        }

        let idf = kept
            .iter()
            .map(|&(_, count)| ((1.0 + n) / (1.0 + count as f32)).ln() + 1.0)
            .collect::<Array1<f32>>();

        let vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(i, (term, _))| (term, i))
            .collect();

        log::debug!(terms = idf.len(), documents = docs.len(); "fitted tf-idf vocabulary");

        Ok(Tfidf {
            config: config.clone(),
            vocabulary,
            idf,
        })
    }
}

/// A fitted TF-IDF transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tfidf {
    config: TfidfConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Array1<f32>,
}

impl Tfidf {
    /// The amount of features this transformation produces.
    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }

    /// Returns the feature index of `term`, if it's part of the vocabulary.
    #[cfg(test)]
    fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Transforms a single document into an L2 normalized tf-idf row.
    ///
    /// Out of vocabulary terms are ignored, a document without known terms becomes an empty row.
    pub fn transform_one(&self, doc: &str) -> SparseRow {
        let mut counts: HashMap<usize, f32> = HashMap::new();

        for term in ngrams(
            &tokenize(doc, self.config.stop_words),
            self.config.ngram_range,
        ) {
            if let Some(&i) = self.vocabulary.get(&term) {
                *counts.entry(i).or_default() += 1.0;
            }
        }

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(i, tf)| {
                let tf = if self.config.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (i, tf * self.idf[i])
            })
            .collect();
        entries.sort_unstable_by_key(|&(i, _)| i);

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            entries.iter_mut().for_each(|(_, v)| *v /= norm);
        }

        let (indices, values) = entries.into_iter().unzip();
        SparseRow { indices, values }
    }

    /// Transforms a batch of documents in parallel.
    pub fn transform(&self, docs: &[String]) -> Vec<SparseRow> {
        docs.par_iter().map(|doc| self.transform_one(doc)).collect()
    }
}
