/// Dual-granularity TF-IDF features
///
/// Two independent vectorizers are fitted on the same corpus:
/// 1. Word n-grams (1-2) over tokens of two or more word characters
/// 2. Character n-grams (3-6) taken inside space-padded words
///
/// Each block is L2-normalized on its own and the blocks are concatenated,
/// word block first.
use crate::errors::{Result, RiskError};
use crate::pipeline_config::FeatureConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Sparse row vector with strictly increasing indices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f64>,
}

impl SparseVector {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices
            .iter()
            .zip(self.values.iter())
            .map(|(&i, &v)| (i as usize, v))
    }

    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter()
            .map(|(i, v)| dense.get(i).copied().unwrap_or(0.0) * v)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Analyzer {
    Word,
    CharWordBounded,
}

impl Analyzer {
    /// Extract the n-grams of `text`, lower-cased
    pub fn analyze(self, text: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
        let lowered = text.to_lowercase();
        match self {
            Analyzer::Word => word_ngrams(&lowered, min_n, max_n),
            Analyzer::CharWordBounded => char_wb_ngrams(&lowered, min_n, max_n),
        }
    }
}

fn word_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let tokens: Vec<&str> = WORD_TOKEN.find_iter(text).map(|m| m.as_str()).collect();
    let mut grams = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            grams.push(window.join(" "));
        }
    }
    grams
}

fn char_wb_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let mut grams = Vec::new();
    for word in text.split_whitespace() {
        let padded: Vec<char> = std::iter::once(' ')
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();

        for n in min_n.max(1)..=max_n {
            if padded.len() <= n {
                // A padded word no longer than n is counted once, whole
                grams.push(padded.iter().collect());
                break;
            }
            for window in padded.windows(n) {
                grams.push(window.iter().collect());
            }
        }
    }
    grams
}

/// One fitted TF-IDF block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
    ngram_range: (usize, usize),
    max_features: usize,
    vocabulary: FxHashMap<String, u32>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn fit(analyzer: Analyzer, ngram_range: (usize, usize), max_features: usize, texts: &[String]) -> Self {
        let mut term_counts: FxHashMap<String, u64> = FxHashMap::default();
        let mut doc_freq: FxHashMap<String, u64> = FxHashMap::default();

        for text in texts {
            let mut seen: FxHashSet<String> = FxHashSet::default();
            for gram in analyzer.analyze(text, ngram_range) {
                *term_counts.entry(gram.clone()).or_insert(0) += 1;
                seen.insert(gram);
            }
            for gram in seen {
                *doc_freq.entry(gram).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<(String, u64)> = term_counts.into_iter().collect();
        if terms.len() > max_features {
            // Most frequent first, ties broken by term so the cut is deterministic
            terms.sort_by(|a, b| match b.1.cmp(&a.1) {
                Ordering::Equal => a.0.cmp(&b.0),
                other => other,
            });
            terms.truncate(max_features);
        }
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = texts.len() as f64;
        let mut vocabulary = FxHashMap::default();
        let mut idf = Vec::with_capacity(terms.len());
        for (index, (term, _)) in terms.into_iter().enumerate() {
            let df = doc_freq.get(&term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, index as u32);
        }

        Self {
            analyzer,
            ngram_range,
            max_features,
            vocabulary,
            idf,
        }
    }

    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    pub fn term_index(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    /// L2-normalized tf-idf row; n-grams outside the vocabulary are dropped
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: FxHashMap<u32, f64> = FxHashMap::default();
        for gram in self.analyzer.analyze(text, self.ngram_range) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(u32, f64)> = counts
            .into_iter()
            .map(|(i, tf)| (i, tf * self.idf[i as usize]))
            .collect();
        entries.sort_unstable_by_key(|&(i, _)| i);

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        let scale = if norm > 0.0 { 1.0 / norm } else { 0.0 };

        SparseVector {
            indices: entries.iter().map(|&(i, _)| i).collect(),
            values: entries.iter().map(|&(_, v)| v * scale).collect(),
        }
    }
}

/// Fitted word + character feature union
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureExtractor {
    word: TfidfVectorizer,
    chars: TfidfVectorizer,
}

impl FeatureExtractor {
    /// Learn both vocabularies from `texts` (expected to be normalized already)
    pub fn fit(config: &FeatureConfig, texts: &[String]) -> Result<Self> {
        let word = TfidfVectorizer::fit(
            Analyzer::Word,
            config.word_ngram_range,
            config.word_max_features,
            texts,
        );
        let chars = TfidfVectorizer::fit(
            Analyzer::CharWordBounded,
            config.char_ngram_range,
            config.char_max_features,
            texts,
        );

        if word.dim() == 0 && chars.dim() == 0 {
            return Err(RiskError::Training(
                "empty vocabulary; the training texts contain no usable n-grams".to_string(),
            ));
        }

        tracing::debug!(
            "Fitted features: {} word terms, {} char terms",
            word.dim(),
            chars.dim()
        );
        Ok(Self { word, chars })
    }

    pub fn dim(&self) -> usize {
        self.word.dim() + self.chars.dim()
    }

    pub fn word_dim(&self) -> usize {
        self.word.dim()
    }

    pub fn transform(&self, text: &str) -> SparseVector {
        let word = self.word.transform(text);
        let chars = self.chars.transform(text);
        let offset = self.word.dim() as u32;

        let mut out = SparseVector {
            indices: Vec::with_capacity(word.nnz() + chars.nnz()),
            values: Vec::with_capacity(word.nnz() + chars.nnz()),
        };
        out.indices.extend(word.indices);
        out.values.extend(word.values);
        out.indices.extend(chars.indices.iter().map(|i| i + offset));
        out.values.extend(chars.values);
        out
    }

    pub fn transform_batch(&self, texts: &[String]) -> Vec<SparseVector> {
        texts.iter().map(|t| self.transform(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_word_ngrams() {
        let grams = Analyzer::Word.analyze("Subnet_ID = azurerm_subnet.a.id", (1, 2));
        assert_eq!(
            grams,
            vec!["subnet_id", "azurerm_subnet", "id", "subnet_id azurerm_subnet", "azurerm_subnet id"]
        );
    }

    #[test]
    fn test_char_wb_ngrams() {
        let grams = Analyzer::CharWordBounded.analyze("ab", (3, 6));
        // " ab " has length 4: two 3-grams, one 4-gram, then stop
        assert_eq!(grams, vec![" ab", "ab ", " ab "]);

        let grams = Analyzer::CharWordBounded.analyze("a", (3, 6));
        assert_eq!(grams, vec![" a "]);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let texts = corpus(&["alpha alpha alpha beta", "alpha gamma"]);
        let vectorizer = TfidfVectorizer::fit(Analyzer::Word, (1, 1), 2, &texts);

        assert_eq!(vectorizer.dim(), 2);
        assert_eq!(vectorizer.term_index("alpha"), Some(0));
        // beta and gamma tie on count; the lexicographically smaller one stays
        assert_eq!(vectorizer.term_index("beta"), Some(1));
        assert_eq!(vectorizer.term_index("gamma"), None);
    }

    #[test]
    fn test_transform_is_l2_normalized_and_ignores_oov() {
        let texts = corpus(&["resource azurerm_subnet subnet", "resource azurerm_network_interface nic"]);
        let extractor = FeatureExtractor::fit(&FeatureConfig::default(), &texts).unwrap();

        let row = extractor.transform("resource azurerm_subnet subnet");
        let word_norm = row
            .iter()
            .filter(|(i, _)| *i < extractor.word_dim())
            .map(|(_, v)| v * v)
            .sum::<f64>()
            .sqrt();
        assert!((word_norm - 1.0).abs() < 1e-9);
        assert!(row.indices.windows(2).all(|w| w[0] < w[1]));
        assert!(row.indices.iter().all(|&i| (i as usize) < extractor.dim()));

        let unseen = extractor.transform("zzzz qqqq");
        assert_eq!(unseen.nnz(), 0);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let texts = corpus(&["name = \"a\" location = \"eastus\"", "subnet_id = azurerm_subnet.s.id"]);
        let a = FeatureExtractor::fit(&FeatureConfig::default(), &texts).unwrap();
        let b = FeatureExtractor::fit(&FeatureConfig::default(), &texts).unwrap();

        for text in &texts {
            assert_eq!(a.transform(text), b.transform(text));
        }
        assert_eq!(a.dim(), b.dim());
    }

    #[test]
    fn test_empty_corpus_is_error() {
        let err = FeatureExtractor::fit(&FeatureConfig::default(), &corpus(&["", ""])).unwrap_err();
        assert!(matches!(err, RiskError::Training(_)));
    }
}
