//! Bag-of-words TF-IDF vectors and cosine similarity.
//!
//! Vocabulary and document frequencies are derived from the exact document
//! set passed in; nothing is cached between calls.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

/// Words of two or more word characters.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Lowercase word tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// TF-IDF matrix over a document set.
#[derive(Debug, Clone)]
pub struct TfIdfMatrix {
    vocabulary: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TfIdfMatrix {
    /// Fit the vocabulary on `documents` and vectorize each of them.
    ///
    /// Raw term counts, smoothed IDF `ln((1 + n) / (1 + df)) + 1`, and
    /// L2-normalized rows. A document with no tokens gets a zero row.
    pub fn fit_transform<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

        // Sorted vocabulary keeps column order stable
        let vocabulary: Vec<String> = tokenized
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let column: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for tokens in &tokenized {
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                df[column[term]] += 1;
            }
        }

        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n_docs) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows = tokenized
            .iter()
            .map(|tokens| {
                let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
                for token in tokens {
                    *counts.entry(column[token.as_str()]).or_default() += 1.0;
                }

                let mut row = vec![0.0; vocabulary.len()];
                for (col, count) in counts {
                    row[col] = count * idf[col];
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        Self { vocabulary, rows }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cosine similarity of row `index` against every other row, in order.
    pub fn similarities_to(&self, index: usize) -> Vec<f64> {
        let Some(anchor) = self.row(index) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, row)| cosine_similarity(anchor, row))
            .collect()
    }
}

fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > f64::EPSILON {
        for v in row.iter_mut() {
            *v /= norm;
        }
    }
}

/// Cosine similarity between two equal-length vectors; 0 if either is zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f64>().sqrt();

    if norm_a <= f64::EPSILON || norm_b <= f64::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_drops_single_chars() {
        assert_eq!(
            tokenize("Solar panels, on A rooftop!"),
            vec!["solar", "panels", "on", "rooftop"]
        );
        assert!(tokenize("a b c").is_empty());
    }

    #[test]
    fn test_identical_documents_have_unit_similarity() {
        let m = TfIdfMatrix::fit_transform(&["smart grids", "Smart Grids"]);
        let sims = m.similarities_to(0);
        assert_eq!(sims.len(), 1);
        assert!((sims[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_documents_have_zero_similarity() {
        let m = TfIdfMatrix::fit_transform(&["urban energy solutions", "Wind turbines"]);
        assert_eq!(m.similarities_to(0), vec![0.0]);
    }

    #[test]
    fn test_smoothed_idf_weighting() {
        // solar/panels appear in both documents, on/rooftops only in the second
        let m = TfIdfMatrix::fit_transform(&["solar panels", "Solar panels on rooftops"]);
        let sim = m.similarities_to(0)[0];
        let rare = (1.5f64).ln() + 1.0;
        let expected = 2.0 / (2.0f64.sqrt() * (2.0 + 2.0 * rare * rare).sqrt());
        assert!((sim - expected).abs() < 1e-9, "got {sim}, expected {expected}");
    }

    #[test]
    fn test_empty_document_gets_zero_row() {
        let m = TfIdfMatrix::fit_transform(&["", "solar"]);
        assert!(m.row(0).unwrap().iter().all(|v| *v == 0.0));
        assert_eq!(m.similarities_to(0), vec![0.0]);
    }

    #[test]
    fn test_all_empty_documents() {
        let m = TfIdfMatrix::fit_transform(&["", "!"]);
        assert!(m.vocabulary().is_empty());
        assert_eq!(m.similarities_to(0), vec![0.0]);
        assert!(m.similarities_to(5).is_empty());
    }

    #[test]
    fn test_rows_are_unit_length() {
        let m = TfIdfMatrix::fit_transform(&["hydrogen fuel cells", "fuel cells for city transport"]);
        for i in 0..m.len() {
            let norm: f64 = m.row(i).unwrap().iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }
}
