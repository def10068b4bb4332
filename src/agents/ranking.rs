//! Relevance scoring of a hypothesis against its query.

use serde::{Deserialize, Serialize};

use crate::similarity::TfIdfMatrix;
use crate::source::Hypothesis;

use super::{MAX_SCORE, MIN_SCORE};

/// Outcome of ranking a hypothesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    /// `"<idea> - Score: <score>/10"`
    pub label: String,
    pub score: u32,
}

/// Scores ideas by their best TF-IDF cosine similarity to the query.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityRanker;

impl SimilarityRanker {
    pub fn new() -> Self {
        Self
    }

    /// Score the hypothesis and write the score back into it.
    pub fn rank(&self, query: &str, hypothesis: &mut Hypothesis) -> Ranking {
        let score = self.score(query, &hypothesis.idea, &hypothesis.alt_ideas);
        hypothesis.score = Some(score);

        Ranking {
            label: format!("{} - Score: {}/10", hypothesis.idea, score),
            score,
        }
    }

    /// Best similarity of the idea or any alternate to the query, scaled to
    /// 0..=10, rounded half-to-even and clamped to [`MIN_SCORE`, `MAX_SCORE`].
    pub fn score(&self, query: &str, idea: &str, alt_ideas: &[String]) -> u32 {
        let mut documents: Vec<&str> = Vec::with_capacity(alt_ideas.len() + 2);
        documents.push(query);
        documents.push(idea);
        documents.extend(alt_ideas.iter().map(String::as_str));

        let matrix = TfIdfMatrix::fit_transform(&documents);
        let best = matrix
            .similarities_to(0)
            .into_iter()
            .fold(0.0_f64, f64::max);

        let raw = (best * 10.0).round_ties_even() as i64;
        raw.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unrelated_idea_gets_floor_score() {
        let mut h = Hypothesis::new("Solar panels on rooftops", "stub")
            .with_alt_ideas(vec!["Wind turbines".to_string()]);

        let ranking = SimilarityRanker::new().rank("urban energy solutions", &mut h);

        assert_eq!(ranking.score, 3);
        assert_eq!(h.score, Some(3));
        assert_eq!(ranking.label, "Solar panels on rooftops - Score: 3/10");
    }

    #[test]
    fn test_overlapping_idea_scores_above_floor() {
        let mut h = Hypothesis::new("Solar panels on rooftops", "stub");
        // cosine ~0.58 -> 6
        assert_eq!(SimilarityRanker::new().rank("solar panels", &mut h).score, 6);
    }

    #[test]
    fn test_identical_text_hits_ceiling() {
        let mut h = Hypothesis::new("Smart grids", "stub");
        assert_eq!(SimilarityRanker::new().rank("smart grids", &mut h).score, 10);
    }

    #[test]
    fn test_best_alternate_wins() {
        let ranker = SimilarityRanker::new();
        let without = ranker.score("smart grids", "Hydrogen fuel cells", &[]);
        let with = ranker.score(
            "smart grids",
            "Hydrogen fuel cells",
            &["Smart grids".to_string()],
        );
        assert_eq!(without, 3);
        assert_eq!(with, 10);
    }

    #[test]
    fn test_degenerate_input_gets_floor_score() {
        let ranker = SimilarityRanker::new();
        assert_eq!(ranker.score("", "", &[]), 3);
        assert_eq!(ranker.score("a", "b", &[]), 3);
    }

    proptest! {
        #[test]
        fn prop_score_is_bounded(
            query in "[a-z ]{0,40}",
            idea in "[a-z ]{0,40}",
            alts in proptest::collection::vec("[a-z ]{0,20}", 0..3),
        ) {
            let mut h = Hypothesis::new(idea, "prop").with_alt_ideas(alts);
            let ranking = SimilarityRanker::new().rank(&query, &mut h);
            prop_assert!((MIN_SCORE..=MAX_SCORE).contains(&ranking.score));
            prop_assert_eq!(h.score, Some(ranking.score));
        }
    }
}
