use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::catalog::ClassCatalog;

/// Raw per-class scores for one image, index-aligned with the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores(pub Vec<f64>);

impl ClassScores {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for ClassScores {
    fn from(v: Vec<f64>) -> Self {
        ClassScores(v)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RankError {
    #[error("classifier returned {scores} scores for {classes} classes")]
    LengthMismatch { scores: usize, classes: usize },

    #[error("score for class index {index} is not a finite number")]
    NonFinite { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedClass {
    pub class: String,
    pub score: f64,
}

/// Scores turned into labels, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub top_class: String,
    /// Raw score of `top_class`; not re-normalized.
    pub confidence: f64,
    /// Every class, descending by score; equal scores keep catalog order.
    pub ranked: Vec<RankedClass>,
}

/// Ranks `scores` against `catalog`.
///
/// Ties always resolve to the lowest catalog index, so the same scores give
/// the same ranking every time.
pub fn rank(scores: &ClassScores, catalog: &ClassCatalog) -> Result<Ranking, RankError> {
    if scores.len() != catalog.len() || scores.is_empty() {
        return Err(RankError::LengthMismatch { scores: scores.len(), classes: catalog.len() });
    }
    if let Some(index) = scores.0.iter().position(|s| !s.is_finite()) {
        return Err(RankError::NonFinite { index });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    // stable sort: equal scores stay in ascending index order
    order.sort_by(|&a, &b| scores.0[b].partial_cmp(&scores.0[a]).unwrap_or(Ordering::Equal));

    let ranked: Vec<RankedClass> = order.iter()
        .filter_map(|&i| catalog.get(i).map(|class| RankedClass {
            class: class.to_owned(),
            score: scores.0[i],
        }))
        .collect();

    let top = ranked.first().cloned().ok_or(RankError::LengthMismatch {
        scores: scores.len(),
        classes: catalog.len(),
    })?;

    Ok(Ranking { top_class: top.class, confidence: top.score, ranked })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(ids: &[&str]) -> ClassCatalog {
        ClassCatalog::new(ids.iter().copied()).unwrap()
    }

    fn order(r: &Ranking) -> Vec<&str> {
        r.ranked.iter().map(|c| c.class.as_str()).collect()
    }

    #[test]
    fn picks_the_maximum() {
        let r = rank(&vec![0.2, 0.8].into(), &catalog(&["healthy", "blight"])).unwrap();
        assert_eq!(r.top_class, "blight");
        assert_eq!(r.confidence, 0.8);
        assert_eq!(order(&r), vec!["blight", "healthy"]);
    }

    #[test]
    fn ties_go_to_the_lowest_index() {
        let r = rank(&vec![0.5, 0.5, 0.0].into(), &catalog(&["A", "B", "C"])).unwrap();
        assert_eq!(r.top_class, "A");
        assert_eq!(order(&r), vec!["A", "B", "C"]);

        let r = rank(&vec![0.1, 0.3, 0.3, 0.3].into(), &catalog(&["w", "x", "y", "z"])).unwrap();
        assert_eq!(order(&r), vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn confidence_is_not_renormalized() {
        let r = rank(&vec![2.0, 6.0].into(), &catalog(&["a", "b"])).unwrap();
        assert_eq!(r.confidence, 6.0);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = rank(&vec![1.0].into(), &catalog(&["a", "b"])).unwrap_err();
        assert_eq!(err, RankError::LengthMismatch { scores: 1, classes: 2 });
    }

    #[test]
    fn nan_is_rejected() {
        let err = rank(&vec![0.1, f64::NAN].into(), &catalog(&["a", "b"])).unwrap_err();
        assert_eq!(err, RankError::NonFinite { index: 1 });
    }
}
