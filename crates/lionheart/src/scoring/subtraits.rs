use super::key::ScoringKey;
use super::normalize::normalize_subtrait;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// Weighted score for one fine-grained dimension such as `E1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtraitScore {
    pub name: String,
    pub raw_score: f64,
    pub normalized_score: f64,
    pub floor: f64,
}

impl SubtraitScore {
    pub fn new(name: impl Into<String>, raw_score: f64, floor: f64) -> Self {
        Self {
            name: name.into(),
            raw_score,
            normalized_score: 0.0,
            floor,
        }
    }

    /// First character of the name, which selects the parent trait.
    pub fn trait_letter(&self) -> Option<char> {
        self.name.chars().next()
    }

    pub fn normalize(&mut self) {
        self.normalized_score = normalize_subtrait(self.raw_score, self.floor);
    }
}

pub type SubtraitScores = BTreeMap<String, SubtraitScore>;

/// Accumulates `weight * value` per sub-trait. The answer at position `i`
/// is governed by the rule with ordinal `i + 1`; answers without a rule or
/// with an unscored rule contribute nothing.
pub fn aggregate_subtraits(answers: &[f64], key: &ScoringKey) -> SubtraitScores {
    let mut scores = SubtraitScores::new();

    for (position, value) in answers.iter().enumerate() {
        let ordinal = position as u32 + 1;
        let Some(rule) = key.rule(ordinal).filter(|rule| rule.is_scored()) else {
            trace!(ordinal, "answer is not scored");
            continue;
        };

        let contribution = f64::from(rule.weight) * value;
        scores
            .entry(rule.subtrait.clone())
            .and_modify(|score| score.raw_score += contribution)
            .or_insert_with(|| SubtraitScore::new(rule.subtrait.clone(), contribution, rule.floor));
    }

    scores
}

pub fn normalize_subtraits(scores: &mut SubtraitScores) {
    for score in scores.values_mut() {
        score.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::key::ScoringRule;

    fn rule(ordinal: u32, weight: i32, subtrait: &str, floor: f64) -> ScoringRule {
        ScoringRule {
            ordinal,
            description: format!("question {ordinal}"),
            weight,
            subtrait: subtrait.to_string(),
            floor,
        }
    }

    #[test]
    fn answers_align_with_one_based_ordinals() {
        let key: ScoringKey = [rule(1, 2, "E1", 0.0), rule(2, 1, "E1", 0.0)]
            .into_iter()
            .collect();

        let scores = aggregate_subtraits(&[3.0, 1.0], &key);

        assert_eq!(scores.len(), 1);
        assert_eq!(scores["E1"].raw_score, 7.0);
    }

    #[test]
    fn unscored_and_unknown_questions_are_skipped() {
        let key: ScoringKey = [rule(1, 0, "", 0.0), rule(2, 1, "O3", -6.0)]
            .into_iter()
            .collect();

        // Third answer has no rule at all.
        let scores = aggregate_subtraits(&[5.0, 4.0, 9.0], &key);

        assert_eq!(scores.len(), 1);
        assert_eq!(scores["O3"].raw_score, 4.0);
    }

    #[test]
    fn floor_comes_from_the_first_contributing_rule() {
        let key: ScoringKey = [rule(1, 1, "C2", -4.0), rule(2, -1, "C2", 8.0)]
            .into_iter()
            .collect();

        let scores = aggregate_subtraits(&[2.0, 5.0], &key);

        let c2 = &scores["C2"];
        assert_eq!(c2.raw_score, -3.0);
        assert_eq!(c2.floor, -4.0);
    }

    #[test]
    fn normalize_fills_every_score() {
        let mut scores = SubtraitScores::new();
        scores.insert("E1".into(), SubtraitScore::new("E1", 10.0, 6.0));
        scores.insert("A2".into(), SubtraitScore::new("A2", 2.0, 0.0));

        normalize_subtraits(&mut scores);

        assert_eq!(scores["E1"].normalized_score, 25.0);
        assert_eq!(scores["A2"].normalized_score, 12.0);
    }
}
