use super::normalize::{normalize_trait, trait_floor};
use super::subtraits::SubtraitScores;
use serde::Serialize;
use std::collections::BTreeMap;

/// Coarse dimension formed from every sub-trait sharing its letter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitScore {
    pub name: String,
    pub raw_score: f64,
    pub normalized_score: f64,
    pub floor: f64,
}

impl TraitScore {
    pub fn new(letter: char, raw_score: f64) -> Self {
        Self {
            name: letter.to_string(),
            raw_score,
            normalized_score: 0.0,
            floor: trait_floor(letter),
        }
    }

    pub fn normalize(&mut self) {
        self.normalized_score = normalize_trait(self.raw_score, self.floor);
    }
}

pub type TraitScores = BTreeMap<String, TraitScore>;

pub fn aggregate_traits(subtraits: &SubtraitScores) -> TraitScores {
    let mut traits = TraitScores::new();

    for subtrait in subtraits.values() {
        let Some(letter) = subtrait.trait_letter() else {
            continue;
        };

        traits
            .entry(letter.to_string())
            .and_modify(|score| score.raw_score += subtrait.raw_score)
            .or_insert_with(|| TraitScore::new(letter, subtrait.raw_score));
    }

    traits
}

pub fn normalize_traits(traits: &mut TraitScores) {
    for score in traits.values_mut() {
        score.normalize();
    }
}
