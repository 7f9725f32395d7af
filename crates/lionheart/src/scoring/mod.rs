//! Turns a form-response submission into sub-trait and trait scores.

mod key;
mod normalize;
mod submission;
mod subtraits;
mod traits;

pub use key::{KeyLoadError, ScoringKey, ScoringRule};
pub use normalize::{normalize_subtrait, normalize_trait, trait_floor};
pub use submission::{
    AnswerField, DefinitionField, FormAnswer, FormDefinition, FormEvent, FormResponse, Respondent,
    Submission, SubmissionError, IDENTITY_ANSWERS,
};
pub use subtraits::{aggregate_subtraits, normalize_subtraits, SubtraitScore, SubtraitScores};
pub use traits::{aggregate_traits, normalize_traits, TraitScore, TraitScores};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Errors a single submission can raise while being scored.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] SubmissionError),
}

/// Finished scores for one respondent, ordered by dimension name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<FixedOffset>>,
    pub respondent: Respondent,
    pub subtraits: SubtraitScores,
    pub traits: TraitScores,
}

/// Runs the full pipeline for one parsed submission without any I/O.
pub fn score(submission: &Submission, key: &ScoringKey) -> ScoreReport {
    let mut subtraits = aggregate_subtraits(&submission.answers, key);
    normalize_subtraits(&mut subtraits);

    let mut traits = aggregate_traits(&subtraits);
    normalize_traits(&mut traits);

    ScoreReport {
        event_id: submission.event_id.clone(),
        submitted_at: submission.submitted_at,
        respondent: submission.respondent.clone(),
        subtraits,
        traits,
    }
}

/// Parses and scores a raw webhook payload.
pub fn score_payload(payload: &[u8], key: &ScoringKey) -> Result<ScoreReport, ScoringError> {
    let submission = Submission::from_payload(payload)?;
    Ok(score(&submission, key))
}
