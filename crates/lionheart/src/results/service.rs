use std::sync::Arc;

use tracing::{info, warn};

use super::notify::{Notification, NotificationSender};
use crate::scoring::{self, ScoreReport, ScoringError, ScoringKey, Submission};

/// Builds the public link where a respondent's results are hosted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsLinkBuilder {
    base_url: String,
}

impl ResultsLinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Prefers the response token and falls back to the event id.
    pub fn link_for(&self, submission: &Submission) -> String {
        let id = if submission.token.is_empty() {
            submission.event_id.as_str()
        } else {
            submission.token.as_str()
        };
        format!("{}/{}", self.base_url, id)
    }
}

/// Scores submissions against a shared key and notifies respondents.
pub struct ResultsService<N> {
    key: Arc<ScoringKey>,
    sender: Arc<N>,
    links: ResultsLinkBuilder,
}

impl<N> ResultsService<N>
where
    N: NotificationSender + 'static,
{
    pub fn new(key: Arc<ScoringKey>, sender: Arc<N>, links: ResultsLinkBuilder) -> Self {
        Self { key, sender, links }
    }

    /// Scores a parsed submission. Performs no I/O.
    pub fn score(&self, submission: &Submission) -> ScoreReport {
        scoring::score(submission, &self.key)
    }

    /// Parses, scores, then hands the results link to the sender. Delivery is
    /// best effort and never affects the returned report.
    pub fn process(&self, payload: &[u8]) -> Result<ScoreReport, ScoringError> {
        let submission = Submission::from_payload(payload).inspect_err(|err| {
            warn!(error = %err, "rejecting form-response payload");
        })?;

        let report = self.score(&submission);
        info!(
            event_id = %report.event_id,
            subtraits = report.subtraits.len(),
            traits = report.traits.len(),
            "submission scored"
        );

        self.notify(&submission);
        Ok(report)
    }

    fn notify(&self, submission: &Submission) {
        let phone = submission.respondent.phone.trim();
        if phone.is_empty() {
            warn!(
                event_id = %submission.event_id,
                "respondent left no phone number; skipping notification"
            );
            return;
        }

        let link = self.links.link_for(submission);
        self.sender.send(Notification::results_ready(phone, &link));
    }
}
