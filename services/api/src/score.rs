use crate::infra::{load_scoring_key, ConfiguredSender};
use clap::Args;
use lionheart::config::AppConfig;
use lionheart::error::AppError;
use lionheart::results::{ResultsLinkBuilder, ResultsService};
use lionheart::scoring::{ScoreReport, ScoringError, Submission};
use lionheart::telemetry;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Form-response webhook payload (JSON) to score
    #[arg(long)]
    pub(crate) payload: PathBuf,
    /// Scoring key file; defaults to SCORING_KEY_PATH
    #[arg(long)]
    pub(crate) key: Option<PathBuf>,
    /// Base URL for results links; defaults to RESULTS_BASE_URL
    #[arg(long)]
    pub(crate) results_base_url: Option<String>,
    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
    /// Text the respondent their results link after scoring
    #[arg(long)]
    pub(crate) notify: bool,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        payload,
        key,
        results_base_url,
        json,
        notify,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(path) = key {
        config.scoring.key_path = path;
    }
    if let Some(base_url) = results_base_url {
        config.scoring.results_base_url = base_url;
    }

    telemetry::init(&config.telemetry)?;

    let key = load_scoring_key(&config.scoring)?;
    let sender = Arc::new(ConfiguredSender::from_config(&config.notifications));
    let links = ResultsLinkBuilder::new(config.scoring.results_base_url.clone());
    let service = ResultsService::new(key, sender.clone(), links);

    let raw = std::fs::read(&payload)?;
    let report = if notify {
        let report = service.process(&raw)?;
        sender.flush().await;
        report
    } else {
        let submission = Submission::from_payload(&raw).map_err(ScoringError::from)?;
        service.score(&submission)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    Ok(())
}

fn render_report(report: &ScoreReport) -> String {
    let mut out = String::new();
    let respondent = &report.respondent;

    let _ = writeln!(
        out,
        "Lionheart results for {} <{}>",
        display_or_dash(&respondent.name),
        display_or_dash(&respondent.email)
    );
    match report.submitted_at {
        Some(at) => {
            let _ = writeln!(out, "Event {} submitted {}", report.event_id, at.to_rfc3339());
        }
        None => {
            let _ = writeln!(out, "Event {}", display_or_dash(&report.event_id));
        }
    }

    if report.traits.is_empty() {
        let _ = writeln!(out, "\nTraits: none scored");
    } else {
        let _ = writeln!(out, "\nTraits");
        for score in report.traits.values() {
            let _ = writeln!(
                out,
                "- {}: {} (raw {}, floor {})",
                score.name, score.normalized_score, score.raw_score, score.floor
            );
        }
    }

    if !report.subtraits.is_empty() {
        let _ = writeln!(out, "\nSub-traits");
        for score in report.subtraits.values() {
            let _ = writeln!(
                out,
                "- {}: {} (raw {}, floor {})",
                score.name, score.normalized_score, score.raw_score, score.floor
            );
        }
    }

    out
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lionheart::scoring::{score, ScoringKey};
    use serde_json::json;

    fn report() -> ScoreReport {
        let key = ScoringKey::from_reader("1|a|2|E1|0\n2|b|1|N1|-3\n".as_bytes())
            .expect("key loads");
        let payload = serde_json::to_vec(&json!({
            "event_id": "evt-9",
            "form_response": {
                "answers": [
                    { "type": "text", "text": "Ann" },
                    { "type": "email", "email": "" },
                    { "type": "phone_number", "phone_number": "555" },
                    { "type": "number", "number": 3 },
                    { "type": "number", "number": 1 }
                ]
            }
        }))
        .expect("payload serializes");
        let submission = Submission::from_payload(&payload).expect("payload parses");
        score(&submission, &key)
    }

    #[test]
    fn text_report_lists_traits_then_subtraits() {
        let rendered = render_report(&report());

        assert!(rendered.starts_with("Lionheart results for Ann <->\nEvent evt-9\n"));
        let traits_at = rendered.find("\nTraits\n").expect("traits section");
        let subtraits_at = rendered.find("\nSub-traits\n").expect("subtraits section");
        assert!(traits_at < subtraits_at);
        assert!(rendered.contains("- E: 0 (raw 6, floor 6)"));
        assert!(rendered.contains("- E1: 38 (raw 6, floor 0)"));
        assert!(rendered.contains("- N1: 25 (raw 1, floor -3)"));
    }

    #[test]
    fn empty_report_says_nothing_scored() {
        let mut report = report();
        report.traits.clear();
        report.subtraits.clear();

        let rendered = render_report(&report);
        assert!(rendered.contains("Traits: none scored"));
        assert!(!rendered.contains("Sub-traits"));
    }
}
