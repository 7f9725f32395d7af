use std::io::Cursor;
use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::results::{InMemorySender, ResultsLinkBuilder, ResultsService};
use crate::scoring::ScoringKey;

pub(super) const RESULTS_BASE: &str = "https://results.test/r/";

pub(super) fn scoring_key() -> ScoringKey {
    let source = "\
1|I am the life of the party.|2|E1|0
2|I feel comfortable around people.|1|E2|0
3|What else should we know about you?|0||0
4|I get stressed out easily.|1|N1|-3
";
    ScoringKey::from_reader(Cursor::new(source)).expect("fixture key loads")
}

pub(super) fn build_service() -> (ResultsService<InMemorySender>, InMemorySender) {
    let sender = InMemorySender::default();
    let service = ResultsService::new(
        Arc::new(scoring_key()),
        Arc::new(sender.clone()),
        ResultsLinkBuilder::new(RESULTS_BASE),
    );
    (service, sender)
}

pub(super) fn identity_answers(phone: &str) -> Vec<Value> {
    vec![
        json!({ "type": "text", "text": "Ann", "field": { "id": "name", "type": "short_text", "ref": "name" } }),
        json!({ "type": "email", "email": "a@b.com", "field": { "id": "email", "type": "email", "ref": "email" } }),
        json!({ "type": "phone_number", "phone_number": phone, "field": { "id": "phone", "type": "phone_number", "ref": "phone" } }),
    ]
}

pub(super) fn form_event(answers: Vec<Value>) -> Value {
    json!({
        "event_id": "01HQ9Z",
        "event_type": "form_response",
        "form_response": {
            "form_id": "lionheart-v2",
            "token": "resp-7f3",
            "landed_at": "2024-03-02T18:00:00Z",
            "submitted_at": "2024-03-02T18:04:11Z",
            "definition": { "id": "lionheart-v2", "title": "Lionheart", "fields": [] },
            "answers": answers,
        }
    })
}

/// Ann answers 3, 1, a free-text note, then 4.
pub(super) fn complete_payload() -> Vec<u8> {
    let mut answers = identity_answers("555");
    answers.push(json!({ "type": "number", "number": 3 }));
    answers.push(json!({ "type": "number", "number": 1 }));
    answers.push(json!({ "type": "text", "text": "I like chess" }));
    answers.push(json!({ "type": "number", "number": 4 }));
    serde_json::to_vec(&form_event(answers)).expect("payload serializes")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
