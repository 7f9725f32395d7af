use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Identity answers precede the scored questions in every form.
pub const IDENTITY_ANSWERS: usize = 3;

/// Why a payload could not become a [`Submission`].
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("payload is not a valid form-response event: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("expected at least 3 identity answers, found {found}")]
    MissingIdentity { found: usize },
}

/// Contact details captured by the first three form answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Respondent {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// One decoded form submission. `answers` excludes the identity answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub event_id: String,
    pub event_type: String,
    pub form_id: String,
    pub token: String,
    pub submitted_at: Option<DateTime<FixedOffset>>,
    pub respondent: Respondent,
    pub answers: Vec<f64>,
}

impl Submission {
    pub fn from_payload(payload: &[u8]) -> Result<Self, SubmissionError> {
        let event: FormEvent = serde_json::from_slice(payload)?;
        Self::from_event(event)
    }

    pub fn from_event(event: FormEvent) -> Result<Self, SubmissionError> {
        let FormEvent {
            event_id,
            event_type,
            form_response,
        } = event;
        let FormResponse {
            form_id,
            token,
            submitted_at,
            answers,
            ..
        } = form_response;

        if answers.len() < IDENTITY_ANSWERS {
            return Err(SubmissionError::MissingIdentity {
                found: answers.len(),
            });
        }

        let mut answers = answers.into_iter();
        let mut next_answer = || answers.next().unwrap_or_default();
        let respondent = Respondent {
            name: next_answer().text.unwrap_or_default(),
            email: next_answer().email.unwrap_or_default(),
            phone: next_answer().phone_number.unwrap_or_default(),
        };

        let scored = answers
            .map(|answer| answer.number.unwrap_or_default())
            .collect();

        Ok(Self {
            event_id,
            event_type,
            form_id,
            token,
            submitted_at: submitted_at.as_deref().and_then(parse_timestamp),
            respondent,
            answers: scored,
        })
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(trimmed).ok()
}

/// Webhook senders emit `null` for fields they have no value for; treat it the
/// same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::<T>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Form-response webhook event. Only `form_response.answers` drives scoring;
/// the rest is carried for logging and reports.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub event_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub form_response: FormResponse,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub form_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub token: String,
    pub landed_at: Option<String>,
    pub submitted_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub definition: FormDefinition,
    #[serde(deserialize_with = "null_as_default")]
    pub answers: Vec<FormAnswer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormDefinition {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fields: Vec<DefinitionField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DefinitionField {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(rename = "ref", deserialize_with = "null_as_default")]
    pub reference: String,
    pub properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormAnswer {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    pub text: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub number: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub field: AnswerField,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnswerField {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(rename = "ref", deserialize_with = "null_as_default")]
    pub reference: String,
}
