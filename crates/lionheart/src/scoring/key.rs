use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// How a single question contributes to a sub-trait.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRule {
    pub ordinal: u32,
    pub description: String,
    pub weight: i32,
    /// Empty when the question is not scored (free text, consent, etc).
    pub subtrait: String,
    pub floor: f64,
}

impl ScoringRule {
    pub fn is_scored(&self) -> bool {
        !self.subtrait.is_empty()
    }
}

/// Failure to produce a usable [`ScoringKey`].
#[derive(Debug, thiserror::Error)]
pub enum KeyLoadError {
    #[error("failed to read scoring key: {0}")]
    Io(#[from] std::io::Error),
    #[error("scoring key line {line} is malformed: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },
    #[error("scoring key line {line}: field `{field}` has invalid value '{value}'")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },
    #[error("scoring key line {line} repeats ordinal {ordinal}")]
    DuplicateOrdinal { ordinal: u32, line: u64 },
}

/// Immutable question-ordinal to rule lookup, loaded once per process.
#[derive(Debug, Clone, Default)]
pub struct ScoringKey {
    rules: HashMap<u32, ScoringRule>,
}

impl ScoringKey {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, KeyLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses `ordinal|description|weight|subtrait|floor` lines. Any malformed
    /// line fails the whole load.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, KeyLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rules = HashMap::new();

        for record in csv_reader.records() {
            let record = record.map_err(|source| KeyLoadError::Csv {
                line: source.position().map(|pos| pos.line()).unwrap_or_default(),
                source,
            })?;
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();
            let rule = parse_rule(&record, line)?;

            if rules.contains_key(&rule.ordinal) {
                return Err(KeyLoadError::DuplicateOrdinal {
                    ordinal: rule.ordinal,
                    line,
                });
            }
            rules.insert(rule.ordinal, rule);
        }

        debug!(rules = rules.len(), "scoring key loaded");
        Ok(Self { rules })
    }

    pub fn rule(&self, ordinal: u32) -> Option<&ScoringRule> {
        self.rules.get(&ordinal)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules that feed a sub-trait.
    pub fn scored_len(&self) -> usize {
        self.rules.values().filter(|rule| rule.is_scored()).count()
    }
}

impl FromIterator<ScoringRule> for ScoringKey {
    /// The first rule for an ordinal is kept; repeats are ignored.
    fn from_iter<I: IntoIterator<Item = ScoringRule>>(iter: I) -> Self {
        let mut rules = HashMap::new();
        for rule in iter {
            rules.entry(rule.ordinal).or_insert(rule);
        }
        Self { rules }
    }
}

fn parse_rule(record: &csv::StringRecord, line: u64) -> Result<ScoringRule, KeyLoadError> {
    if record.len() != 5 {
        return Err(KeyLoadError::InvalidField {
            line,
            field: "record",
            value: format!("expected 5 fields, found {}", record.len()),
        });
    }

    let field = |index: usize| record.get(index).unwrap_or_default();

    Ok(ScoringRule {
        ordinal: parse_number(field(0), "ordinal", line)?,
        description: field(1).to_string(),
        weight: parse_number(field(2), "weight", line)?,
        subtrait: field(3).to_string(),
        floor: parse_number(field(4), "floor", line)?,
    })
}

fn parse_number<T: std::str::FromStr>(
    raw: &str,
    field: &'static str,
    line: u64,
) -> Result<T, KeyLoadError> {
    raw.parse::<T>().map_err(|_| KeyLoadError::InvalidField {
        line,
        field,
        value: raw.to_string(),
    })
}
