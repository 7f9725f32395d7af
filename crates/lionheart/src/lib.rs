//! Lionheart scores personality survey submissions received from a
//! form-response webhook and texts each respondent a link to their results.

pub mod config;
pub mod error;
pub mod results;
pub mod scoring;
pub mod telemetry;
