//! Feedback results aggregation for course feedback sessions.
//!
//! The entry point is [`results::ResultsBundle::build`], which merges the
//! submitted responses of a session against the full set of expected
//! giver/recipient pairs, hides the identities the current viewer may not
//! see, and exposes the orderings and groupings used by the result views and
//! the CSV export.

pub mod config;
pub mod course;
pub mod error;
pub mod feedback;
pub mod results;

#[cfg(any(test, fuzzing))]
pub mod test;
