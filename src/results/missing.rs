use indexmap::{IndexMap, IndexSet};

use crate::{
    course::{Session, roster::Roster},
    feedback::{MISSING_RESPONSE_TEXT, Response, ResponseId},
};

/// question id → giver → every recipient the giver is expected to respond
/// to.
pub type ExpectationMap = IndexMap<String, IndexMap<String, IndexSet<String>>>;

/// Creates a placeholder response for every expected giver/recipient pair
/// which has no entry in `actual`.
///
/// Responses to questions (or from givers) that the expectation map does not
/// know about are ignored. The result follows the iteration order of
/// `expected`: question, then giver, then recipient.
pub fn synthesize(
    session: &Session,
    actual: &[Response],
    expected: &ExpectationMap,
    roster: &Roster,
) -> Vec<Response> {
    let mut remaining = expected.clone();

    for response in actual {
        let Some(givers) = remaining.get_mut(&response.question_id) else {
            continue;
        };
        let Some(recipients) = givers.get_mut(&response.giver) else {
            continue;
        };
        recipients.shift_remove(&response.recipient);
    }

    let mut placeholders = Vec::new();
    for (question_id, givers) in &remaining {
        for (giver, recipients) in givers {
            let giver_section = roster.info_for(giver).section_name;

            for recipient in recipients {
                placeholders.push(Response {
                    id: ResponseId::new(question_id, giver, recipient),
                    question_id: question_id.clone(),
                    course_id: session.course_id.clone(),
                    session_name: session.name.clone(),
                    giver: giver.clone(),
                    giver_section: giver_section.clone(),
                    recipient: recipient.clone(),
                    recipient_section: roster.info_for(recipient).section_name,
                    answer: MISSING_RESPONSE_TEXT.to_string(),
                    created_at: None,
                });
            }
        }
    }

    placeholders
}
