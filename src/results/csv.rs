//! Spreadsheet export of a bundle.

use std::{collections::HashSet, io};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    course::UNKNOWN_TEXT,
    feedback::{Comment, Response, ResponseView},
    results::{DisplayResponse, ResultsBundle},
};

const HEADER: [&str; 12] = [
    "Question",
    "Giver's Team",
    "Giver's Full Name",
    "Giver's Last Name",
    "Giver's Email",
    "Recipient's Team",
    "Recipient's Full Name",
    "Recipient's Last Name",
    "Recipient's Email",
    "Feedback",
    "Participant Comment",
    "Comments",
];

/// Plain text of a comment: tags stripped, entities decoded, whitespace
/// collapsed, followed by the address of every embedded image.
pub fn comment_plain_text(html: &str) -> String {
    static BLOCK: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)</?(?:p|div|br|li|ul|ol|h[1-6]|tr|td|th|table|blockquote|pre)\b[^>]*>")
            .unwrap()
    });
    // No tag survives; the text of scripts and styles goes with them.
    static TEXT_ONLY: Lazy<ammonia::Builder<'static>> = Lazy::new(|| {
        let mut builder = ammonia::Builder::empty();
        builder.clean_content_tags(HashSet::from(["script", "style"]));
        builder
    });
    static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    static IMAGE_SRC: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
            .unwrap()
    });

    let text = BLOCK.replace_all(html, " ");
    let text = TEXT_ONLY.clean(&text).to_string();
    let text = unescape(&text);
    let mut plain = WHITESPACE.replace_all(&text, " ").trim().to_string();

    let images = IMAGE_SRC
        .captures_iter(html)
        .filter_map(|captures| {
            captures
                .get(1)
                .or_else(|| captures.get(2))
                .or_else(|| captures.get(3))
        })
        .map(|src| absolute_url(src.as_str()))
        .collect::<Vec<_>>();
    if !images.is_empty() {
        plain.push_str(" Images Link: ");
        for src in images {
            plain.push_str(src);
            plain.push(' ');
        }
    }

    plain
}

/// Relative addresses cannot be resolved without a base and come out empty.
fn absolute_url(src: &str) -> &str {
    static SCHEME: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").unwrap());

    let src = src.trim();
    if SCHEME.is_match(src) { src } else { "" }
}

/// Undoes the escaping of sanitised text. The parser has already decoded
/// the entities of the input, so only these few can appear.
fn unescape(text: &str) -> String {
    static ESCAPED: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"&(amp|lt|gt|quot|nbsp);").unwrap());

    ESCAPED
        .replace_all(text, |captures: &Captures| match &captures[1] {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            _ => " ",
        })
        .into_owned()
}

/// A comment as one always-quoted CSV cell.
pub fn comment_csv_cell(comment: &Comment) -> String {
    format!("\"{}\"", comment_plain_text(&comment.text).replace('"', "\"\""))
}

impl ResultsBundle {
    fn comment_giver_name(&self, email: &str) -> &str {
        self.comment_giver_names
            .get(email)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_TEXT)
    }

    fn comments_on(&self, response: &impl ResponseView) -> &[Comment] {
        self.comments()
            .get(response.id())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `,<giver name>,<cell>` for every comment not written by a feedback
    /// participant; empty if there are none.
    pub fn csv_instructor_comments(&self, response: &impl ResponseView) -> String {
        self.comments_on(response)
            .iter()
            .filter(|comment| !comment.from_participant)
            .map(|comment| {
                format!(
                    ",{},{}",
                    self.comment_giver_name(&comment.giver),
                    comment_csv_cell(comment)
                )
            })
            .collect()
    }

    /// The cell of the first comment written by a feedback participant, or
    /// an empty string.
    pub fn csv_participant_comment(&self, response: &impl ResponseView) -> String {
        self.comments_on(response)
            .iter()
            .find(|comment| comment.from_participant)
            .map(comment_csv_cell)
            .unwrap_or_default()
    }

    fn comment_fields(&self, response: &impl ResponseView) -> Vec<String> {
        let comments = self.comments_on(response);
        let participant = comments
            .iter()
            .find(|comment| comment.from_participant)
            .map(|comment| comment_plain_text(&comment.text))
            .unwrap_or_default();

        let mut fields = vec![participant];
        for comment in comments.iter().filter(|comment| !comment.from_participant) {
            fields.push(self.comment_giver_name(&comment.giver).to_string());
            fields.push(comment_plain_text(&comment.text));
        }
        fields
    }

    fn question_label(&self, question_id: &str) -> String {
        match self.question(question_id) {
            Some(question) => format!("{}: {}", question.number, question.text),
            None => question_id.to_string(),
        }
    }

    fn displayed_row(&self, response: &DisplayResponse) -> Vec<String> {
        let giver = response.giver();
        let recipient = response.recipient();

        let mut row = vec![
            self.question_label(response.question_id()),
            self.team_name_for(giver).to_string(),
            self.name_for(giver).to_string(),
            self.last_name_for(giver).to_string(),
            self.displayable_email_giver(response).to_string(),
            self.team_name_for(recipient).to_string(),
            self.name_for(recipient).to_string(),
            self.last_name_for(recipient).to_string(),
            self.displayable_email_recipient(response).to_string(),
            response.answer().to_string(),
        ];
        row.extend(self.comment_fields(response));
        row
    }

    fn missing_row(&self, response: &Response) -> Vec<String> {
        let giver = &response.giver;
        let recipient = &response.recipient;

        vec![
            self.question_label(&response.question_id),
            self.team_name_from_roster(giver).to_string(),
            self.full_name_from_roster(giver),
            self.last_name_from_roster(giver),
            self.displayable_email_from_roster(giver).to_string(),
            self.team_name_from_roster(recipient).to_string(),
            self.full_name_from_roster(recipient),
            self.last_name_from_roster(recipient),
            self.displayable_email_from_roster(recipient).to_string(),
            response.answer.clone(),
        ]
    }

    /// Writes the whole bundle as CSV: a session header, then one row per
    /// displayed response in question order, then one row per missing
    /// response.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);

        csv.write_record(["Course", self.session().course_id.as_str()])?;
        csv.write_record(["Session Name", self.session().name.as_str()])?;
        csv.write_record([""])?;
        csv.write_record(HEADER)?;

        let mut rows = 0usize;
        for responses in self.question_response_map().values() {
            for response in responses {
                csv.write_record(self.displayed_row(response))?;
                rows += 1;
            }
        }
        for response in self.missing_responses() {
            csv.write_record(self.missing_row(response))?;
            rows += 1;
        }

        tracing::debug!(rows, "wrote results csv");
        csv.flush()?;
        Ok(())
    }
}
