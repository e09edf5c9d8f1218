use hmac::{Hmac, Mac};
use indexmap::IndexMap;
use sha2::Sha256;

use crate::{
    config::EngineConfig,
    error::BundleError,
    feedback::{ParticipantType, Question},
    results::{
        DisplayResponse,
        names::{NameTables, TEAM_OF_OWNER_SUFFIX},
        visibility::{Side, VisibilityTable, is_visible},
    },
};

type HmacSha256 = Hmac<Sha256>;

/// Mints pseudonyms for hidden participants.
///
/// A pseudonym is `<label> <type> <hash>` where the hash is taken over a
/// keyed transform of the real name, so equal names always get the same
/// pseudonym under the same key while the plain hash of the name is never
/// exposed.
#[derive(Clone)]
pub struct Anonymizer {
    mac: HmacSha256,
    label: String,
}

impl Anonymizer {
    pub fn new(config: &EngineConfig) -> Result<Self, BundleError> {
        let mac =
            HmacSha256::new_from_slice(config.anonymization_key.as_bytes())
                .map_err(|e| BundleError::Anonymizer(e.to_string()))?;

        Ok(Self {
            mac,
            label: config.anonymous_label.clone(),
        })
    }

    pub fn pseudonym(
        &self,
        participant_type: ParticipantType,
        real_name: &str,
    ) -> String {
        format!(
            "{} {} {}",
            self.label,
            participant_type.singular(),
            self.hash_of(real_name)
        )
    }

    /// The key a pseudonym is filed under in the lookup tables. It is never
    /// shown or used as an address.
    pub fn synthetic_key(pseudonym: &str) -> String {
        format!("{pseudonym}@{pseudonym}.com")
    }

    fn hash_of(&self, name: &str) -> i64 {
        let mut mac = self.mac.clone();
        mac.update(name.as_bytes());
        let transformed = hex::encode(mac.finalize().into_bytes());

        i64::from(string_hash(&transformed)).abs()
    }
}

impl std::fmt::Debug for Anonymizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anonymizer")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// 32-bit polynomial string hash (`h = 31 * h + c` over UTF-16 units).
fn string_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(i32::from(unit))
    })
}

/// Replaces every giver/recipient the viewer may not see with a pseudonym
/// key, registering the pseudonym in `names`. Runs in list order, recipient
/// before giver.
pub(crate) fn hide_identities(
    responses: &mut [DisplayResponse],
    questions: &IndexMap<String, Question>,
    visibility: &VisibilityTable,
    names: &mut NameTables,
    anonymizer: &Anonymizer,
) {
    for response in responses.iter_mut() {
        let question = questions.get(&response.actual.question_id);

        if !is_visible(Side::Recipient, &*response, question, visibility) {
            let participant_type = question
                .map(Question::effective_recipient_type)
                .unwrap_or(ParticipantType::None);
            let key = anonymize_into(
                names,
                anonymizer,
                participant_type,
                &response.recipient,
                false,
            );
            response.recipient = key;
        }

        if !is_visible(Side::Giver, &*response, question, visibility) {
            let participant_type = question
                .map(|question| question.giver_type)
                .unwrap_or(ParticipantType::None);
            let key = anonymize_into(
                names,
                anonymizer,
                participant_type,
                &response.giver,
                true,
            );
            response.giver = key;
        }
    }
}

fn anonymize_into(
    names: &mut NameTables,
    anonymizer: &Anonymizer,
    participant_type: ParticipantType,
    identifier: &str,
    is_giver: bool,
) -> String {
    let pseudonym = {
        let real_name = names.real_name(identifier).unwrap_or(identifier);
        anonymizer.pseudonym(participant_type, real_name)
    };
    let key = Anonymizer::synthetic_key(&pseudonym);

    let team = if is_giver && participant_type == ParticipantType::Teams {
        pseudonym.clone()
    } else {
        format!("{pseudonym}{TEAM_OF_OWNER_SUFFIX}")
    };

    tracing::trace!(%pseudonym, is_giver, "hiding participant");
    names.register_pseudonym(&key, &pseudonym, team);

    key
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn anonymizer(key: &str) -> Anonymizer {
        Anonymizer::new(&EngineConfig::with_key(key)).unwrap()
    }

    #[test]
    fn string_hash_matches_reference_values() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("ab"), 97 * 31 + 98);
        // Overflows and wraps.
        assert_eq!(string_hash("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn pseudonym_shape() {
        let pseudonym =
            anonymizer("k").pseudonym(ParticipantType::Students, "Alice");
        let (prefix, digits) =
            pseudonym.rsplit_once(' ').expect("has a hash part");
        assert_eq!(prefix, "Anonymous student");
        assert!(digits.chars().all(|c| c.is_ascii_digit()));

        let team = anonymizer("k").pseudonym(ParticipantType::OwnTeam, "T1");
        assert!(team.starts_with("Anonymous team "));
    }

    #[test]
    fn custom_label() {
        let mut config = EngineConfig::with_key("k");
        config.anonymous_label = "Hidden".into();
        let anonymizer = Anonymizer::new(&config).unwrap();
        assert!(
            anonymizer
                .pseudonym(ParticipantType::Instructors, "Ivy")
                .starts_with("Hidden instructor ")
        );
    }

    #[test]
    fn key_changes_pseudonym() {
        assert_ne!(
            anonymizer("one").pseudonym(ParticipantType::Students, "Alice"),
            anonymizer("two").pseudonym(ParticipantType::Students, "Alice")
        );
    }

    #[test]
    fn synthetic_key_wraps_pseudonym() {
        assert_eq!(
            Anonymizer::synthetic_key("Anonymous student 42"),
            "Anonymous student 42@Anonymous student 42.com"
        );
    }

    proptest! {
        #[test]
        fn pseudonyms_are_deterministic(name in ".*", key in "[a-z0-9]{1,32}") {
            let first = anonymizer(&key);
            let second = anonymizer(&key);
            prop_assert_eq!(
                first.pseudonym(ParticipantType::Students, &name),
                first.pseudonym(ParticipantType::Students, &name)
            );
            prop_assert_eq!(
                first.pseudonym(ParticipantType::Teams, &name),
                second.pseudonym(ParticipantType::Teams, &name)
            );
        }
    }
}
