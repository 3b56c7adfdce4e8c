use std::borrow::Cow;

use tracing::debug;

use crate::models::{EntityFragment, Fragment, MessageText};

impl Fragment {
    /// The text this fragment contributes to its message. Fragments without a
    /// string `text` contribute nothing.
    pub fn text(&self) -> &str {
        match self {
            Fragment::Literal(text) => text.as_str(),
            Fragment::Entity(EntityFragment { text: Some(text), .. }) => text.as_str(),
            Fragment::Entity(EntityFragment { kind, text: None }) => {
                debug!("Entity fragment {:?} has no text, skipping", kind);
                ""
            }
            Fragment::Opaque(value) => {
                debug!("Unrecognized fragment {}, skipping", value);
                ""
            }
        }
    }
}

impl MessageText {
    /// Flattens the text field into a single string.
    ///
    /// Plain text is borrowed as is. Composite text is the concatenation of
    /// its fragments in order.
    pub fn reconstruct(&self) -> Cow<'_, str> {
        match self {
            MessageText::Plain(text) => Cow::Borrowed(text),
            MessageText::Composite(fragments) => {
                Cow::Owned(fragments.iter().map(Fragment::text).collect())
            }
        }
    }
}

/// Free-function form of [`MessageText::reconstruct`].
pub fn reconstruct(text: &MessageText) -> Cow<'_, str> {
    text.reconstruct()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(kind: &str, text: Option<&str>) -> Fragment {
        Fragment::Entity(EntityFragment {
            kind: Some(kind.to_string()),
            text: text.map(str::to_string),
        })
    }

    #[test]
    fn test_reconstruct_plain_is_borrowed() {
        let text = MessageText::from("Is this ok?");
        let flat = reconstruct(&text);
        assert!(matches!(flat, Cow::Borrowed("Is this ok?")));
    }

    #[test]
    fn test_reconstruct_composite() {
        let text = MessageText::Composite(vec![
            Fragment::Literal("ask ".to_string()),
            entity("mention", Some("@bob")),
            Fragment::Literal(" about ".to_string()),
            entity("link", Some("example.com")),
            Fragment::Literal("?".to_string()),
        ]);
        assert_eq!(reconstruct(&text), "ask @bob about example.com?");
    }

    #[test]
    fn test_reconstruct_skips_fragments_without_text() {
        let text = MessageText::Composite(vec![
            Fragment::Literal("a".to_string()),
            entity("bold", None),
            Fragment::Opaque(serde_json::json!({"type": "custom_emoji", "document_id": 5})),
            Fragment::Opaque(serde_json::Value::Null),
            Fragment::Literal("b".to_string()),
        ]);
        assert_eq!(reconstruct(&text), "ab");
    }

    #[test]
    fn test_reconstruct_empty_composite() {
        assert_eq!(reconstruct(&MessageText::Composite(Vec::new())), "");
    }

    #[test]
    fn test_reconstruct_idempotent() {
        let composite = MessageText::Composite(vec![
            Fragment::Literal("x ".to_string()),
            entity("italic", Some("y")),
        ]);
        for text in [MessageText::from("plain"), composite] {
            let once = reconstruct(&text).into_owned();
            let again = MessageText::Plain(once.clone());
            assert_eq!(reconstruct(&again), once);
        }
    }
}
