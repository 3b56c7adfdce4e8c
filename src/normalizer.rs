//! Text normalization.
//!
//! Chat text mixes Arabic and Persian code points for the same letters,
//! carries optional vowel marks, and is full of irregular spacing. Stop words
//! only match corpus tokens after both sides went through the same
//! [`Normalizer`], so the pipeline injects a single instance everywhere.

/// Canonicalizes raw text.
///
/// Implementations must be idempotent: normalizing normalized text is a no-op.
pub trait Normalizer {
    fn normalize(&self, text: &str) -> String;
}

/// Configuration options for [`PersianNormalizer`].
#[derive(Debug, Clone, Copy)]
pub struct NormalizerConfig {
    /// Map Arabic letter and digit variants to their Persian forms.
    pub unify_characters: bool,
    /// Strip harakat and tatweel.
    pub remove_diacritics: bool,
    /// Collapse whitespace runs into a single space and trim both ends.
    pub collapse_whitespace: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            unify_characters: true,
            remove_diacritics: true,
            collapse_whitespace: true,
        }
    }
}

impl NormalizerConfig {
    /// A configuration that leaves text untouched.
    pub const fn identity() -> Self {
        Self {
            unify_characters: false,
            remove_diacritics: false,
            collapse_whitespace: false,
        }
    }
}

/// Default normalizer for Persian chats.
///
/// # Examples
///
/// ```
/// use chat_stats::normalizer::{Normalizer, PersianNormalizer};
///
/// let normalizer = PersianNormalizer::default();
/// assert_eq!(normalizer.normalize("  \u{0643}\u{064A}  x "), "\u{06A9}\u{06CC} x");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PersianNormalizer {
    config: NormalizerConfig,
}

impl PersianNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> NormalizerConfig {
        self.config
    }
}

impl Normalizer for PersianNormalizer {
    fn normalize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pending_space = false;

        for ch in text.chars() {
            if self.config.remove_diacritics && is_diacritic(ch) {
                continue;
            }
            let ch = if self.config.unify_characters {
                unify(ch)
            } else {
                ch
            };
            if self.config.collapse_whitespace {
                if ch.is_whitespace() {
                    pending_space = !out.is_empty();
                    continue;
                }
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
            }
            out.push(ch);
        }

        out
    }
}

#[inline]
const fn is_diacritic(ch: char) -> bool {
    matches!(ch, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0640}')
}

#[inline]
fn unify(ch: char) -> char {
    match ch {
        '\u{064A}' | '\u{0649}' => '\u{06CC}',
        '\u{0643}' => '\u{06A9}',
        '\u{0629}' => '\u{0647}',
        '\u{0660}'..='\u{0669}' => {
            char::from_u32(ch as u32 - 0x0660 + 0x06F0).unwrap_or(ch)
        }
        _ => ch,
    }
}
