//! Login-code extraction from message text.
//!
//! Ordered numeric patterns plus a keyword confidence signal. The heuristic
//! favors recall over precision: a bare numeric match without an
//! authorization keyword is still returned, flagged as low-confidence, and
//! the caller decides how loudly to log it.

use std::sync::LazyLock;

use regex::Regex;

/// Ordered pattern set; the first match wins. Bare 5- and 6-digit runs cover
/// the network's standard code lengths, the labeled form picks up
/// free-form lengths ("code: 1234").
static CODE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"\b(\d{5})\b").unwrap(),
        Regex::new(r"\b(\d{6})\b").unwrap(),
        Regex::new(r"(?i)(?:code|код)\D{0,10}?(\d{4,8})\b").unwrap(),
    ]
});

/// Language-agnostic authorization vocabulary, matched case-insensitively.
/// Stems are enough: "подтвержд" covers подтверждение/подтвердите.
const KEYWORDS: &[&str] = &[
    "code",
    "login",
    "verification",
    "authorization",
    "confirm",
    "код",
    "вход",
    "подтвержд",
    "авторизац",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMatch {
    pub code: String,
    /// True when the surrounding text also carries authorization vocabulary.
    pub confident: bool,
}

/// Extract a login code from one message. Pure and deterministic: the same
/// text always yields the same result.
pub fn extract_code(text: &str) -> Option<CodeMatch> {
    let lowered = text.to_lowercase();
    let confident = KEYWORDS.iter().any(|kw| lowered.contains(kw));
    for pattern in CODE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            return Some(CodeMatch {
                code: caps[1].to_owned(),
                confident,
            });
        }
    }
    None
}
