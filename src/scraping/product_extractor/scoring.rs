//! Weight table for DOM price candidates.
//!
//! Each rule is a predicate over [`CandidateSignals`] plus the points it adds
//! when it holds. A candidate's score is the sum over all matching rules.

/// Everything the scoring rules look at, gathered once per candidate element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSignals {
    /// `itemprop` attribute.
    pub microdata: bool,
    /// `data-price` attribute.
    pub price_attribute: bool,
    /// "price" in class, id or `data-testid`.
    pub price_marker: bool,
    pub currency_signal: bool,
    /// Character count of the collapsed source text.
    pub text_len: usize,
    /// sale / now / current wording.
    pub sale_language: bool,
    /// was / mrp / list wording.
    pub reference_language: bool,
    /// Inside an `h1`/`h2` (or `.h1`/`.h2`) block.
    pub heading_context: bool,
    /// old / original / was / compare / regular class or id token on the
    /// element or an ancestor.
    pub reference_marker: bool,
    /// Inside `s`/`del`/`strike`/`.strike` or an inline `line-through`.
    pub struck_through: bool,
}

pub struct ScoringRule {
    pub name: &'static str,
    pub weight: i32,
    pub applies: fn(&CandidateSignals) -> bool,
}

pub const SHORT_TEXT_MAX_CHARS: usize = 30;

pub const SCORING_RULES: &[ScoringRule] = &[
    ScoringRule {
        name: "microdata",
        weight: 6,
        applies: |s| s.microdata,
    },
    ScoringRule {
        name: "price_attribute",
        weight: 5,
        applies: |s| s.price_attribute,
    },
    ScoringRule {
        name: "price_marker",
        weight: 3,
        applies: |s| s.price_marker,
    },
    ScoringRule {
        name: "currency_signal",
        weight: 3,
        applies: |s| s.currency_signal,
    },
    ScoringRule {
        name: "short_text",
        weight: 1,
        applies: |s| s.text_len < SHORT_TEXT_MAX_CHARS,
    },
    ScoringRule {
        name: "sale_language",
        weight: 2,
        applies: |s| s.sale_language,
    },
    ScoringRule {
        name: "heading_context",
        weight: 2,
        applies: |s| s.heading_context,
    },
    ScoringRule {
        name: "reference_language",
        weight: -2,
        applies: |s| s.reference_language,
    },
    ScoringRule {
        name: "reference_marker",
        weight: -5,
        applies: |s| s.reference_marker,
    },
    ScoringRule {
        name: "struck_through",
        weight: -10,
        applies: |s| s.struck_through,
    },
];

pub fn score(signals: &CandidateSignals) -> i32 {
    score_with(SCORING_RULES, signals)
}

pub fn score_with(rules: &[ScoringRule], signals: &CandidateSignals) -> i32 {
    rules
        .iter()
        .filter(|rule| (rule.applies)(signals))
        .map(|rule| rule.weight)
        .sum()
}

const SALE_WORDS: &[&str] = &["sale", "now", "current"];
const REFERENCE_WORDS: &[&str] = &["was", "mrp", "list"];
const REFERENCE_MARKERS: &[&str] = &["old", "original", "was", "compare", "regular"];

fn lowercase_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn has_any_word(text: &str, words: &[&str]) -> bool {
    lowercase_words(text).any(|w| words.contains(&w.as_str()))
}

pub fn has_sale_language(text: &str) -> bool {
    has_any_word(text, SALE_WORDS)
}

pub fn has_reference_language(text: &str) -> bool {
    has_any_word(text, REFERENCE_WORDS)
}

/// Class/id tokens such as `price--old` or `compare-at-price`.
pub fn has_reference_marker(class_and_id: &str) -> bool {
    has_any_word(class_and_id, REFERENCE_MARKERS)
}
