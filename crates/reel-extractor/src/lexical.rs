//! Lexical candidate matching
//!
//! First pass of title recognition: scans the raw transcript for every
//! corpus title occurring as a whole word, and rewrites multi-word
//! occurrences into a single underscore-joined token so the tagger
//! keeps them atomic.
//!
//! This pass alone produces many false positives (short or common-word
//! titles); it only narrows the candidate set for the grammar rules.

use std::collections::HashSet;

use regex::{NoExpand, Regex, RegexBuilder};
use serde::Serialize;

use reel_core::{CandidateTitle, ReelError, Result, TitleCorpus, TitleRecord};

/// Titles this short or shorter hit too many accidental substrings
pub const MAX_REJECTED_TITLE_CHARS: usize = 2;

/// Titles equal to these words would break rules using them as markers
pub const RESERVED_WORDS: &[&str] = &["film"];

/// Outcome of the lexical pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LexicalMatch {
    /// Candidates in scan order (longest title first)
    pub candidates: Vec<CandidateTitle>,

    /// Transcript with multi-word candidates joined
    pub rewritten_transcript: String,
}

impl LexicalMatch {
    /// Lowercase keys tokens are compared against by the rule engine
    pub fn candidate_keys(&self) -> HashSet<String> {
        self.candidates.iter().map(CandidateTitle::key).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Whether a title may become a candidate at all
pub fn is_eligible(record: &TitleRecord) -> bool {
    let text = record.text.trim();
    if text.chars().count() <= MAX_REJECTED_TITLE_CHARS {
        return false;
    }
    let folded = text.to_lowercase();
    !RESERVED_WORDS.contains(&folded.as_str())
}

/// Scan `transcript` for corpus titles.
///
/// `titles` must be sorted by descending character length; an unsorted
/// corpus is rejected rather than re-sorted because the order decides
/// which title wins an overlapping span.
pub fn match_titles(transcript: &str, titles: &[TitleRecord]) -> Result<LexicalMatch> {
    TitleCorpus::check_sorted(titles)?;

    let mut rewritten = transcript.to_string();
    let mut folded = rewritten.to_lowercase();
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for record in titles.iter().filter(|r| is_eligible(r)) {
        let text = record.text.trim();
        let folded_title = text.to_lowercase();

        // Cheap substring test before compiling a pattern
        if !folded.contains(&folded_title) {
            continue;
        }
        if !word_pattern(&folded_title, false)?.is_match(&folded) {
            continue;
        }

        let candidate = CandidateTitle::from_record(record);
        if !seen.insert(candidate.key()) {
            continue;
        }

        if let Some(joined) = &candidate.joined_form {
            let pattern = word_pattern(text, true)?;
            rewritten = pattern
                .replace_all(&rewritten, NoExpand(joined))
                .into_owned();
            // Later (shorter) titles must not match inside joined spans
            folded = rewritten.to_lowercase();
        }

        tracing::debug!(title = %candidate.text, id = %candidate.id, "Lexical candidate");
        candidates.push(candidate);
    }

    tracing::info!(
        candidates = candidates.len(),
        corpus = titles.len(),
        "Lexical pass complete"
    );

    Ok(LexicalMatch {
        candidates,
        rewritten_transcript: rewritten,
    })
}

/// Convenience wrapper over a loaded corpus
pub fn match_corpus(transcript: &str, corpus: &TitleCorpus) -> Result<LexicalMatch> {
    match_titles(transcript, corpus.records())
}

/// Build a whole-word pattern for a literal title.
///
/// A boundary is only asserted on a side where the title starts or ends
/// with a word character; `\b` next to punctuation would otherwise
/// demand a word character outside the title.
fn word_pattern(literal: &str, case_insensitive: bool) -> Result<Regex> {
    let starts_word = literal.chars().next().is_some_and(is_word_char);
    let ends_word = literal.chars().last().is_some_and(is_word_char);

    let pattern = format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        regex::escape(literal),
        if ends_word { r"\b" } else { "" },
    );

    RegexBuilder::new(&pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| ReelError::CorpusError(format!("invalid title pattern {literal:?}: {e}")))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
