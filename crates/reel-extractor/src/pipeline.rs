//! End-to-end title recognition
//!
//! raw transcript + corpus → lexical pass → tagging (external)
//! → grammar rules → aggregation → titles

use std::collections::HashSet;

use serde::Serialize;

use reel_core::{AnnotatedToken, CandidateTitle, MatchResult, Result, TitleRecord};

use crate::aggregate::aggregate;
use crate::lexical::{match_titles, LexicalMatch};
use crate::rules::{extract, RuleSet};
use crate::Tagger;

/// Everything one recognition run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct Recognition {
    /// Transcript with multi-word candidates joined
    pub rewritten_transcript: String,

    /// Lexical candidates, longest title first
    pub candidates: Vec<CandidateTitle>,

    /// Rule matches in rule declaration order
    pub matches: Vec<MatchResult>,

    /// Distinct recognized titles
    pub titles: Vec<String>,
}

/// Title recognizer over a fixed rule set.
///
/// Holds no per-run state: concurrent calls on different transcripts
/// need no synchronization.
#[derive(Debug, Clone)]
pub struct TitleRecognizer {
    rules: RuleSet,
}

impl TitleRecognizer {
    /// Create a recognizer with the built-in film rules
    pub fn new() -> Self {
        Self {
            rules: RuleSet::film_rules(),
        }
    }

    /// Create with a custom rule set
    pub fn with_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Run the whole pipeline, tagging the rewritten transcript with `tagger`
    pub fn recognize(
        &self,
        transcript: &str,
        titles: &[TitleRecord],
        tagger: &dyn Tagger,
    ) -> Result<Recognition> {
        let lexical = match_titles(transcript, titles)?;

        // Nothing to confirm: skip the tagger entirely
        if lexical.is_empty() {
            return Ok(Recognition {
                rewritten_transcript: lexical.rewritten_transcript,
                ..Default::default()
            });
        }

        let tokens = tagger.tag(&lexical.rewritten_transcript)?;
        Ok(self.finish(lexical, &tokens))
    }

    /// Second half of the pipeline for tokens tagged offline from
    /// `lexical.rewritten_transcript`
    pub fn recognize_tagged(&self, lexical: LexicalMatch, tokens: &[AnnotatedToken]) -> Recognition {
        self.finish(lexical, tokens)
    }

    /// Rule engine and aggregation over an explicit candidate key set
    pub fn extract_from_tokens(
        &self,
        tokens: &[AnnotatedToken],
        candidates: &HashSet<String>,
    ) -> (Vec<MatchResult>, Vec<String>) {
        let matches = extract(tokens, candidates, &self.rules);
        let titles = aggregate(&matches);
        (matches, titles)
    }

    fn finish(&self, lexical: LexicalMatch, tokens: &[AnnotatedToken]) -> Recognition {
        let (matches, titles) = self.extract_from_tokens(tokens, &lexical.candidate_keys());

        tracing::info!(
            candidates = lexical.candidates.len(),
            matches = matches.len(),
            titles = titles.len(),
            "Title recognition complete"
        );

        Recognition {
            rewritten_transcript: lexical.rewritten_transcript,
            candidates: lexical.candidates,
            matches,
            titles,
        }
    }
}

impl Default for TitleRecognizer {
    fn default() -> Self {
        Self::new()
    }
}
