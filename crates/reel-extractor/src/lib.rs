//! Reel Extractor - Film title recognition pipeline
//!
//! Finds which substrings of a French speech transcript name a film:
//! a lexical pass proposes corpus titles present in the text, grammar
//! rules confirm those appearing in a film-introducing context, and the
//! aggregator returns the distinct titles in rule order.

use reel_core::{AnnotatedToken, Result};

/// Trait for the external tokenizer / tagger / lemmatizer
pub trait Tagger: Send + Sync {
    fn tag(&self, text: &str) -> Result<Vec<AnnotatedToken>>;
}

impl<F> Tagger for F
where
    F: Fn(&str) -> Result<Vec<AnnotatedToken>> + Send + Sync,
{
    fn tag(&self, text: &str) -> Result<Vec<AnnotatedToken>> {
        self(text)
    }
}

/// Replays tokens tagged offline, ignoring the text it is given
#[derive(Debug, Clone, Default)]
pub struct PretaggedTagger {
    tokens: Vec<AnnotatedToken>,
}

impl PretaggedTagger {
    pub fn new(tokens: Vec<AnnotatedToken>) -> Self {
        Self { tokens }
    }

    /// Load tokens from CoNLL-U text
    pub fn from_conllu(input: &str) -> Result<Self> {
        Ok(Self::new(conllu::parse_conllu(input)?))
    }
}

impl Tagger for PretaggedTagger {
    fn tag(&self, _text: &str) -> Result<Vec<AnnotatedToken>> {
        Ok(self.tokens.clone())
    }
}

pub mod aggregate;
pub mod conllu;
pub mod lexical;
pub mod metrics;
pub mod pipeline;
pub mod rules;

pub use aggregate::aggregate;
pub use lexical::{match_corpus, match_titles, LexicalMatch};
pub use pipeline::{Recognition, TitleRecognizer};
pub use rules::{extract, ExtractSlot, MatchRule, RuleError, RuleSet, TokenConstraint, TokenPredicate};
