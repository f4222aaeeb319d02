//! Grammar rule engine
//!
//! Second pass of title recognition: confirms lexical candidates that sit
//! in a context meaning "this is a film title". A rule is a sequence of
//! token constraints (part of speech, lemma, text, candidate membership,
//! negated part of speech), some of them optional, plus the slot whose
//! token is reported as the title mention.
//!
//! Rules are plain values evaluated against a fresh token scan each time;
//! nothing is registered on a shared matcher, so a `RuleSet` can be used
//! from any number of threads at once.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use reel_core::{unjoin_title, AnnotatedToken, EntityKind, MatchResult, PosTag};

// ============================================================================
// Constraints
// ============================================================================

/// Test applied to a single token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPredicate {
    /// Part-of-speech tag equals
    PosEquals(PosTag),
    /// Lemma equals
    LemmaEquals(String),
    /// Raw surface text equals
    TextEquals(String),
    /// Lowercased text equals
    NormalizedEquals(String),
    /// Lowercased text is one of the lexical candidates
    NormalizedInCandidates,
    /// Entity label equals
    EntityIs(EntityKind),
    /// Part-of-speech tag differs; the token is still consumed
    NegatePos(PosTag),
}

impl TokenPredicate {
    /// Test a token against this predicate
    pub fn test(&self, token: &AnnotatedToken, candidates: &HashSet<String>) -> bool {
        match self {
            Self::PosEquals(pos) => token.pos == *pos,
            Self::LemmaEquals(lemma) => token.lemma == *lemma,
            Self::TextEquals(text) => token.surface == *text,
            Self::NormalizedEquals(text) => token.normalized == *text,
            Self::NormalizedInCandidates => candidates.contains(&token.normalized),
            Self::EntityIs(entity) => token.entity == *entity,
            Self::NegatePos(pos) => token.pos != *pos,
        }
    }
}

/// A predicate aligned with one token of a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConstraint {
    pub predicate: TokenPredicate,
    /// May be absent from the window
    #[serde(default)]
    pub optional: bool,
}

impl TokenConstraint {
    pub fn required(predicate: TokenPredicate) -> Self {
        Self {
            predicate,
            optional: false,
        }
    }

    pub fn optional(predicate: TokenPredicate) -> Self {
        Self {
            predicate,
            optional: true,
        }
    }

    pub fn pos(pos: PosTag) -> Self {
        Self::required(TokenPredicate::PosEquals(pos))
    }

    pub fn lemma(lemma: &str) -> Self {
        Self::required(TokenPredicate::LemmaEquals(lemma.to_string()))
    }

    pub fn text(text: &str) -> Self {
        Self::required(TokenPredicate::TextEquals(text.to_string()))
    }

    pub fn lower(text: &str) -> Self {
        Self::required(TokenPredicate::NormalizedEquals(text.to_lowercase()))
    }

    pub fn candidate() -> Self {
        Self::required(TokenPredicate::NormalizedInCandidates)
    }

    pub fn not_pos(pos: PosTag) -> Self {
        Self::required(TokenPredicate::NegatePos(pos))
    }

    /// Mark this constraint optional
    pub fn maybe(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Which constraint's token is the extracted title mention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractSlot {
    /// 0-based index from the first constraint
    FromStart(usize),
    /// 0-based index back from the last constraint
    FromEnd(usize),
}

impl ExtractSlot {
    fn resolve(self, len: usize) -> Option<usize> {
        match self {
            Self::FromStart(index) if index < len => Some(index),
            Self::FromEnd(back) if back < len => Some(len - 1 - back),
            _ => None,
        }
    }
}

impl From<usize> for ExtractSlot {
    fn from(index: usize) -> Self {
        Self::FromStart(index)
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Rule registration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Rule {rule} has no constraints")]
    Empty { rule: String },

    #[error("Rule {rule}: extraction slot {slot:?} outside {len} constraints")]
    SlotOutOfRange {
        rule: String,
        slot: ExtractSlot,
        len: usize,
    },

    #[error("Rule {rule}: extraction slot {index} points at an optional constraint")]
    SlotOnOptional { rule: String, index: usize },

    #[error("Rule {rule}: {count} optional constraints precede the extraction slot")]
    AmbiguousSlot { rule: String, count: usize },

    #[error("Rule {rule}: {count} optional constraints, at most {max} allowed")]
    TooManyOptional {
        rule: String,
        count: usize,
        max: usize,
    },
}

/// Most optional constraints a rule may carry; each one doubles the
/// window shapes tried at every start position
pub const MAX_OPTIONAL_CONSTRAINTS: usize = 2;

/// A validated grammar rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule {
    id: String,
    constraints: Vec<TokenConstraint>,
    slot: usize,
    /// Constraint indices present in each window shape, most tokens first
    variants: Vec<Vec<usize>>,
}

impl MatchRule {
    /// Validate and build a rule.
    ///
    /// A rule carries at most [`MAX_OPTIONAL_CONSTRAINTS`] optional
    /// constraints, and at most one may precede the extraction slot:
    /// with more, the slot's position inside a window would depend on
    /// several independent skips. Optional constraints after the slot
    /// never move it.
    pub fn new(
        id: impl Into<String>,
        constraints: Vec<TokenConstraint>,
        slot: impl Into<ExtractSlot>,
    ) -> Result<Self, RuleError> {
        let id = id.into();
        let slot = slot.into();

        if constraints.is_empty() {
            return Err(RuleError::Empty { rule: id });
        }

        let optional = constraints.iter().filter(|c| c.optional).count();
        if optional > MAX_OPTIONAL_CONSTRAINTS {
            return Err(RuleError::TooManyOptional {
                rule: id,
                count: optional,
                max: MAX_OPTIONAL_CONSTRAINTS,
            });
        }

        let index = slot
            .resolve(constraints.len())
            .ok_or_else(|| RuleError::SlotOutOfRange {
                rule: id.clone(),
                slot,
                len: constraints.len(),
            })?;

        if constraints[index].optional {
            return Err(RuleError::SlotOnOptional { rule: id, index });
        }

        let optional_before = constraints[..index].iter().filter(|c| c.optional).count();
        if optional_before > 1 {
            return Err(RuleError::AmbiguousSlot {
                rule: id,
                count: optional_before,
            });
        }

        let variants = window_variants(&constraints);

        Ok(Self {
            id,
            constraints,
            slot: index,
            variants,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn constraints(&self) -> &[TokenConstraint] {
        &self.constraints
    }

    /// Resolved constraint index of the extraction slot
    pub fn extract_slot(&self) -> usize {
        self.slot
    }

    /// Scan every start position; for each, the first window shape that
    /// matches wins (optional tokens present before absent). Windows from
    /// different start positions may overlap and are all reported.
    pub fn scan(&self, tokens: &[AnnotatedToken], candidates: &HashSet<String>) -> Vec<MatchResult> {
        let mut results = Vec::new();

        for start in 0..tokens.len() {
            for variant in &self.variants {
                let end = start + variant.len();
                if end > tokens.len() {
                    continue;
                }

                let window = &tokens[start..end];
                let matched = variant
                    .iter()
                    .zip(window)
                    .all(|(&ci, token)| self.constraints[ci].predicate.test(token, candidates));
                if !matched {
                    continue;
                }

                // The slot is never optional, so it is present in every variant
                let Some(offset) = variant.iter().position(|&ci| ci == self.slot) else {
                    continue;
                };

                results.push(MatchResult {
                    rule_id: self.id.clone(),
                    start,
                    end,
                    extracted_text: unjoin_title(&window[offset].surface),
                    matched_text: unjoin_title(&span_text(window)),
                });
                break;
            }
        }

        results
    }
}

/// Enumerate window shapes: every subset of skipped optional constraints,
/// fewest skips first, earlier optionals skipped first on ties
fn window_variants(constraints: &[TokenConstraint]) -> Vec<Vec<usize>> {
    let optional: Vec<usize> = constraints
        .iter()
        .enumerate()
        .filter(|(_, c)| c.optional)
        .map(|(i, _)| i)
        .collect();

    let mut masks: Vec<u32> = (0..1u32 << optional.len()).collect();
    masks.sort_by_key(|mask| (mask.count_ones(), *mask));

    masks
        .into_iter()
        .map(|mask| {
            let skipped: HashSet<usize> = optional
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, &ci)| ci)
                .collect();
            (0..constraints.len())
                .filter(|ci| !skipped.contains(ci))
                .collect::<Vec<usize>>()
        })
        .collect()
}

fn span_text(window: &[AnnotatedToken]) -> String {
    window
        .iter()
        .map(|t| t.surface.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Rule Set
// ============================================================================

/// Ordered collection of validated rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<MatchRule>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a rule. A rejected rule is logged and left out;
    /// rules already registered are unaffected.
    pub fn register(
        &mut self,
        id: &str,
        constraints: Vec<TokenConstraint>,
        slot: impl Into<ExtractSlot>,
    ) -> Result<(), RuleError> {
        match MatchRule::new(id, constraints, slot) {
            Ok(rule) => {
                self.rules.push(rule);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(rule = id, error = %e, "Rejected grammar rule");
                Err(e)
            }
        }
    }

    /// Append an already validated rule
    pub fn push(&mut self, rule: MatchRule) {
        self.rules.push(rule);
    }

    /// The five French discourse patterns introducing a film title
    pub fn film_rules() -> Self {
        use TokenConstraint as C;

        let builtin: [(&str, Vec<TokenConstraint>, usize); 5] = [
            // film vous ne désirez que moi Claire Simon
            (
                "MR1",
                vec![C::lower("film"), C::candidate(), C::pos(PosTag::Propn)],
                1,
            ),
            // le film les jeunes amants de carine tardieu
            (
                "MR2",
                vec![
                    C::pos(PosTag::Det),
                    C::lower("film"),
                    C::candidate(),
                    C::text("de"),
                ],
                2,
            ),
            // réjouissant les voisins de mes voisins sont mes voisins (un) drôle (de) film
            (
                "MR3",
                vec![
                    C::pos(PosTag::Adj),
                    C::candidate(),
                    C::pos(PosTag::Det).maybe(),
                    C::pos(PosTag::Noun),
                    C::pos(PosTag::Adp).maybe(),
                    C::lower("film"),
                ],
                1,
            ),
            // voir cette petite solange
            (
                "MR4",
                vec![
                    C::lemma("voir"),
                    C::pos(PosTag::Det),
                    C::candidate(),
                    C::not_pos(PosTag::Verb),
                ],
                2,
            ),
            // voir teresa la voleuse
            (
                "MR5",
                vec![C::lemma("voir"), C::candidate(), C::not_pos(PosTag::Verb)],
                1,
            ),
        ];

        let mut set = Self::new();
        for (id, constraints, slot) in builtin {
            let registered = set.register(id, constraints, slot);
            debug_assert!(registered.is_ok(), "built-in rule {id} rejected: {registered:?}");
        }

        set
    }

    /// Copy of this set without the named rule
    pub fn without(&self, id: &str) -> Self {
        Self {
            rules: self.rules.iter().filter(|r| r.id != id).cloned().collect(),
        }
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(MatchRule::id).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Run every rule in declaration order and concatenate their matches.
///
/// `candidates` holds lowercase candidate keys; with no candidates no
/// rule can confirm anything and the scan is skipped.
pub fn extract(
    tokens: &[AnnotatedToken],
    candidates: &HashSet<String>,
    rules: &RuleSet,
) -> Vec<MatchResult> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut results = Vec::new();
    for rule in rules.rules() {
        let matches = rule.scan(tokens, candidates);

        tracing::debug!(
            rule = rule.id(),
            selected = ?matches.iter().map(|m| m.extracted_text.as_str()).collect::<Vec<_>>(),
            matched = ?matches.iter().map(|m| m.matched_text.as_str()).collect::<Vec<_>>(),
            "Rule scan"
        );

        results.extend(matches);
    }

    results
}
