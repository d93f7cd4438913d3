//! Compound sentiment scoring for short social posts.
//!
//! [`SentimentScorer`] is the seam the pipeline depends on; [`LexiconScorer`] is the
//! built-in implementation, a rule-based valence model tuned for microblog text:
//!
//! - per-token valences from a lexicon (emoticons included)
//! - boosters/dampeners ("very", "slightly") up to three tokens back
//! - negation ("not", "never", any `n't`) within the three preceding tokens
//! - ALL-CAPS emphasis when the text mixes cases
//! - contrastive "but": earlier clauses count half, later ones one and a half
//! - `!` and `?` amplification
//!
//! The summed valence is squashed into `[-1.0, 1.0]`.
//!
//! Building a scorer indexes the lexicon, so construct one per batch and share it:
//!
//! ```
//! use tweetie_sentiment::{LexiconScorer, SentimentScorer};
//!
//! let scorer = LexiconScorer::new();
//! assert!(scorer.score("what a great day!") > 0.0);
//! assert!(scorer.score("this is not good") < 0.0);
//! assert_eq!(scorer.score(""), 0.0);
//! ```
use std::collections::{HashMap, HashSet};

mod lexicon;

use lexicon::{BOOSTERS, NEGATIONS, VALENCES};

/// Added to a valence when the word is shouted in mixed-case text.
const C_INCR: f64 = 0.733;
/// Multiplier applied to a negated valence.
const N_SCALAR: f64 = -0.74;
/// Normalization constant approximating the max expected raw sum.
const ALPHA: f64 = 15.0;
const EXCLAMATION_STEP: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const QUESTION_STEP: f64 = 0.18;
const QUESTION_CAP: f64 = 0.96;

/// Produces a compound polarity score in `[-1.0, 1.0]` for a piece of text.
///
/// Implementations must be pure per call so a single instance can be shared
/// across every item of a fetch, and across tasks.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

#[derive(Debug)]
struct Token {
    norm: String,
    shouted: bool,
}

/// Lexicon and rule based scorer.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    valences: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        let scorer = Self {
            valences: VALENCES.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        };
        tracing::debug!(
            valences = scorer.valences.len(),
            boosters = scorer.boosters.len(),
            "sentiment.lexicon.loaded"
        );
        scorer
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_whitespace()
            .filter_map(|raw| {
                let lower = raw.to_lowercase();
                let norm = if self.valences.contains_key(lower.as_str()) {
                    lower
                } else {
                    lower
                        .trim_matches(|c: char| !c.is_alphanumeric())
                        .to_string()
                };
                if norm.is_empty() {
                    return None;
                }
                let letters: Vec<char> = raw.chars().filter(|c| c.is_alphabetic()).collect();
                let shouted = letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase());
                Some(Token { norm, shouted })
            })
            .collect()
    }

    fn is_negation(&self, token: &Token) -> bool {
        if token.norm.contains("n't") {
            return true;
        }
        let bare: String = token.norm.chars().filter(|c| *c != '\'').collect();
        self.negations.contains(bare.as_str())
    }

    fn token_valence(&self, tokens: &[Token], i: usize, cap_diff: bool) -> f64 {
        let tok = &tokens[i];
        if self.boosters.contains_key(tok.norm.as_str()) {
            return 0.0;
        }
        // "kind of" is a dampener, not kindness.
        if tok.norm == "kind" && tokens.get(i + 1).is_some_and(|next| next.norm == "of") {
            return 0.0;
        }
        let Some(&base) = self.valences.get(tok.norm.as_str()) else {
            return 0.0;
        };

        let mut valence = base;
        if cap_diff && tok.shouted {
            valence += C_INCR.copysign(valence);
        }

        let mut negated = false;
        for dist in 1..=3usize {
            if i < dist {
                break;
            }
            let prev = &tokens[i - dist];
            if let Some(&boost) = self.boosters.get(prev.norm.as_str()) {
                let mut scalar = if valence < 0.0 { -boost } else { boost };
                if cap_diff && prev.shouted {
                    scalar += C_INCR.copysign(valence);
                }
                scalar *= match dist {
                    1 => 1.0,
                    2 => 0.95,
                    _ => 0.9,
                };
                valence += scalar;
            }
            negated |= self.is_negation(prev);
        }
        if negated {
            valence *= N_SCALAR;
        }
        valence
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let tokens = self.tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let shouted = tokens.iter().filter(|t| t.shouted).count();
        let cap_diff = shouted > 0 && shouted < tokens.len();

        let mut valences: Vec<f64> = (0..tokens.len())
            .map(|i| self.token_valence(&tokens, i, cap_diff))
            .collect();

        if let Some(pivot) = tokens.iter().position(|t| t.norm == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *v *= 0.5;
                } else if i > pivot {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            sum += punctuation_emphasis(text).copysign(sum);
        }
        normalize(sum)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    let questions = text.matches('?').count();
    let question_amp = match questions {
        0 | 1 => 0.0,
        2..=3 => questions as f64 * QUESTION_STEP,
        _ => QUESTION_CAP,
    };
    exclamations as f64 * EXCLAMATION_STEP + question_amp
}

fn normalize(sum: f64) -> f64 {
    let score = sum / (sum * sum + ALPHA).sqrt();
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else if sum.is_sign_negative() {
        -1.0
    } else {
        1.0
    }
}
