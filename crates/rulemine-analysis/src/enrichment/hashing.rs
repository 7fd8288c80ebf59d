//! Deterministic offline feature provider.
//!
//! Uses signed feature hashing over two kinds of terms. Structural terms
//! (`type:`, `table:`, `column:` prefixed words from [`feature_text`]) carry
//! most of the weight, so rules over the same tables land close together.
//! Expression terms (identifiers, comparison operators, literals) separate
//! rules within a table. Term frequency is sublinear and the result is
//! L2-normalized.
//!
//! [`feature_text`]: super::enricher::feature_text

use rulemine_core::errors::EnrichmentError;
use rulemine_core::types::collections::BTreeMap;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use super::provider::FeatureProvider;

/// Prefixes marking structural terms in feature text.
pub const STRUCTURAL_PREFIXES: &[&str] = &["type:", "table:", "column:"];

const STRUCTURAL_WEIGHT: f32 = 2.0;
const IDENTIFIER_WEIGHT: f32 = 1.0;
/// Operators and literals shape a predicate but say little about its topic.
const SHAPE_WEIGHT: f32 = 0.4;

/// Separate hash spaces for bucket choice and sign.
const BUCKET_SEED: u64 = 0x7275_6c65;
const SIGN_SEED: u64 = 0x7369_676e;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TermKind {
    Structural,
    Identifier,
    Shape,
}

impl TermKind {
    fn weight(self) -> f32 {
        match self {
            TermKind::Structural => STRUCTURAL_WEIGHT,
            TermKind::Identifier => IDENTIFIER_WEIGHT,
            TermKind::Shape => SHAPE_WEIGHT,
        }
    }
}

pub struct HashingProvider {
    dimensions: usize,
}

impl HashingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Bucket index and sign for `term`. The sign halves the bias that
    /// colliding terms would otherwise add to one bucket.
    fn slot(&self, term: &str) -> (usize, f32) {
        let bucket = (xxh3_64_with_seed(term.as_bytes(), BUCKET_SEED) % self.dimensions as u64) as usize;
        let sign = if xxh3_64_with_seed(term.as_bytes(), SIGN_SEED) & 1 == 0 {
            1.0
        } else {
            -1.0
        };
        (bucket, sign)
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        // BTreeMap keeps accumulation order, and so the float sums, stable.
        let mut counts: BTreeMap<(String, TermKind), f32> = BTreeMap::new();
        for term in terms(text) {
            *counts.entry(term).or_default() += 1.0;
        }
        for ((term, kind), count) in &counts {
            let (bucket, sign) = self.slot(term);
            vec[bucket] += sign * kind.weight() * (1.0 + count.ln());
        }
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

/// Split feature text into weighted terms. Structural words are kept
/// whole; everything else is cut into identifier runs and operator runs.
fn terms(text: &str) -> Vec<(String, TermKind)> {
    let mut out = Vec::new();
    for word in text.split_whitespace() {
        let lower = word.to_lowercase();
        if STRUCTURAL_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            out.push((lower, TermKind::Structural));
            continue;
        }
        let mut chars = lower.char_indices().peekable();
        while let Some((start, c)) = chars.next() {
            let class: fn(char) -> bool = if is_word_char(c) {
                is_word_char
            } else if is_op_char(c) {
                is_op_char
            } else {
                continue;
            };
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !class(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            let token = &lower[start..end];
            let kind = if token.chars().all(|c| c.is_ascii_digit()) || is_op_char(c) {
                TermKind::Shape
            } else if token.chars().count() < 2 {
                continue;
            } else {
                TermKind::Identifier
            };
            out.push((token.to_string(), kind));
        }
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_op_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!')
}

impl FeatureProvider for HashingProvider {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn features(&self, text: &str) -> Result<Vec<f32>, EnrichmentError> {
        Ok(self.vector(text))
    }

    fn is_available(&self) -> bool {
        true
    }
}
