//! Document-scoped identifier allocation.

use rulemine_core::types::collections::FxHashSet;

/// Ids already emitted in one document. Created per serialization call and
/// dropped with it; two documents never share a context.
#[derive(Debug, Default)]
pub struct IdContext {
    taken: FxHashSet<String>,
}

impl IdContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `base` (slugged), or `base_2`, `base_3`, ... if it is taken.
    /// The same sequence of claims always yields the same ids.
    pub fn claim(&mut self, base: &str) -> String {
        let base = slug(base);
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

/// Reduce `text` to a valid XML NCName: ASCII alphanumerics and `_`, runs
/// of anything else folded to one `_`, never starting with a digit.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        return "id".to_string();
    }
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    }
}
