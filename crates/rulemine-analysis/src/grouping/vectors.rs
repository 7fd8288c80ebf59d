//! Vector helpers shared by the feature-based grouping methods.

use rulemine_core::errors::GroupingError;
use rulemine_core::model::Rule;

pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut na = 0.0f64;
    let mut nb = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na <= f64::EPSILON || nb <= f64::EPSILON {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

/// `v` scaled to unit length; a zero vector stays zero.
pub fn unit(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm <= f64::EPSILON {
        return v.to_vec();
    }
    v.iter().map(|x| (*x as f64 / norm) as f32).collect()
}

/// Component-wise mean; `None` for an empty set.
pub fn mean<'a>(vectors: impl IntoIterator<Item = &'a [f32]>) -> Option<Vec<f32>> {
    let mut sum: Option<Vec<f64>> = None;
    let mut count = 0usize;
    for v in vectors {
        let acc = sum.get_or_insert_with(|| vec![0.0; v.len()]);
        for (a, x) in acc.iter_mut().zip(v) {
            *a += *x as f64;
        }
        count += 1;
    }
    sum.map(|s| s.into_iter().map(|a| (a / count as f64) as f32).collect())
}

/// Every rule's feature vector, checked for presence and equal length.
pub fn features_of(rules: &[Rule]) -> Result<Vec<&[f32]>, GroupingError> {
    let mut out = Vec::with_capacity(rules.len());
    let mut dims = None;
    for rule in rules {
        let v = rule
            .embedding
            .as_deref()
            .ok_or_else(|| GroupingError::MissingFeatures {
                rule_id: rule.id.clone(),
            })?;
        match dims {
            None => dims = Some(v.len()),
            Some(d) if d != v.len() => {
                return Err(GroupingError::DimensionMismatch {
                    expected: d,
                    got: v.len(),
                })
            }
            _ => {}
        }
        out.push(v);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_basics() {
        assert!((cosine(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn mean_of_vectors() {
        let a = [1.0f32, 3.0];
        let b = [3.0f32, 5.0];
        assert_eq!(mean([&a[..], &b[..]]), Some(vec![2.0, 4.0]));
        assert_eq!(mean(std::iter::empty::<&[f32]>()), None);
    }

    #[test]
    fn unit_length() {
        assert_eq!(unit(&[3.0, 4.0]), vec![0.6, 0.8]);
        assert_eq!(unit(&[0.0, 0.0]), vec![0.0, 0.0]);
    }
}
