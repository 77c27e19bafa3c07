//! Per-row missing-value flags.

use serde::{Deserialize, Serialize};

/// Missing-value mask for one column: `true` marks a missing row.
///
/// The mask is always as long as the column it belongs to. Values stored at
/// masked positions are placeholders and must not be read as data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mask {
    missing: Vec<bool>,
}

impl Mask {
    /// A mask of `len` rows with nothing missing.
    #[must_use]
    pub fn all_valid(len: usize) -> Self {
        Self {
            missing: vec![false; len],
        }
    }

    /// A mask of `len` rows with every row missing.
    #[must_use]
    pub fn all_missing(len: usize) -> Self {
        Self {
            missing: vec![true; len],
        }
    }

    /// Builds a mask from missing flags (`true` = missing).
    pub fn from_missing(flags: impl IntoIterator<Item = bool>) -> Self {
        Self {
            missing: flags.into_iter().collect(),
        }
    }

    /// Builds a mask from validity flags (`true` = present).
    pub fn from_validity(flags: impl IntoIterator<Item = bool>) -> Self {
        Self::from_missing(flags.into_iter().map(|valid| !valid))
    }

    pub fn len(&self) -> usize {
        self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    /// Whether row `row` is missing. Out-of-range rows report `false`.
    pub fn is_missing(&self, row: usize) -> bool {
        self.missing.get(row).copied().unwrap_or(false)
    }

    /// Number of missing rows.
    pub fn missing_count(&self) -> usize {
        self.missing.iter().filter(|&&flag| flag).count()
    }

    /// True when no row is missing.
    pub fn is_all_valid(&self) -> bool {
        !self.missing.contains(&true)
    }

    /// Row indices of missing entries.
    pub fn missing_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.missing
            .iter()
            .enumerate()
            .filter_map(|(row, &flag)| flag.then_some(row))
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_valid() {
        let mask = Mask::all_valid(3);
        assert_eq!(mask.len(), 3);
        assert_eq!(mask.missing_count(), 0);
        assert!(mask.is_all_valid());
    }

    #[test]
    fn test_from_validity_inverts() {
        let mask = Mask::from_validity([true, false, true]);
        assert_eq!(mask.as_slice(), &[false, true, false]);
        assert_eq!(mask.missing_rows().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_empty_mask() {
        let mask = Mask::all_missing(0);
        assert!(mask.is_empty());
        assert!(mask.is_all_valid());
        assert!(!mask.is_missing(0));
    }
}
