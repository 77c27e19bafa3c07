//! Null bitmap to mask conversion.

use polars::prelude::Series;
use tabio_model::Mask;

/// Builds the table mask for an engine column.
///
/// The mask always has one entry per row. Float NaN is a value; only the
/// engine's null bitmap marks a row as missing.
pub fn reconcile(series: &Series) -> Mask {
    if series.null_count() == 0 {
        return Mask::all_valid(series.len());
    }
    let nulls = series.is_null();
    Mask::from_missing(nulls.into_iter().map(|flag| flag.unwrap_or(true)))
}

#[cfg(test)]
mod tests {
    use polars::prelude::{DataType, NamedFrom};

    use super::*;

    #[test]
    fn test_no_nulls_is_all_valid() {
        let series = Series::new("a".into(), &[1i64, 2, 3]);
        let mask = reconcile(&series);
        assert_eq!(mask.len(), 3);
        assert!(mask.is_all_valid());
    }

    #[test]
    fn test_null_positions_are_masked() {
        let series = Series::new("a".into(), &[Some(1i64), None, Some(3), None]);
        let mask = reconcile(&series);
        assert_eq!(mask.missing_rows().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_nan_is_not_missing() {
        let series = Series::new("f".into(), &[f64::NAN, 1.0]);
        assert!(reconcile(&series).is_all_valid());
    }

    #[test]
    fn test_zero_rows() {
        let series = Series::new_empty("a".into(), &DataType::Int64);
        assert!(reconcile(&series).is_empty());
    }
}
