//! Relational operations: left join, unpivot and grouped sums.

use polars::prelude::*;
use tracing::debug;

use super::{column, column_names};
use crate::error::{PipelineError, Result};

/// Left join on pairs of `(left column, right column)`.
///
/// Every left row is kept in left order; a left row matching several right
/// rows is repeated once per match. Null keys match null keys. The right key
/// columns are dropped. String keys must have been run through
/// [`harmonize`](super::harmonize) so both sides carry the same dtype.
pub fn left_join(left: &DataFrame, right: &DataFrame, on: &[(&str, &str)]) -> Result<DataFrame> {
    for (l, r) in on {
        let (lc, rc) = (column(left, l)?, column(right, r)?);
        if lc.dtype() != rc.dtype() {
            return Err(PipelineError::ColumnType {
                column: r.to_string(),
                expected: dtype_name(lc.dtype()),
                found: rc.dtype().to_string(),
            });
        }
    }
    let right_keys: Vec<&str> = on.iter().map(|(_, r)| *r).collect();
    for name in right.get_column_names_str() {
        if !right_keys.contains(&name) && left.get_column_index(name).is_some() {
            return Err(PipelineError::DuplicateColumn(name.to_string()));
        }
    }

    let args = JoinArgs {
        join_nulls: true,
        maintain_order: MaintainOrderJoin::Left,
        ..JoinArgs::new(JoinType::Left)
    }
    .with_coalesce(JoinCoalesce::CoalesceColumns);
    let joined = left.join(
        right,
        on.iter().map(|(l, _)| *l),
        right_keys.iter().copied(),
        args,
        None,
    )?;
    debug!(
        left_rows = left.height(),
        right_rows = right.height(),
        output_rows = joined.height(),
        "left join"
    );
    Ok(joined)
}

fn dtype_name(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::String => "str",
        DataType::Int64 => "i64",
        DataType::Float64 => "f64",
        DataType::Date => "date",
        _ => "other",
    }
}

/// Unpivot `value_vars` into a `var_name` label column and a `value_name`
/// column. Remaining columns are identifiers and come first; rows are emitted
/// one value column at a time.
pub fn melt(df: &DataFrame, value_vars: &[&str], var_name: &str, value_name: &str) -> Result<DataFrame> {
    for name in value_vars {
        column(df, name)?;
    }
    let index: Vec<Selector> = df
        .get_column_names_str()
        .into_iter()
        .filter(|name| !value_vars.contains(name))
        .map(Selector::from)
        .collect();
    let args = UnpivotArgsDSL {
        on: value_vars.iter().copied().map(Selector::from).collect(),
        index,
        variable_name: Some(var_name.into()),
        value_name: Some(value_name.into()),
    };
    Ok(df.clone().lazy().unpivot(args).collect()?)
}

/// Collapse rows sharing the same values in every column except
/// `sum_columns`, summing those float columns. Null keys form a group of
/// their own and nulls are skipped in the sums, so a group of nulls sums to
/// zero. Groups come out in order of first appearance with the input's
/// column order.
pub fn group_sum(df: &DataFrame, sum_columns: &[&str]) -> Result<DataFrame> {
    for name in sum_columns {
        column(df, name)?;
    }
    let order = column_names(df);
    let keys: Vec<Expr> = order
        .iter()
        .filter(|name| !sum_columns.contains(&name.as_str()))
        .map(|name| col(name.as_str()))
        .collect();
    let sums: Vec<Expr> = sum_columns.iter().map(|name| col(*name).sum()).collect();
    let ordered: Vec<Expr> = order.iter().map(|name| col(name.as_str())).collect();

    let grouped = df
        .clone()
        .lazy()
        .group_by_stable(keys)
        .agg(sums)
        .select(ordered)
        .collect()?;
    debug!(input_rows = df.height(), groups = grouped.height(), "grouped sum");
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::harmonize;
    use crate::frame::test_support::*;

    #[test]
    fn test_left_join_requires_matching_key_types() {
        let left = frame(vec![strs("k", &[Some("1"), Some("2")])]);
        let right = frame(vec![i64s("key", &[Some(2)]), strs("flag", &[Some("Y")])]);
        assert!(matches!(
            left_join(&left, &right, &[("k", "key")]),
            Err(PipelineError::ColumnType { .. })
        ));
    }

    #[test]
    fn test_left_join_keeps_unmatched_and_matches_nulls() {
        let mut left = frame(vec![
            strs("k", &[Some("a"), None, Some("c")]),
            f64s("v", &[Some(1.0), Some(2.0), Some(3.0)]),
        ]);
        let mut right = frame(vec![strs("key", &[Some("a"), None]), strs("flag", &[Some("Y"), Some("N")])]);
        harmonize(&mut [(&mut left, "k"), (&mut right, "key")]).unwrap();

        let joined = left_join(&left, &right, &[("k", "key")]).unwrap();
        assert_eq!(joined.height(), 3);
        assert!(joined.column("key").is_err());
        assert_eq!(
            str_values(&joined, "flag"),
            vec![Some("Y".to_string()), Some("N".to_string()), None]
        );
    }

    #[test]
    fn test_left_join_repeats_rows_for_multiple_matches() {
        let left = frame(vec![i64s("k", &[Some(1), Some(2)])]);
        let right = frame(vec![i64s("k2", &[Some(1), Some(1)]), f64s("x", &[Some(10.0), Some(20.0)])]);
        let joined = left_join(&left, &right, &[("k", "k2")]).unwrap();
        assert_eq!(i64_values(&joined, "k"), vec![Some(1), Some(1), Some(2)]);
        assert_eq!(f64_values(&joined, "x"), vec![Some(10.0), Some(20.0), None]);
    }

    #[test]
    fn test_left_join_rejects_clashing_payload_columns() {
        let left = frame(vec![i64s("k", &[Some(1)]), f64s("x", &[Some(1.0)])]);
        let right = frame(vec![i64s("k", &[Some(1)]), f64s("x", &[Some(2.0)])]);
        assert!(matches!(
            left_join(&left, &right, &[("k", "k")]),
            Err(PipelineError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_melt_is_column_major() {
        let df = frame(vec![
            strs("id", &[Some("x"), Some("y")]),
            f64s("qtr1", &[Some(1.0), Some(2.0)]),
            f64s("qtr2", &[Some(3.0), None]),
        ]);
        let long = melt(&df, &["qtr1", "qtr2"], "quarter", "values").unwrap();
        assert_eq!(column_names(&long), vec!["id", "quarter", "values"]);
        let quarters: Vec<_> = str_values(&long, "quarter").into_iter().flatten().collect();
        assert_eq!(quarters, vec!["qtr1", "qtr1", "qtr2", "qtr2"]);
        assert_eq!(f64_values(&long, "values"), vec![Some(1.0), Some(2.0), Some(3.0), None]);
        let ids: Vec<_> = str_values(&long, "id").into_iter().flatten().collect();
        assert_eq!(ids, vec!["x", "y", "x", "y"]);
    }

    #[test]
    fn test_group_sum_treats_null_keys_as_equal() {
        let df = frame(vec![
            f64s("v", &[Some(1.0), None, Some(2.0)]),
            strs("k", &[None, Some("a"), None]),
        ]);
        let grouped = group_sum(&df, &["v"]).unwrap();
        assert_eq!(column_names(&grouped), vec!["v", "k"]);
        assert_eq!(grouped.height(), 2);
        assert_eq!(str_values(&grouped, "k")[0], None);
        assert_eq!(f64_values(&grouped, "v"), vec![Some(3.0), Some(0.0)]);
    }
}
