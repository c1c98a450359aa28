//! Category domain harmonization.
//!
//! Dimension fields from different inputs are compared by value in joins and
//! unions. Before such an operation `harmonize` aligns each participating
//! column on the `String` dtype (all-null and categorical columns included)
//! and computes the union of their value domains; the values themselves never
//! change.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::debug;

use super::column;
use crate::error::{PipelineError, Result};

fn align_to_string(df: &mut DataFrame, name: &str) -> Result<()> {
    let current = column(df, name)?;
    match current.dtype() {
        DataType::String => Ok(()),
        DataType::Null | DataType::Categorical(_, _) => {
            let cast = current.cast(&DataType::String)?;
            df.with_column(cast)?;
            Ok(())
        }
        other => Err(PipelineError::ColumnType {
            column: name.to_string(),
            expected: "str",
            found: other.to_string(),
        }),
    }
}

fn extend_domain(domain: &mut Vec<String>, seen: &mut HashSet<String>, values: &StringChunked) {
    for value in values.into_iter().flatten() {
        if seen.insert(value.to_string()) {
            domain.push(value.to_string());
        }
    }
}

/// Align every `(frame, column)` pair on one string dtype and return the
/// union of their domains in first-seen order.
///
/// Column names may differ per frame, which is how join keys with different
/// names on each side are prepared.
pub fn harmonize(targets: &mut [(&mut DataFrame, &str)]) -> Result<Vec<String>> {
    let mut domain = Vec::new();
    let mut seen = HashSet::new();
    for (df, name) in targets.iter_mut() {
        align_to_string(df, name)?;
        extend_domain(&mut domain, &mut seen, super::strings(df, name)?);
    }
    debug!(
        columns = ?targets.iter().map(|(_, c)| *c).collect::<Vec<_>>(),
        domain_size = domain.len(),
        "harmonized category domains"
    );
    Ok(domain)
}

fn is_textual(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Null | DataType::Categorical(_, _))
}

/// Union the rows of `frames`.
///
/// The output has every column seen in any input, in order of first
/// appearance; a frame lacking a column contributes nulls. Dimension columns
/// are harmonized across all inputs before stacking. A column holding
/// different types in different frames is an error.
pub fn concat(mut frames: Vec<DataFrame>) -> Result<DataFrame> {
    let mut names: Vec<String> = Vec::new();
    for df in &frames {
        for name in df.get_column_names_str() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }

    for name in &names {
        let dtypes: Vec<DataType> = frames
            .iter()
            .filter_map(|df| df.column(name).ok().map(|c| c.dtype().clone()))
            .collect();
        if dtypes.iter().any(is_textual) {
            let mut targets: Vec<(&mut DataFrame, &str)> = frames
                .iter_mut()
                .filter(|df| df.get_column_index(name).is_some())
                .map(|df| (df, name.as_str()))
                .collect();
            harmonize(&mut targets)?;
        } else if let Some(found) = dtypes.iter().find(|d| **d != dtypes[0]) {
            return Err(PipelineError::ColumnType {
                column: name.clone(),
                expected: if dtypes[0] == DataType::Float64 { "f64" } else { "i64" },
                found: found.to_string(),
            });
        }
    }

    let rows: usize = frames.iter().map(DataFrame::height).sum();
    let lazy: Vec<LazyFrame> = frames.into_iter().map(IntoLazy::lazy).collect();
    let out = concat_lf_diagonal(lazy, UnionArgs::default())?.collect()?;
    debug!(rows, columns = names.len(), "concatenated frames");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::column_names;
    use crate::frame::test_support::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_harmonize_unions_domains_without_changing_values() {
        let mut a = frame(vec![strs("indicator", &[Some("TX_CURR"), None, Some("TX_NEW")])]);
        let mut b = frame(vec![strs("indicator (as seen in MSD)", &[Some("TX_PVLS"), Some("TX_CURR")])]);
        let mut c = frame(vec![Column::full_null("indicator".into(), 2, &DataType::Null)]);
        let before = [
            str_values(&a, "indicator"),
            str_values(&b, "indicator (as seen in MSD)"),
        ];

        let domain = harmonize(&mut [
            (&mut a, "indicator"),
            (&mut b, "indicator (as seen in MSD)"),
            (&mut c, "indicator"),
        ])
        .unwrap();

        let expected: BTreeSet<&str> = ["TX_CURR", "TX_NEW", "TX_PVLS"].into_iter().collect();
        assert_eq!(domain.iter().map(String::as_str).collect::<BTreeSet<_>>(), expected);
        assert_eq!(domain.len(), 3);
        assert_eq!(str_values(&a, "indicator"), before[0]);
        assert_eq!(str_values(&b, "indicator (as seen in MSD)"), before[1]);
        assert_eq!(c.column("indicator").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_harmonize_rejects_numeric_column() {
        let mut a = frame(vec![strs("k", &[Some("x")])]);
        let mut b = frame(vec![i64s("k", &[Some(1)])]);
        assert!(matches!(
            harmonize(&mut [(&mut a, "k"), (&mut b, "k")]),
            Err(PipelineError::ColumnType { .. })
        ));
    }

    #[test]
    fn test_concat_fills_missing_columns_with_nulls() {
        let a = frame(vec![strs("indicator", &[Some("TX_CURR")]), f64s("qtr1", &[Some(5.0)])]);
        let b = frame(vec![strs("indicator", &[Some("PLHIV")]), i64s("fiscal_year", &[Some(2021)])]);

        let out = concat(vec![a, b]).unwrap();
        assert_eq!(column_names(&out), vec!["indicator", "qtr1", "fiscal_year"]);
        assert_eq!(out.height(), 2);
        assert_eq!(
            str_values(&out, "indicator"),
            vec![Some("TX_CURR".to_string()), Some("PLHIV".to_string())]
        );
        assert_eq!(f64_values(&out, "qtr1"), vec![Some(5.0), None]);
        assert_eq!(i64_values(&out, "fiscal_year"), vec![None, Some(2021)]);
    }

    #[test]
    fn test_concat_rejects_conflicting_types() {
        let a = frame(vec![f64s("x", &[Some(1.0)])]);
        let b = frame(vec![i64s("x", &[Some(1)])]);
        assert!(matches!(concat(vec![a, b]), Err(PipelineError::ColumnType { .. })));
    }
}
