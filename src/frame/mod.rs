//! Typed access to polars frames for the batch transform.
//!
//! Dimension fields are `String` columns, measures are nullable `Float64`,
//! fiscal years are `Int64` and calendar dates use the `Date` logical type.
//! The relational operations live in [`ops`] and [`harmonize`]; this module
//! holds the accessors and column builders the stages share.

pub mod harmonize;
pub mod ops;

use chrono::NaiveDate;
use polars::prelude::*;

pub use harmonize::{concat, harmonize};
pub use ops::{group_sum, left_join, melt};

use crate::error::{PipelineError, Result};

pub fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))
}

fn type_error(name: &str, expected: &'static str, found: &Column) -> PipelineError {
    PipelineError::ColumnType {
        column: name.to_string(),
        expected,
        found: found.dtype().to_string(),
    }
}

pub fn strings<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    let c = column(df, name)?;
    c.str().map_err(|_| type_error(name, "str", c))
}

pub fn floats<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked> {
    let c = column(df, name)?;
    c.f64().map_err(|_| type_error(name, "f64", c))
}

pub fn ints<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Int64Chunked> {
    let c = column(df, name)?;
    c.i64().map_err(|_| type_error(name, "i64", c))
}

pub fn dates<'a>(df: &'a DataFrame, name: &str) -> Result<&'a DateChunked> {
    let c = column(df, name)?;
    c.date().map_err(|_| type_error(name, "date", c))
}

pub fn string_column<I, S>(name: &str, values: I) -> Column
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let values: StringChunked = values.into_iter().collect();
    values.with_name(name.into()).into_column()
}

pub fn float_column(name: &str, values: Vec<Option<f64>>) -> Column {
    Series::new(name.into(), values).into_column()
}

pub fn int_column(name: &str, values: Vec<Option<i64>>) -> Column {
    Series::new(name.into(), values).into_column()
}

pub fn date_column(name: &str, values: Vec<Option<NaiveDate>>) -> Column {
    DateChunked::from_naive_date_options(name.into(), values)
        .into_series()
        .into_column()
}

/// A string column repeating `value` on every row.
pub fn constant(name: &str, value: Option<&str>, height: usize) -> Column {
    string_column(name, std::iter::repeat(value).take(height))
}

/// Replace the column of the same name in place, or append it.
pub fn set_column(mut df: DataFrame, column: Column) -> Result<DataFrame> {
    df.with_column(column)?;
    Ok(df)
}

/// Keep the rows whose mask entry is true.
pub fn filter_rows(df: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), mask);
    Ok(df.filter(&mask)?)
}

/// A new frame holding exactly `names`, in that order.
pub fn select(df: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(PipelineError::DuplicateColumn(name.to_string()));
        }
        column(df, name)?;
    }
    Ok(df.select(names.iter().copied())?)
}

pub fn drop_columns(df: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    for name in names {
        column(df, name)?;
    }
    Ok(df.drop_many(names.iter().copied()))
}

/// Rename the columns listed in `map` that are present in the frame.
pub fn rename(mut df: DataFrame, map: &[(&str, &str)]) -> Result<DataFrame> {
    let renamed: Vec<String> = df
        .get_column_names_str()
        .into_iter()
        .map(|name| {
            map.iter()
                .find(|(from, _)| *from == name)
                .map_or_else(|| name.to_string(), |(_, to)| to.to_string())
        })
        .collect();
    for (i, name) in renamed.iter().enumerate() {
        if renamed[..i].contains(name) {
            return Err(PipelineError::DuplicateColumn(name.clone()));
        }
    }
    df.set_column_names(renamed.iter().map(String::as_str))?;
    Ok(df)
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names_str()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Frame builders for unit tests.

    use super::*;

    pub fn strs(name: &str, values: &[Option<&str>]) -> Column {
        string_column(name, values.iter().copied())
    }

    pub fn f64s(name: &str, values: &[Option<f64>]) -> Column {
        float_column(name, values.to_vec())
    }

    pub fn i64s(name: &str, values: &[Option<i64>]) -> Column {
        int_column(name, values.to_vec())
    }

    pub fn frame(columns: Vec<Column>) -> DataFrame {
        DataFrame::new(columns).unwrap()
    }

    pub fn str_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        strings(df, name)
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    pub fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        floats(df, name).unwrap().into_iter().collect()
    }

    pub fn i64_values(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        ints(df, name).unwrap().into_iter().collect()
    }

    pub fn date_values(df: &DataFrame, name: &str) -> Vec<Option<NaiveDate>> {
        dates(df, name).unwrap().as_date_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn sample() -> DataFrame {
        frame(vec![
            strs("indicator", &[Some("TX_CURR"), Some("TX_PVLS"), None]),
            f64s("targets", &[Some(1.0), None, Some(3.0)]),
        ])
    }

    #[test]
    fn test_set_column_checks_length() {
        let err = set_column(sample(), f64s("qtr1", &[Some(1.0), Some(2.0)]));
        assert!(matches!(err, Err(PipelineError::Polars(_))));
    }

    #[test]
    fn test_set_column_replaces_in_place() {
        let df = set_column(sample(), strs("indicator", &[Some("a"), Some("b"), Some("c")])).unwrap();
        assert_eq!(column_names(&df), vec!["indicator", "targets"]);
        assert_eq!(str_values(&df, "indicator")[2].as_deref(), Some("c"));
    }

    #[test]
    fn test_select_orders_and_rejects_missing() {
        let df = sample();
        let selected = select(&df, &["targets", "indicator"]).unwrap();
        assert_eq!(column_names(&selected), vec!["targets", "indicator"]);
        assert!(matches!(select(&df, &["nope"]), Err(PipelineError::MissingColumn(_))));
    }

    #[test]
    fn test_filter_and_rename() {
        let df = rename(sample(), &[("targets", "values")]).unwrap();
        let filtered = filter_rows(&df, &[true, false, true]).unwrap();
        assert_eq!(filtered.height(), 2);
        assert_eq!(f64_values(&filtered, "values"), vec![Some(1.0), Some(3.0)]);
        assert_eq!(str_values(&filtered, "indicator")[1], None);
    }

    #[test]
    fn test_rename_rejects_collisions() {
        assert!(matches!(
            rename(sample(), &[("targets", "indicator")]),
            Err(PipelineError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_typed_accessors_report_type() {
        assert!(matches!(floats(&sample(), "indicator"), Err(PipelineError::ColumnType { .. })));
    }
}
