use polars::prelude::{DataFrame, DataType};

use crate::constants::columns::{QUARTER, VALUES};
use crate::error::Result;
use crate::frame;

/// Unpivot every float measure into `(quarter, values)` pairs, one measure
/// column after the other in table order.
pub fn apply(wide: &DataFrame) -> Result<DataFrame> {
    let measures: Vec<&str> = wide
        .get_columns()
        .iter()
        .filter(|column| column.dtype() == &DataType::Float64)
        .map(|column| column.name().as_str())
        .collect();
    frame::melt(wide, &measures, QUARTER, VALUES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::columns::{FISCAL_YEAR, INDICATOR, QTR1, TARGETS};
    use crate::frame::test_support::*;

    #[test]
    fn test_measures_become_rows() {
        let wide = frame(vec![
            f64s(TARGETS, &[Some(5.0), None]),
            i64s(FISCAL_YEAR, &[Some(2021), Some(2021)]),
            strs(INDICATOR, &[Some("TX_CURR"), Some("HTS_TST")]),
            f64s(QTR1, &[Some(1.0), Some(2.0)]),
        ]);

        let long = apply(&wide).unwrap();
        assert_eq!(long.height(), 4);
        assert_eq!(frame::column_names(&long), vec![FISCAL_YEAR, INDICATOR, QUARTER, VALUES]);
        let labels: Vec<_> = str_values(&long, QUARTER).into_iter().flatten().collect();
        assert_eq!(labels, vec!["targets", "targets", "qtr1", "qtr1"]);
        assert_eq!(f64_values(&long, VALUES), vec![Some(5.0), None, Some(1.0), Some(2.0)]);
    }
}
