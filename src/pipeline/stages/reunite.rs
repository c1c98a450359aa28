use polars::prelude::DataFrame;

use crate::constants::REUNITE_ORDER;
use crate::error::Result;
use crate::frame;

/// Union the quarterly main table, the net-new target rows and the
/// nat/subnat extract into one wide table. Dimension columns are harmonized
/// across all three before stacking; columns a part lacks are null there.
pub fn apply(main: DataFrame, net_new: DataFrame, nat_subnat: DataFrame) -> Result<DataFrame> {
    let stacked = frame::concat(vec![main, net_new, nat_subnat])?;
    frame::select(&stacked, REUNITE_ORDER)
}
