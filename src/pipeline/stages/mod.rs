//! One module per transform stage, in execution order.
//!
//! Every stage takes its input tables by value or by reference and returns a
//! freshly built table; nothing is mutated behind a caller's back.

pub mod reference_join;
pub mod net_new;
pub mod quarterly;
pub mod reunite;
pub mod long_pivot;
pub mod clean_fields;
pub mod naming;
pub mod lookup;
pub mod vlc;
pub mod output_shaping;
