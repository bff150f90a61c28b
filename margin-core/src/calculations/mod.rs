//! Margin calculations for the clinic audit.
//!
//! The calculator itself lives in [`margin`]; [`report`] turns its result
//! into the values shown on the result screen.

pub mod common;
pub mod margin;
pub mod report;

pub use margin::{compute_audit, room_hours_raw, room_hours_rounded};
pub use report::{
    ChartSlice, MarginStatus, SliceKind, StatementLine, breakdown_slices, format_brl, format_pct,
    income_statement,
};
