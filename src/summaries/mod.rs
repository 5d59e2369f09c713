//! Daily climatology comparison and hourly rollup.
//!
//! Readings are normalized once, then fanned out to the historical and
//! current-year aggregators, joined against a full-year calendar, and written
//! as two tables. The hourly path reduces one UTC hour of readings into a
//! single record.

pub mod calendar;
pub mod climatology;
pub mod current;
pub mod hourly;
pub mod pipeline;
pub mod types;
