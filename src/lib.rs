//! Equity grant vesting forecast.
//!
//! Parses an equity-compensation export report and forecasts vesting
//! quantities aggregated per calendar quarter (or day). Every stage (parse,
//! join, forecast, aggregate, validate, write) is an ordinary function; the
//! `process` module chains them into the pipeline the binary runs.

pub mod aggregate;
pub mod forecast;
pub mod parse;
pub mod process;
pub mod types;
pub mod validate;
