//! Serial byte stream to metric mutations.
//!
//! `framer` cuts the stream into records, `classifier` names them,
//! `reactor` applies the resulting events to the shared registry.
//!
//! The framer's pending buffer has exactly one writer: the thread running
//! `Bridge::run`. Only the registry is shared with the scrape path.

pub mod classifier;
pub mod event;
pub mod framer;
pub mod policy;
pub mod reactor;
