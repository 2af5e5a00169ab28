pub mod engine;
pub mod error;
pub mod totals;

pub use engine::{MAX_DEPTH, expand, sum_history, summarize};
pub use error::{AggregateError, AggregateErrorKind};
pub use totals::Totals;
