//! Cancellation module
//!
//! One-shot cancellation token shared between the traversal loop, the
//! deadline timer, and any external caller that wants to stop a run early.

mod token;

pub use token::CancelToken;
