//! HTTP session module
//!
//! Cookie-persisting GET issuer driven by the traffic generator. The
//! `Fetcher` trait is the seam tests mock instead of the network.

mod http;

pub use http::{Fetcher, HttpSession, SessionError};
