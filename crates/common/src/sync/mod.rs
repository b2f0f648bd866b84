//! Concurrency primitives shared by the HTTP layer
//!
//! - **`single_flight`**: collapse concurrent invocations of the same
//!   asynchronous operation into one execution whose result every caller
//!   observes

pub mod single_flight;

pub use single_flight::SingleFlight;
