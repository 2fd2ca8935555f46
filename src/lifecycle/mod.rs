//! Job lifecycle
//!
//! `machine` holds the pure transition function over observed job states.
//! `driver` runs it: upload, submit, poll, tail, and the cleanup step that
//! follows every exit from the polling loop.

mod driver;
mod machine;

pub use driver::{Clients, Driver, DriverConfig, RunOutcome};
pub use machine::{transition, Action, Observation};
