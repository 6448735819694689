//! Typed calls for the ZNP command catalog.
//!
//! Each submodule extends [`Znp`](crate::Znp) with one method per command of
//! a subsystem. Synchronous commands resolve with their decoded response;
//! commands the device answers with an indication return once the request
//! has been accepted, and the outcome arrives on the event channel.

mod af;
mod app_cnf;
mod sapi;
mod sys;
mod util;
mod zdo;

