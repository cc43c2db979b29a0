//! Platform abstraction layer for the monotonic clock and the sleep primitive.
//!
//! The detection loop only ever talks to the platform through [`Platform`], which allows tests
//! to substitute a virtual clock (see `FakePlatform`) or a mock and inject stalls on demand.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::*;
pub(crate) use facade::*;
#[cfg(test)]
pub(crate) use fake::*;
pub(crate) use real::*;
