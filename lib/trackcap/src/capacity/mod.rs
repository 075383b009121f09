//! Capacity algebra for a single track section.
//!
//! A [`CapacityTerm`] measures one direction of travel, a [`TrackCapacity`] pairs the odd and even
//! directions. Both combine with `+`: `NotModeled` terms are skipped and a `Failed` section
//! poisons every sum it enters. Addition is associative and commutative, so the capacities of a
//! route may be totalled in any order.

pub mod term;
pub mod track;

pub use term::CapacityTerm;
pub use track::TrackCapacity;
