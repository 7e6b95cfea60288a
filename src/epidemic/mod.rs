//! Contact graph and threshold epidemic model.
//!
//! A [`Population`] holds persons, their pairwise [`Relation`]s, and the
//! infected set. [`Population::run`] simulates the epidemic to its fixed
//! point with a set of [`Isolations`] severed, without touching the
//! population it is called on.
//!
//! # Submodules
//!
//! - [`dataset`]: textual dataset loader
//! - [`greedy`]: single-pass isolation baseline

pub mod dataset;
pub mod greedy;
mod population;
mod types;

pub use dataset::DatasetError;
pub use population::Population;
pub use types::{Isolations, Person, Relation};
