//! State tracking for links under evaluation
//!
//! This module defines the `Link` record and the `LinkState` classification
//! derived from it.

mod link;

pub use link::{Link, LinkState};
