//! Store-independent marketplace rules: distance, ranking, catalog filtering and the
//! order lifecycle.

pub mod catalog;
pub mod geo;
pub mod lifecycle;
pub mod ranking;
