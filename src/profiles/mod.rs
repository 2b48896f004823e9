//! Application profile rule sets (App2, App2E, App4, App5, TSP 2121).

pub(crate) mod image;
pub(crate) mod registry;
pub(crate) mod rules;
pub(crate) mod tables;
