//! Timeline panel projections.

pub mod view;
