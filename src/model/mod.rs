//! Document data model: tracks, transforms, actions, and projections.

pub mod document;
pub mod normalize;
pub mod track;
