//! Interactive editing state: selection and canvas drag handling.

pub mod selection;
pub mod snap;
