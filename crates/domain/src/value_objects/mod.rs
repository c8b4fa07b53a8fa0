//! Value objects - Immutable objects defined by their attributes

mod names;

pub use names::{Description, LocationName, TextError, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH};
