//! Declarations: type descriptors, their fields, and the resolved catalog.

mod descriptor;
pub use descriptor::*;

mod field;
pub use field::*;

mod catalog;
pub use catalog::*;
