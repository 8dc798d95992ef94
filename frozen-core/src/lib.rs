#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

#[macro_use]
mod macros;

mod error;
pub use error::*;

// Declarations and resolved catalogs
mod types;
pub use types::*;

mod value;
pub use value::*;

// Construction phase
mod partial;
pub use partial::{Ancestor, Args, ConstructionState, Partial};

// Frozen phase
mod frozen;
pub use frozen::*;

mod snapshot;
pub use snapshot::*;

pub mod registry;

