#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use frozen_core::*;

#[cfg(feature = "reflect")]
pub use frozen_reflect::*;

#[cfg(feature = "serialize")]
pub use frozen_serialize::*;

static_assertions::assert_impl_all!(Frozen: Send, Sync, Clone);
static_assertions::assert_impl_all!(Value: Send, Sync);
static_assertions::assert_impl_all!(TypeDescriptor: Send, Sync);
static_assertions::assert_impl_all!(Snapshot: Send, Sync);
static_assertions::assert_not_impl_any!(Partial: Clone);
