//! Allows reading from frozen instances and their values

mod value;
pub use value::*;

mod record;
pub use record::*;

mod list_like;
pub use list_like::*;

mod map;
pub use map::*;
