// park/src/lib.rs
#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod util;
pub mod paths;

pub mod bookmark;
pub mod store;

pub mod commands;

pub use bookmark::Bookmark;
pub use error::{ParkError, Result};
pub use store::Store;
