#![doc = include_str!("../README.md")]

mod container;
mod error;
mod hasher;
mod id;
mod shutdown;

pub use crate::container::*;
pub use crate::error::*;
pub use crate::hasher::*;
pub use crate::id::*;
pub use crate::shutdown::*;
