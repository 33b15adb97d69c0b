//! File handling for the viewer
//!
//! - Reading notebook sources with encoding detection
//! - Atomic page writes
//! - The periodic source refresh loop

pub mod autoreload;
pub mod io;

pub use autoreload::{Autoreload, AutoreloadConfig};
pub use io::*;
