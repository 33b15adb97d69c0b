//! Hosting context for the viewer
//!
//! A [`Host`] grants the page, answers the live colour-scheme preference and
//! receives every rendered page. The command-line host writes pages to a
//! file and drives the controller from an event loop.

mod file_host;
mod runner;

pub use file_host::FileHost;
pub use runner::{run, Session};

use crate::view::Page;

/// Services the controller needs from its hosting context
pub trait Host {
    /// Current colour-scheme preference; read on every render
    fn prefers_dark(&self) -> bool;

    /// Receive the page after a render has settled
    fn present(&mut self, page: &Page);

    /// Fresh page for a new controller
    fn page(&self) -> Page {
        Page::default()
    }
}
