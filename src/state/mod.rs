//! State types for the viewer
//!
//! - `view_state`: the controller's single state and the rendered document
//! - `theme`: theme catalog and appearance resolution

pub mod theme;
mod view_state;

pub use theme::AppearanceClass;
pub use view_state::*;
