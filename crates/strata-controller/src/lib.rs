//! Strata Controller Layer
//!
//! Controllers sit between request handlers and models: they fetch through
//! the model registered under their own entity type and run every result
//! through a shaping pipeline (per-record formatting, batch post-processing,
//! optional rekeying) before handing it back. Cursor-style iteration over
//! large result sets lives here too.

pub mod controller;
pub mod hooks;

pub use controller::Controller;
pub use hooks::{ControllerDef, DEFAULT_PAGE_LIMIT, Formatter, PlainController, PostProcessor};
