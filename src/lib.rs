pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod model;
pub mod pdf;
pub mod summary;

pub use config::Config;
pub use document::{render_document, render_report, RenderContext};
pub use error::{DocError, Result};
pub use model::{LineItem, LineItemDocument};
