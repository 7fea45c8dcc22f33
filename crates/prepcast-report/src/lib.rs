//! prepcast-report: Presentation helpers for saved forecasts.

pub mod html;

pub use html::{generate_html, write_html_report};
