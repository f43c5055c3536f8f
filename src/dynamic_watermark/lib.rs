//! Stamps an image or text watermark onto a downloaded base image.
//!
//! The pipeline lives in [`application::watermark_service::WatermarkService`];
//! its collaborators (image source, raster engine, output sink) are traits in
//! [`domain`] with default implementations in [`infrastructure`].

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::error::{ApplicationError, Stage};
pub use application::watermark_service::{Applied, Rendered, WatermarkService};
pub use domain::position::{resolve, Anchor, AnchorRule, Position};
pub use domain::watermark::WatermarkSpec;
