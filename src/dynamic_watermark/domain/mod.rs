pub mod color;
pub mod error;
pub mod image;
pub mod image_processor_trait;
pub mod image_source_trait;
pub mod output_sink_trait;
pub mod position;
pub mod text_overlay;
pub mod watermark;
