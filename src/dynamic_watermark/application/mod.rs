pub mod error;
pub mod watermark_service;
