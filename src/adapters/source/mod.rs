//! Extraction source abstraction layer
//!
//! Sources are selected by `source.kind` and built through [`create_source`].

pub mod factory;
pub mod traits;

pub use factory::create_source;
pub use traits::ExtractionSource;
