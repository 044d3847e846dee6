// Crate root: declare modules and control visibility
pub mod capstone;
pub mod config;
pub mod debug;
pub mod formatter;
pub mod generator;
pub mod image;
pub mod manifest;
pub mod memory;
pub mod object_image;
pub mod raw_image;
pub mod record;
pub mod scanner;
pub mod symbols;
pub mod utils;
pub mod walker;

#[cfg(test)]
mod testing;

// Re-export commonly used API from the library for binaries/tests
pub use config::{GeneratorConfig, ImageOptions};
pub use generator::{generate_code, CodeGenerator, Generated, Placeholder};
pub use image::{CodeImage, DecodedInstruction};
pub use memory::{MemoryRegion, RegionClass};
pub use object_image::ObjectImage;
pub use raw_image::RawImage;
pub use scanner::Sentinel;
