use crate::capstone::Arch;
use crate::memory::MemoryRegion;
use crate::scanner::Sentinel;

/// Name used when the caller does not pick one.
pub const DEFAULT_IDENTIFIER: &str = "CODE_";

/// Everything the generator needs besides the image itself.
///
/// `identifier` names the array and prefixes every macro. It is pasted into the
/// output as-is; making sure it is a valid C identifier is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub identifier: String,
    pub sentinel: Sentinel,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER.to_string(),
            sentinel: Sentinel::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_sentinel(mut self, sentinel: Sentinel) -> Self {
        self.sentinel = sentinel;
        self
    }
}

/// How to turn an input file into a `CodeImage` and which parts of it to use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageOptions {
    /// Decoder to use. Required for raw images, taken from the header otherwise.
    pub arch: Option<Arch>,
    /// Load address of a raw image.
    pub base: u64,
    /// Only keep sections with these names. Empty keeps everything.
    pub sections: Vec<String>,
    /// Clip regions to `[start, end)`.
    pub window: Option<(u64, u64)>,
    pub demangle: bool,
}

impl ImageOptions {
    /// Apply the section filter and address window to a region list,
    /// keeping the original order.
    pub fn select(&self, regions: Vec<MemoryRegion>) -> Vec<MemoryRegion> {
        regions
            .into_iter()
            .filter(|r| self.sections.is_empty() || self.sections.iter().any(|s| *s == r.name))
            .filter_map(|r| match self.window {
                Some((low, high)) => r.clip_region(low, high),
                None => Some(r),
            })
            .collect()
    }
}
