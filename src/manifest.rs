use serde::Serialize;
use serde_json::Value;

use crate::generator::{Generated, Placeholder};
use crate::memory::MemoryRegion;

/// Machine readable summary of a generated array, for build scripts that
/// want the slot offsets without parsing C.
///
/// ```json
/// { "identifier": "CODE_", "size": 7, "regions": [...],
///   "placeholders": [ { "index": 0, "offset": 1, "address": 4198401 } ] }
/// ```
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub identifier: &'a str,
    pub size: u64,
    pub regions: &'a [MemoryRegion],
    pub placeholders: &'a [Placeholder],
}

impl<'a> From<&'a Generated> for Manifest<'a> {
    fn from(generated: &'a Generated) -> Self {
        Self {
            identifier: &generated.identifier,
            size: generated.size,
            regions: &generated.regions,
            placeholders: &generated.placeholders,
        }
    }
}

pub fn to_json(generated: &Generated) -> serde_json::Result<Value> {
    serde_json::to_value(Manifest::from(generated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_lists_placeholders_in_order() {
        let generated = Generated {
            identifier: "STUB".to_string(),
            text: String::new(),
            placeholders: vec![
                Placeholder {
                    index: 0,
                    offset: 0x20,
                    address: 0x401020,
                },
                Placeholder {
                    index: 1,
                    offset: 0x08,
                    address: 0x401008,
                },
            ],
            regions: vec![MemoryRegion::new(".text".to_string(), 0x401000, 0x40)],
            size: 0x40,
        };

        let v = to_json(&generated).expect("manifest serializes");
        assert_eq!(v["identifier"], "STUB");
        assert_eq!(v["size"], 0x40);
        assert_eq!(v["regions"][0]["name"], ".text");
        let placeholders = v["placeholders"].as_array().expect("placeholders array");
        assert_eq!(placeholders.len(), 2);
        assert_eq!(placeholders[0]["offset"], 0x20);
        assert_eq!(placeholders[1]["index"], 1);
        assert_eq!(placeholders[1]["address"], 0x401008);
    }
}
