// Copyright (c) 2026 Stub-Array Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use memmap2::Mmap;

use stub_array::capstone::Arch;
use stub_array::utils::{parse_hex_u64, resolve_input_path};
use stub_array::{
    debug, generate_code, manifest, CodeImage, Generated, GeneratorConfig, ImageOptions,
    ObjectImage, RawImage, RegionClass, Sentinel,
};

/// Turn machine code into a C byte array with disassembly comments, zeroing
/// sentinel slots and emitting their offsets as macros.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Object file (ELF, PE, Mach-O, COFF) or, with --raw, a flat binary
    input: String,

    /// C identifier used for the array and its macros
    #[arg(short = 'i', long = "ident", default_value = stub_array::config::DEFAULT_IDENTIFIER)]
    ident: String,

    /// Treat the input as a flat binary
    #[arg(long, default_value_t = false)]
    raw: bool,

    /// Load address of a raw image
    #[arg(long, value_parser = parse_hex_u64, default_value = "0")]
    base: u64,

    /// Decoder to use (inferred from the object header if omitted)
    #[arg(short = 'a', long, value_enum)]
    arch: Option<Arch>,

    /// Section class to convert
    #[arg(long, value_enum, default_value_t = RegionClass::Code)]
    class: RegionClass,

    /// Only convert these sections (repeatable)
    #[arg(short = 's', long = "section")]
    sections: Vec<String>,

    /// Clip regions to addresses at or above this one
    #[arg(long, value_parser = parse_hex_u64)]
    start: Option<u64>,

    /// Clip regions to addresses below this one
    #[arg(long, value_parser = parse_hex_u64)]
    end: Option<u64>,

    /// 4-byte sentinel marking patchable slots, in memory order
    #[arg(long, default_value = "0xDEADBEEF")]
    sentinel: Sentinel,

    /// Demangle Rust and C++ names in label lines
    #[arg(long, default_value_t = false)]
    demangle: bool,

    /// Write the generated code here instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Also write a JSON manifest of the placeholders
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Enable debug output
    #[arg(short = 'd', long = "debug", default_value_t = false)]
    debug: bool,
}

impl Args {
    fn image_options(&self) -> ImageOptions {
        let window = match (self.start, self.end) {
            (None, None) => None,
            (start, end) => Some((start.unwrap_or(0), end.unwrap_or(u64::MAX))),
        };
        ImageOptions {
            arch: self.arch,
            base: self.base,
            sections: self.sections.clone(),
            window,
            demangle: self.demangle,
        }
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new(self.ident.clone()).with_sentinel(self.sentinel)
    }
}

fn generate(args: &Args, data: &[u8]) -> Result<Generated> {
    let config = args.generator_config();
    let options = args.image_options();
    let image: Box<dyn CodeImage + '_> = if args.raw {
        Box::new(RawImage::new(data, options)?)
    } else {
        Box::new(ObjectImage::parse(data, options)?)
    };
    Ok(generate_code(image.as_ref(), &config, args.class))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _logger = debug::init_logging(args.debug).context("failed to start logger")?;

    let path = resolve_input_path(&args.input);
    info!("stub-array started on {}", path.display());
    let file = fs::File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    // SAFETY: the mapping is read-only and dropped before main returns; the
    // input is not expected to change underneath us while we run.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("failed to map {}", path.display()))?;

    let generated = generate(&args, &mmap)?;

    match &args.output {
        Some(out) => {
            fs::write(out, &generated.text)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!("Wrote {} to {}", generated.identifier, out.display());
        }
        None => {
            let stdout = io::stdout();
            let mut w = stdout.lock();
            w.write_all(generated.text.as_bytes())?;
            w.flush()?;
        }
    }

    if let Some(manifest_path) = &args.manifest {
        let value = manifest::to_json(&generated).context("failed to build manifest")?;
        let json = serde_json::to_string_pretty(&value)?;
        fs::write(manifest_path, json)
            .with_context(|| format!("failed to write {}", manifest_path.display()))?;
        info!("Wrote manifest to {}", manifest_path.display());
    }

    info!("Done.");
    Ok(())
}
