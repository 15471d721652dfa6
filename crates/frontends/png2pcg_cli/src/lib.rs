/*
    x1pcg
    Sharp X1 programmable character generator loader

    Copyright 2025 x1pcg contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    png2pcg_cli::lib.rs

    The png2pcg converter front end.

*/

//! Converts 128x128 8-colour PNG images to 6144-byte X1 PCG data files. Each `NAME.png` is
//! written next to the source as `NAME.PCG`. No dithering or resizing is done.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use bpaf::{Args, OptionParser, ParseFailure, Parser};
use image::ImageError;
use thiserror::Error;

use x1pcg_core::{convert, PcgError};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;
pub const EXIT_IO: i32 = 4;
pub const EXIT_INVALID_DATA: i32 = 5;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Couldn't decode {path}: {source}")]
    Decode {
        path:   PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("{path}: {source}")]
    Pcg {
        path:   PathBuf,
        #[source]
        source: PcgError,
    },
}

impl ConvertError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::Decode { .. } => EXIT_INVALID_DATA,
            ConvertError::Pcg {
                source: PcgError::NotFound(_),
                ..
            } => EXIT_NOT_FOUND,
            ConvertError::Pcg {
                source: PcgError::Io { .. },
                ..
            } => EXIT_IO,
            ConvertError::Pcg { .. } => EXIT_INVALID_DATA,
        }
    }
}

fn cli_args() -> OptionParser<Vec<PathBuf>> {
    bpaf::positional::<PathBuf>("PNG")
        .help("128x128 8-colour image")
        .some("Expected at least one PNG file")
        .to_options()
        .descr("Convert PNG images to X1 PCG data")
}

/// Convert one image. Returns the path of the written PCG file.
pub fn convert_file(path: &Path) -> Result<PathBuf, ConvertError> {
    let pcg_err = |source: PcgError| ConvertError::Pcg {
        path: path.to_path_buf(),
        source,
    };

    let image = image::open(path).map_err(|e| match e {
        ImageError::IoError(io) => pcg_err(PcgError::from_io(path, io)),
        source => ConvertError::Decode {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let rgb = image.to_rgb8();
    log::debug!("Decoded {}: {}x{}", path.display(), rgb.width(), rgb.height());

    let bitmap = convert::bitmap_from_pixels(rgb.width(), rgb.height(), rgb.as_raw(), 3).map_err(pcg_err)?;

    let out_path = convert::pcg_file_name(path);
    std::fs::write(&out_path, bitmap.as_bytes()).map_err(|e| pcg_err(PcgError::from_io(&out_path, e)))?;
    Ok(out_path)
}

/// Run png2pcg with `args` (not including the program name) and return the process exit code.
/// Files are converted in order; the first failure stops the run.
pub fn run(args: &[&str], out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    let files = match cli_args().run_inner(Args::from(args)) {
        Ok(files) => files,
        Err(ParseFailure::Stdout(text)) => {
            let _ = write!(out, "{}", text);
            return EXIT_SUCCESS;
        }
        Err(ParseFailure::Stderr(text)) => {
            let _ = writeln!(err, "{}", text);
            return EXIT_USAGE;
        }
    };

    for file in &files {
        let _ = write!(out, "{} -> ", file.display());
        match convert_file(file) {
            Ok(out_path) => {
                let _ = writeln!(out, "{}", out_path.display());
            }
            Err(e) => {
                let _ = writeln!(out);
                log::error!("{}", e);
                let _ = writeln!(err, "{}", e);
                return e.exit_code();
            }
        }
    }
    EXIT_SUCCESS
}

/// Entry point for the png2pcg binary.
pub fn run_cli() -> i32 {
    env_logger::init();

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    run(&args, &mut std::io::stdout(), &mut std::io::stderr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use x1pcg_core::GlyphBitmap;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("png2pcg-test-{}-{}", std::process::id(), name))
    }

    fn run_args(args: &[&str]) -> (i32, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(args, &mut out, &mut err);
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn converts_tiles_to_glyphs() {
        let png = temp_path("grid.png");
        // Tile 0x21 solid green, everything else black.
        let image = RgbImage::from_fn(128, 128, |x, y| {
            if (8..16).contains(&x) && (16..24).contains(&y) {
                Rgb([0, 0xFF, 0])
            }
            else {
                Rgb([0, 0, 0])
            }
        });
        image.save(&png).unwrap();

        let (code, stdout) = run_args(&[png.to_str().unwrap()]);
        let pcg = temp_path("grid.PCG");
        let bitmap = GlyphBitmap::load(&pcg).unwrap();
        std::fs::remove_file(&png).unwrap();
        std::fs::remove_file(&pcg).unwrap();

        assert_eq!(code, EXIT_SUCCESS);
        assert!(stdout.contains("grid.PCG"));
        let glyph = bitmap.glyph(0x21);
        assert!(glyph.lines.iter().all(|l| l.green == 0xFF && l.red == 0 && l.blue == 0));
        assert_eq!(bitmap.glyph(0x20), Default::default());
    }

    #[test]
    fn wrong_size_is_invalid_data() {
        let png = temp_path("small.png");
        RgbImage::new(64, 64).save(&png).unwrap();
        let (code, _) = run_args(&[png.to_str().unwrap()]);
        std::fs::remove_file(&png).unwrap();
        assert_eq!(code, EXIT_INVALID_DATA);
        assert!(!temp_path("small.PCG").exists());
    }

    #[test]
    fn missing_image_is_not_found() {
        let png = temp_path("missing.png");
        assert_eq!(run_args(&[png.to_str().unwrap()]).0, EXIT_NOT_FOUND);
    }

    #[test]
    fn no_files_is_usage_error() {
        assert_eq!(run_args(&[]).0, EXIT_USAGE);
    }
}
