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

    setpcg_cli::lib.rs

    The setpcg front end.

*/

//! Loads a 6144-byte PCG data file into an emulated X1 using the timed definition protocol, and
//! optionally draws the 16x16 preview grid. The resulting PCG RAM and screen can be written out
//! with `--dump-pcg` and `--screenshot`.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use thiserror::Error;

use x1pcg_config::{parse_args, read_config_file, ArgParseFailure, CmdLineArgs, ConfigFileParams, DEFAULT_CONFIG_FILE};
use x1pcg_core::{devices::x1::X1Video, preview, DisplayContext, GlyphBitmap, PcgError};

pub const USAGE: &str = "\
Usage: setpcg [-v|-w] [filename]
Set PCG data from a file. (only for Sharp X1)
  -v    Preview all characters.
  -w    Preview all characters.(wide mode)
";

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;
pub const EXIT_IO: i32 = 4;
pub const EXIT_INVALID_DATA: i32 = 5;
pub const EXIT_CONFIG: i32 = 6;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0} not found.")]
    NotFound(PathBuf),
    #[error("I/O error on {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Couldn't save screenshot {path}: {source}")]
    Image {
        path:   PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    InvalidData(PcgError),
    #[error("{0:#}")]
    Config(anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => EXIT_USAGE,
            CliError::NotFound(_) => EXIT_NOT_FOUND,
            CliError::Io { .. } | CliError::Image { .. } => EXIT_IO,
            CliError::InvalidData(_) => EXIT_INVALID_DATA,
            CliError::Config(_) => EXIT_CONFIG,
        }
    }
}

impl From<PcgError> for CliError {
    fn from(err: PcgError) -> Self {
        match err {
            PcgError::NotFound(path) => CliError::NotFound(path),
            PcgError::Io { path, source } => CliError::Io { path, source },
            PcgError::NoReservedRegion { .. } => CliError::Config(err.into()),
            _ => CliError::InvalidData(err),
        }
    }
}

/// Define the PCG from `shell_args.file` if given, then draw the preview if requested.
/// Returns the adapter in its final state.
pub fn setpcg(shell_args: &CmdLineArgs, config: &ConfigFileParams) -> Result<X1Video, CliError> {
    let mut video = config.make_video();

    if let Some(file) = &shell_args.file {
        let bitmap = GlyphBitmap::load(file)?;
        log::info!("Defining 256 PCG characters from {}", file.display());

        let mut ctx = DisplayContext::begin(&mut video, &config.display_config())?;
        ctx.define_all(&bitmap);
        ctx.end();
    }

    if let Some(mode) = shell_args.preview {
        preview::render(&mut video, mode);
    }

    if let Some(path) = &config.emulator.dump_pcg {
        log::info!("Writing PCG RAM to {}", path.display());
        std::fs::write(path, video.pcg_bytes()).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
    }

    if let Some(path) = &config.emulator.screenshot {
        save_screenshot(&video, path)?;
    }

    Ok(video)
}

fn save_screenshot(video: &X1Video, path: &Path) -> Result<(), CliError> {
    let (width, height) = video.screen_size();
    log::info!("Saving {}x{} screenshot to {}", width, height, path.display());
    image::save_buffer(path, &video.render_screen(), width, height, image::ExtendedColorType::Rgb8).map_err(
        |source| CliError::Image {
            path: path.to_path_buf(),
            source,
        },
    )
}

/// Run setpcg with `args` (not including the program name) and return the process exit code.
/// `default_config` is read if present and `--config` is not given.
pub fn run(args: &[&str], default_config: &Path, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    let shell_args = match parse_args(args) {
        Ok(shell_args) => shell_args,
        Err(ArgParseFailure::Help(text)) => {
            let _ = write!(out, "{}", text);
            return EXIT_SUCCESS;
        }
        Err(ArgParseFailure::Invalid(reason)) => {
            log::debug!("Rejected command line: {}", reason);
            let _ = write!(err, "{}", USAGE);
            return EXIT_USAGE;
        }
    };

    let result = read_config_file(default_config, &shell_args)
        .map_err(CliError::Config)
        .and_then(|config| setpcg(&shell_args, &config));

    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            let _ = writeln!(err, "{}", e);
            e.exit_code()
        }
    }
}

/// Entry point for the setpcg binary.
pub fn run_cli() -> i32 {
    env_logger::init();

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    run(
        &args,
        Path::new(DEFAULT_CONFIG_FILE),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
}
