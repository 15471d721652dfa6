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

    x1pcg_config::lib.rs

    Configuration file and command line handling for the x1pcg front ends.

*/

//! The `x1pcg_config` crate reads the optional `x1pcg.toml` configuration file and overlays the
//! command line on top of it. Command line arguments always take priority over the file.

mod bpaf_config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde_derive::Deserialize;

use x1pcg_core::{
    crtc::{DEFAULT_ROWS, DEFINITION_ROWS},
    devices::x1::X1Video,
    display::DisplayConfig,
    selector::ReservedRegion,
    timing::{LineTiming, DEFAULT_LINE_CYCLES},
};

pub use bpaf_config::{cli_args, parse_args, ArgParseFailure, CmdLineArgs};

pub const DEFAULT_CONFIG_FILE: &str = "x1pcg.toml";

/// Rows of 80 columns that fit in text VRAM.
const MAX_ROWS: u8 = 25;
/// Smallest line budget that still leaves time for the three plane writes and loop overhead.
const MIN_LINE_CYCLES: u32 = 96;

const fn _default_line_cycles() -> u32 {
    DEFAULT_LINE_CYCLES
}
const fn _default_rows() -> u8 {
    DEFAULT_ROWS
}
const fn _default_definition_rows() -> u8 {
    DEFINITION_ROWS
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct Timing {
    #[serde(default = "_default_line_cycles")]
    pub line_cycles: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            line_cycles: DEFAULT_LINE_CYCLES,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct Display {
    #[serde(default = "_default_rows")]
    pub rows: u8,
    #[serde(default = "_default_definition_rows")]
    pub definition_rows: u8,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            definition_rows: DEFINITION_ROWS,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct Emulator {
    #[serde(default = "_default_line_cycles")]
    pub raster_cycles: u32,
    pub dump_pcg: Option<PathBuf>,
    pub screenshot: Option<PathBuf>,
}

impl Default for Emulator {
    fn default() -> Self {
        Self {
            raster_cycles: DEFAULT_LINE_CYCLES,
            dump_pcg: None,
            screenshot: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ConfigFileParams {
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub emulator: Emulator,
}

impl ConfigFileParams {
    pub fn overlay(&mut self, shell_args: &CmdLineArgs) {
        if let Some(line_cycles) = shell_args.line_cycles {
            self.timing.line_cycles = line_cycles;
        }
        if let Some(dump_pcg) = &shell_args.dump_pcg {
            self.emulator.dump_pcg = Some(dump_pcg.clone());
        }
        if let Some(screenshot) = &shell_args.screenshot {
            self.emulator.screenshot = Some(screenshot.clone());
        }
    }

    /// Reject settings the definition run cannot work with.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.display.rows == 0 || self.display.rows > MAX_ROWS {
            bail!("display.rows must be between 1 and {}, got {}", MAX_ROWS, self.display.rows);
        }
        if ReservedRegion::below(self.display.definition_rows).is_none() {
            bail!(
                "display.definition_rows = {} leaves no room for the 8 reserved rows",
                self.display.definition_rows
            );
        }
        if self.timing.line_cycles < MIN_LINE_CYCLES {
            bail!(
                "timing.line_cycles must be at least {}, got {}",
                MIN_LINE_CYCLES,
                self.timing.line_cycles
            );
        }
        if self.emulator.raster_cycles == 0 {
            bail!("emulator.raster_cycles must not be zero");
        }
        Ok(())
    }

    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            rows: self.display.rows,
            definition_rows: self.display.definition_rows,
            timing: LineTiming::calibrate(self.timing.line_cycles),
        }
    }

    /// An emulated adapter timed to match this configuration.
    pub fn make_video(&self) -> X1Video {
        X1Video::new(self.emulator.raster_cycles)
    }
}

/// Parse a TOML configuration and overlay command line arguments.
pub fn read_config(toml_string: impl AsRef<str>, shell_args: &CmdLineArgs) -> Result<ConfigFileParams, anyhow::Error> {
    let mut toml_args: ConfigFileParams = toml::from_str(toml_string.as_ref())?;

    log::debug!("toml_config: {:?}", toml_args);

    // Command line arguments override config file arguments
    toml_args.overlay(shell_args);
    toml_args.validate()?;
    Ok(toml_args)
}

/// Read the configuration from `--config` if given, otherwise from `default_path`. A missing
/// default file is not an error; built-in defaults are used instead. A missing `--config` file is.
pub fn read_config_file<P>(default_path: P, shell_args: &CmdLineArgs) -> Result<ConfigFileParams, anyhow::Error>
where
    P: AsRef<Path>,
{
    let toml_string = if let Some(configfile_path) = shell_args.config_file.as_ref() {
        std::fs::read_to_string(configfile_path)
            .with_context(|| format!("Couldn't read config file {}", configfile_path.display()))?
    }
    else {
        let default_path = default_path.as_ref();
        match std::fs::read_to_string(default_path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {} found, using defaults", default_path.display());
                String::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Couldn't read config file {}", default_path.display()));
            }
        }
    };

    read_config(toml_string, shell_args)
        .context("Invalid configuration")
}
