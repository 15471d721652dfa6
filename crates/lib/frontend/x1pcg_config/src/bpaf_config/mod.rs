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

    bpaf_config::mod.rs

    Command line arguments for setpcg.

*/

use std::path::PathBuf;

use bpaf::{Args, Bpaf, ParseFailure, Parser};
use x1pcg_core::PreviewMode;

// CP/M upper-cases the command line, so both cases of each flag are accepted.
fn preview_arg() -> impl Parser<Option<PreviewMode>> {
    let normal = bpaf::short('v')
        .short('V')
        .help("Preview all characters.")
        .req_flag(PreviewMode::Normal);
    let wide = bpaf::short('w')
        .short('W')
        .help("Preview all characters. (wide mode)")
        .req_flag(PreviewMode::Wide);
    bpaf::construct!([normal, wide]).optional()
}

/// Set PCG data from a file.
#[derive(Debug, Default, Bpaf)]
#[bpaf(options, generate(cli_args))]
pub struct CmdLineArgs {
    #[bpaf(external(preview_arg))]
    pub preview: Option<PreviewMode>,

    /// Configuration file to read instead of x1pcg.toml
    #[bpaf(long("config"), long("config_file"), argument("CONFIG"))]
    pub config_file: Option<PathBuf>,

    /// CPU cycles budgeted per transferred line
    #[bpaf(long("line-cycles"), long("line_cycles"), argument("N"))]
    pub line_cycles: Option<u32>,

    /// Write the resulting PCG RAM to a file
    #[bpaf(long("dump-pcg"), long("dump_pcg"), argument("OUT"))]
    pub dump_pcg: Option<PathBuf>,

    /// Save the final screen as PNG
    #[bpaf(long, argument("PNG"))]
    pub screenshot: Option<PathBuf>,

    /// PCG data, 6144 bytes
    #[bpaf(positional("FILE"))]
    pub file: Option<PathBuf>,
}

impl CmdLineArgs {
    /// True if there is a file to load or a preview to draw.
    pub fn has_work(&self) -> bool {
        self.file.is_some() || self.preview.is_some()
    }
}

/// Why the command line was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgParseFailure {
    /// Help was requested. The text belongs on stdout.
    Help(String),
    /// The arguments are malformed or ask for nothing.
    Invalid(String),
}

/// Parse `args`, not including the program name.
pub fn parse_args(args: &[&str]) -> Result<CmdLineArgs, ArgParseFailure> {
    match cli_args().run_inner(Args::from(args)) {
        Ok(parsed) if !parsed.has_work() => Err(ArgParseFailure::Invalid(
            "Expected a PCG file, -v or -w".to_string(),
        )),
        Ok(parsed) => Ok(parsed),
        Err(ParseFailure::Stdout(text)) => Err(ArgParseFailure::Help(text)),
        Err(ParseFailure::Stderr(text)) => Err(ArgParseFailure::Invalid(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(args: &[&str]) -> bool {
        matches!(parse_args(args), Err(ArgParseFailure::Invalid(_)))
    }

    #[test]
    fn preview_flags_in_either_case() {
        assert_eq!(parse_args(&["-v"]).unwrap().preview, Some(PreviewMode::Normal));
        assert_eq!(parse_args(&["-V"]).unwrap().preview, Some(PreviewMode::Normal));
        assert_eq!(parse_args(&["-w"]).unwrap().preview, Some(PreviewMode::Wide));
        assert_eq!(parse_args(&["-W"]).unwrap().preview, Some(PreviewMode::Wide));
    }

    #[test]
    fn file_with_preview() {
        let args = parse_args(&["-w", "FONT.PCG"]).unwrap();
        assert_eq!(args.preview, Some(PreviewMode::Wide));
        assert_eq!(args.file, Some(PathBuf::from("FONT.PCG")));
    }

    #[test]
    fn file_alone() {
        let args = parse_args(&["FONT.PCG"]).unwrap();
        assert_eq!(args.preview, None);
        assert_eq!(args.file, Some(PathBuf::from("FONT.PCG")));
    }

    #[test]
    fn usage_errors() {
        assert!(invalid(&[]));
        assert!(invalid(&["-v", "-w"]));
        assert!(invalid(&["a.pcg", "b.pcg"]));
        assert!(invalid(&["-x", "a.pcg"]));
    }

    #[test]
    fn long_options() {
        let args = parse_args(&["--line-cycles", "264", "--dump-pcg", "out.bin", "--screenshot", "s.png", "f"]).unwrap();
        assert_eq!(args.line_cycles, Some(264));
        assert_eq!(args.dump_pcg, Some(PathBuf::from("out.bin")));
        assert_eq!(args.screenshot, Some(PathBuf::from("s.png")));
        assert!(invalid(&["--line-cycles", "many", "f"]));
    }

    #[test]
    fn help_goes_to_stdout() {
        assert!(matches!(parse_args(&["--help"]), Err(ArgParseFailure::Help(_))));
    }
}
