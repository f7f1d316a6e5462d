//! Runtime configuration for the command-line tool.
//!
//! A JSON file may provide reconstruction parameters, export options and
//! output paths; command-line flags override the paths.
//!
//! ```text
//! photometric-stereo [-o OUT.ply] [-s DEBUG_DIR] [-c CONFIG.json] [-j REPORT.json] <INPUT_DIR>
//! ```

use crate::error::{Error, Result};
use crate::export::PlyOptions;
use crate::params::ReconstructionParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT: &str = "result.ply";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub ply: PathBuf,
    /// Directory receiving albedo/normal/depth/curl PNGs.
    pub debug_dir: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            ply: PathBuf::from(DEFAULT_OUTPUT),
            debug_dir: None,
            report_json: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub input_dir: Option<PathBuf>,
    pub output: OutputConfig,
    pub params: ReconstructionParams,
    pub ply: PlyOptions,
}

impl RuntimeConfig {
    /// Dataset directory, required either in the file or on the command line.
    pub fn input_dir(&self) -> Result<&Path> {
        self.input_dir
            .as_deref()
            .ok_or_else(|| Error::Config(format!("input directory not specified\n{}", usage())))
    }
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let data = fs::read_to_string(path).map_err(|e| Error::DataUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&data)
        .map_err(|e| Error::Config(format!("failed to parse config {}: {e}", path.display())))
}

pub fn usage() -> String {
    "Usage: photometric-stereo [-o OUT.ply] [-s DEBUG_DIR] [-c CONFIG.json] [-j REPORT.json] <INPUT_DIR>"
        .to_string()
}

/// Parse command-line arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<RuntimeConfig>
where
    I: IntoIterator<Item = String>,
{
    let mut output = None;
    let mut debug_dir = None;
    let mut report = None;
    let mut config_path = None;
    let mut input = None;

    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| {
            it.next()
                .map(PathBuf::from)
                .ok_or_else(|| Error::Config(format!("{flag} expects a value\n{}", usage())))
        };
        match arg.as_str() {
            "-o" | "--output" => output = Some(value("-o")?),
            "-s" | "--debug-dir" => debug_dir = Some(value("-s")?),
            "-j" | "--report" => report = Some(value("-j")?),
            "-c" | "--config" => config_path = Some(value("-c")?),
            "-h" | "--help" => return Err(Error::Config(usage())),
            flag if flag.starts_with('-') => {
                return Err(Error::Config(format!("unknown option {flag}\n{}", usage())))
            }
            _ if input.is_some() => {
                return Err(Error::Config(format!("unexpected argument {arg}\n{}", usage())))
            }
            _ => input = Some(PathBuf::from(&arg)),
        }
    }

    let mut config = match config_path {
        Some(path) => load_config(&path)?,
        None => RuntimeConfig::default(),
    };
    if input.is_some() {
        config.input_dir = input;
    }
    if let Some(path) = output {
        config.output.ply = path;
    }
    if debug_dir.is_some() {
        config.output.debug_dir = debug_dir;
    }
    if report.is_some() {
        config.output.report_json = report;
    }
    config.input_dir()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_result_ply() {
        let cfg = parse_args(args(&["data/cat"])).unwrap();
        assert_eq!(cfg.input_dir().unwrap(), Path::new("data/cat"));
        assert_eq!(cfg.output.ply, PathBuf::from(DEFAULT_OUTPUT));
        assert!(cfg.output.debug_dir.is_none());
    }

    #[test]
    fn flags_override_outputs() {
        let cfg = parse_args(args(&["-o", "out/cat.ply", "-s", "dbg", "data/cat", "-j", "r.json"]))
            .unwrap();
        assert_eq!(cfg.output.ply, PathBuf::from("out/cat.ply"));
        assert_eq!(cfg.output.debug_dir, Some(PathBuf::from("dbg")));
        assert_eq!(cfg.output.report_json, Some(PathBuf::from("r.json")));
    }

    #[test]
    fn missing_input_and_dangling_flag_are_errors() {
        assert!(matches!(parse_args(args(&[])), Err(Error::Config(_))));
        assert!(matches!(parse_args(args(&["data", "-o"])), Err(Error::Config(_))));
        assert!(matches!(parse_args(args(&["-x", "data"])), Err(Error::Config(_))));
    }

    #[test]
    fn config_json_deserializes_nested_sections() {
        let json = r#"{
            "input_dir": "data/owl",
            "output": { "debug_dir": "dbg" },
            "params": { "normalize_directions": true, "depth": { "integration": "row_then_column" } },
            "ply": { "skip_degenerate": true }
        }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert!(cfg.params.normalize_directions);
        assert!(cfg.ply.skip_degenerate);
        assert_eq!(cfg.output.ply, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(
            cfg.params.depth.integration,
            crate::params::IntegrationScheme::RowThenColumn
        );
    }
}
