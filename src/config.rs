use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::formatter::CommandFormatter;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Formatter program and its arguments, e.g. `["rustfmt", "--emit", "stdout"]`
    #[serde(default)]
    pub command: Option<Vec<String>>,
    #[serde(default)]
    pub normalize_line_endings: Option<bool>,
}

impl Config {
    pub fn formatter(&self) -> Option<CommandFormatter> {
        self.command
            .as_ref()
            .and_then(|argv| CommandFormatter::from_argv(argv.iter()))
    }
}

const CANDIDATE_NAMES: &[&str] = &[".fmtcheck.toml", "fmtcheck.toml"];

fn parse_config_str(s: &str, path: &Path) -> io::Result<Config> {
    toml::from_str::<Config>(s).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid config {}: {e}", path.display()),
        )
    })
}

fn read_config(path: &Path) -> io::Result<Config> {
    let s = fs::read_to_string(path)?;
    parse_config_str(&s, path)
}

fn find_in_tree(start_dir: &Path) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        for name in CANDIDATE_NAMES {
            let p = dir.join(name);
            if p.is_file() {
                return Some(p);
            }
        }
    }
    None
}

fn xdg_candidates(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(xdg) = xdg_config_home {
        candidates.push(Path::new(&xdg).join("fmtcheck").join("config.toml"));
    }
    if let Some(home) = home {
        candidates.push(
            Path::new(&home)
                .join(".config")
                .join("fmtcheck")
                .join("config.toml"),
        );
    }
    candidates
}

fn xdg_config_path() -> Option<PathBuf> {
    xdg_candidates(env::var_os("XDG_CONFIG_HOME"), env::var_os("HOME"))
        .into_iter()
        .find(|p| p.is_file())
}

/// Load configuration with precedence:
/// 1) explicit path (error if unreadable/invalid)
/// 2) walk up from start_dir: .fmtcheck.toml, fmtcheck.toml
/// 3) XDG: $XDG_CONFIG_HOME/fmtcheck/config.toml or ~/.config/fmtcheck/config.toml
/// 4) default config
pub fn load(explicit: Option<&Path>, start_dir: &Path) -> io::Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let cfg = read_config(path)?;
        return Ok((cfg, Some(path.to_path_buf())));
    }

    if let Some(p) = find_in_tree(start_dir) {
        match read_config(&p) {
            Ok(cfg) => return Ok((cfg, Some(p))),
            Err(e) => log::warn!("Ignoring {}: {e}", p.display()),
        }
    }

    if let Some(p) = xdg_config_path() {
        match read_config(&p) {
            Ok(cfg) => return Ok((cfg, Some(p))),
            Err(e) => log::warn!("Ignoring {}: {e}", p.display()),
        }
    }

    Ok((Config::default(), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_and_normalization() {
        let cfg = parse_config_str(
            "command = [\"rustfmt\", \"--emit\", \"stdout\"]\nnormalize-line-endings = true\n",
            Path::new("fmtcheck.toml"),
        )
        .unwrap();
        assert_eq!(
            cfg.command.as_deref(),
            Some(&["rustfmt".to_string(), "--emit".into(), "stdout".into()][..])
        );
        assert_eq!(cfg.normalize_line_endings, Some(true));
        assert!(cfg.formatter().is_some());
    }

    #[test]
    fn empty_config_is_default() {
        let cfg = parse_config_str("", Path::new("fmtcheck.toml")).unwrap();
        assert!(cfg.command.is_none());
        assert!(cfg.formatter().is_none());
    }

    #[test]
    fn empty_command_has_no_formatter() {
        let cfg = parse_config_str("command = []\n", Path::new("fmtcheck.toml")).unwrap();
        assert!(cfg.formatter().is_none());
    }

    #[test]
    fn invalid_config_names_the_file() {
        let err = parse_config_str("command = 3\n", Path::new("bad.toml")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn home_config_is_checked_after_xdg() {
        let candidates = xdg_candidates(Some("/xdg".into()), Some("/home/me".into()));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/xdg/fmtcheck/config.toml"),
                PathBuf::from("/home/me/.config/fmtcheck/config.toml"),
            ]
        );

        let candidates = xdg_candidates(None, Some("/home/me".into()));
        assert_eq!(
            candidates,
            vec![PathBuf::from("/home/me/.config/fmtcheck/config.toml")]
        );
        assert!(xdg_candidates(None, None).is_empty());
    }
}
