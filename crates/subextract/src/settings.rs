use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use directories::ProjectDirs;
use serde::Deserialize;
use subextract_types::CropBand;

use crate::cli::{CliArgs, CliSources, OcrBackend};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    backend: Option<String>,
    output: Option<String>,
    interval: Option<f64>,
    crop_top: Option<u32>,
    crop_bottom: Option<u32>,
    ocr_backend: Option<String>,
    ocr_languages: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct EffectiveSettings {
    pub backend: Option<String>,
    pub output: PathBuf,
    pub interval: f64,
    /// Explicit crop band; `None` means "derive from the frame height".
    pub crop: Option<CropBand>,
    pub ocr: OcrSettings,
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub backend: OcrBackend,
    pub languages: Vec<String>,
}

const DEFAULT_OCR_LANGUAGE: &str = "eng";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        path: Option<PathBuf>,
        field: &'static str,
        value: String,
    },
    NotFound {
        path: PathBuf,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "failed to parse config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidValue { path, field, value } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "invalid value '{}' for '{}' in {}",
                        value,
                        field,
                        path.display()
                    )
                } else {
                    write!(f, "invalid value '{}' for '{}'", value, field)
                }
            }
            ConfigError::NotFound { path } => {
                write!(f, "config file {} does not exist", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
            ConfigError::NotFound { .. } => None,
        }
    }
}

pub fn resolve_settings(
    cli: &CliArgs,
    sources: &CliSources,
) -> Result<EffectiveSettings, ConfigError> {
    let (file, config_path) = load_config(cli.config.as_deref())?;
    merge(cli, sources, file, config_path)
}

fn load_config(path_override: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = path_override {
        let path = path.to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        let config = read_config(&path)?;
        return Ok((config, Some(path)));
    }

    if let Some(project_path) = project_config_path()
        && project_path.exists()
    {
        let config = read_config(&project_path)?;
        return Ok((config, Some(project_path)));
    }

    let Some(default_path) = default_config_path() else {
        return Ok((FileConfig::default(), None));
    };
    if !default_path.exists() {
        return Ok((FileConfig::default(), None));
    }
    let config = read_config(&default_path)?;
    Ok((config, Some(default_path)))
}

fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn merge(
    cli: &CliArgs,
    sources: &CliSources,
    file: FileConfig,
    config_path: Option<PathBuf>,
) -> Result<EffectiveSettings, ConfigError> {
    let FileConfig {
        backend: file_backend,
        output: file_output,
        interval: file_interval,
        crop_top: file_crop_top,
        crop_bottom: file_crop_bottom,
        ocr_backend: file_ocr_backend,
        ocr_languages: file_ocr_languages,
    } = file;

    let mut backend = normalize_string(cli.backend.clone());
    if backend.is_none() {
        backend = normalize_string(file_backend);
    }

    let mut output = cli.output.clone();
    if !sources.output_from_cli
        && let Some(path) = normalize_string(file_output)
    {
        output = PathBuf::from(path);
    }

    let mut interval = cli.interval;
    if !sources.interval_from_cli
        && let Some(value) = file_interval
    {
        interval = value;
    }
    if !interval.is_finite() || interval <= 0.0 {
        return Err(ConfigError::InvalidValue {
            path: config_path,
            field: "interval",
            value: interval.to_string(),
        });
    }

    let mut crop_top = cli.crop_top;
    if !sources.crop_top_from_cli
        && let Some(value) = file_crop_top
    {
        crop_top = Some(value);
    }
    let mut crop_bottom = cli.crop_bottom;
    if !sources.crop_bottom_from_cli
        && let Some(value) = file_crop_bottom
    {
        crop_bottom = Some(value);
    }
    let crop = match (crop_top, crop_bottom) {
        (None, None) => None,
        (Some(top), Some(bottom)) => {
            Some(CropBand::new(top, bottom).map_err(|_| ConfigError::InvalidValue {
                path: config_path.clone(),
                field: "crop_top/crop_bottom",
                value: format!("{top}..{bottom}"),
            })?)
        }
        (top, bottom) => {
            return Err(ConfigError::InvalidValue {
                path: config_path,
                field: "crop_top/crop_bottom",
                value: format!("{:?}..{:?}", top, bottom),
            });
        }
    };

    let mut ocr_backend = cli.ocr_backend;
    if !sources.ocr_backend_from_cli
        && let Some(value) = normalize_string(file_ocr_backend)
    {
        ocr_backend = parse_ocr_backend(&value, config_path.as_ref())?;
    }

    let mut languages: Vec<String> = cli
        .ocr_languages
        .iter()
        .filter_map(|lang| normalize_string(Some(lang.clone())))
        .collect();
    if languages.is_empty()
        && let Some(file_languages) = file_ocr_languages
    {
        languages = file_languages
            .into_iter()
            .filter_map(|lang| normalize_string(Some(lang)))
            .collect();
    }
    if languages.is_empty() {
        languages.push(DEFAULT_OCR_LANGUAGE.to_string());
    }

    Ok(EffectiveSettings {
        backend,
        output,
        interval,
        crop,
        ocr: OcrSettings {
            backend: ocr_backend,
            languages,
        },
    })
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("rs", "subextract", "subextract")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    env::current_dir().ok().map(|dir| dir.join("config.toml"))
}

fn normalize_string(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_ocr_backend(value: &str, path: Option<&PathBuf>) -> Result<OcrBackend, ConfigError> {
    OcrBackend::from_str(value, false).map_err(|_| ConfigError::InvalidValue {
        path: path.cloned(),
        field: "ocr_backend",
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> CliArgs {
        let mut full = vec!["subextract"];
        full.extend_from_slice(args);
        CliArgs::parse_from(full)
    }

    #[test]
    fn file_values_apply_when_cli_uses_defaults() {
        let file = FileConfig {
            interval: Some(2.5),
            output: Some("from-config.srt".into()),
            ocr_backend: Some("noop".into()),
            ..Default::default()
        };
        let settings = merge(&cli(&[]), &CliSources::default(), file, None).unwrap();
        assert_eq!(settings.interval, 2.5);
        assert_eq!(settings.output, PathBuf::from("from-config.srt"));
        assert_eq!(settings.ocr.backend, OcrBackend::Noop);
        assert_eq!(settings.ocr.languages, vec!["eng".to_string()]);
    }

    #[test]
    fn cli_values_win_over_file_values() {
        let file = FileConfig {
            interval: Some(2.5),
            ..Default::default()
        };
        let sources = CliSources {
            interval_from_cli: true,
            ..Default::default()
        };
        let settings = merge(&cli(&["--interval", "0.5"]), &sources, file, None).unwrap();
        assert_eq!(settings.interval, 0.5);
    }

    #[test]
    fn non_positive_interval_is_rejected() {
        let file = FileConfig {
            interval: Some(0.0),
            ..Default::default()
        };
        let err = merge(&cli(&[]), &CliSources::default(), file, None).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "interval",
                ..
            }
        ));
    }

    #[test]
    fn crop_bounds_must_come_in_pairs_and_be_ordered() {
        let file = FileConfig {
            crop_top: Some(100),
            ..Default::default()
        };
        assert!(merge(&cli(&[]), &CliSources::default(), file, None).is_err());

        let file = FileConfig {
            crop_top: Some(200),
            crop_bottom: Some(100),
            ..Default::default()
        };
        assert!(merge(&cli(&[]), &CliSources::default(), file, None).is_err());

        let file = FileConfig {
            crop_top: Some(100),
            crop_bottom: Some(200),
            ..Default::default()
        };
        let settings = merge(&cli(&[]), &CliSources::default(), file, None).unwrap();
        let crop = settings.crop.unwrap();
        assert_eq!(crop.top(), 100);
        assert_eq!(crop.bottom(), 200);
    }
}
