use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::model::mesh::MeshData;
use crate::model::parameter::{ParamScalar, ParamType, ParamValue};

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    pub host: HostSection,
    pub plugin: PluginConfig,
    pub log: LogConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub frames: Vec<FrameConfig>,
}

/// Identity the host advertises through its property set.
#[derive(Debug, Clone, Deserialize)]
pub struct HostSection {
    pub name: String,
    pub label: String,
    pub version: [i32; 3],
    pub version_label: String,
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            name: "mfx-host".to_string(),
            label: "MFX Host".to_string(),
            version: [0, 1, 0],
            version_label: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    pub library: String,
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub filter: String,
}

/// Mesh fed to the main input.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub points: Vec<[f32; 3]>,
    pub corners: Vec<i32>,
    pub faces: Vec<i32>,
}

impl Default for InputConfig {
    fn default() -> Self {
        let quad = MeshData::quad();
        Self {
            points: quad.positions,
            corners: quad.corner_points,
            faces: quad.face_sizes,
        }
    }
}

impl InputConfig {
    pub fn mesh_data(&self) -> MeshData {
        MeshData {
            positions: self.points.clone(),
            corner_points: self.corners.clone(),
            face_sizes: self.faces.clone(),
            attributes: Vec::new(),
        }
    }
}

/// Parameter edits applied before one cook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameConfig {
    #[serde(default)]
    pub params: BTreeMap<String, ParamEdit>,
}

/// A parameter value as written in TOML. Converted against the declared type
/// of the parameter it targets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamEdit {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<f64>),
}

impl ParamEdit {
    pub fn to_value(&self, ty: ParamType) -> crate::Result<ParamValue> {
        let (scalar, count) = ty.layout();
        let mismatch = || {
            Error::InvalidValue(format!(
                "{self:?} cannot be used for a {} parameter",
                ty.short_name()
            ))
        };
        let int = |v: f64| -> crate::Result<i32> {
            if v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) {
                Ok(v as i32)
            } else {
                Err(mismatch())
            }
        };

        match (self, scalar) {
            (ParamEdit::Bool(b), ParamScalar::Boolean) => Ok(ParamValue::Boolean(*b)),
            (ParamEdit::Int(n), ParamScalar::Boolean) => Ok(ParamValue::Boolean(*n != 0)),
            (ParamEdit::Int(n), ParamScalar::Int) if count == 1 => {
                let n = i32::try_from(*n).map_err(|_| mismatch())?;
                Ok(ParamValue::ints(&[n]))
            }
            (ParamEdit::Int(n), ParamScalar::Double) if count == 1 => {
                Ok(ParamValue::doubles(&[*n as f64]))
            }
            (ParamEdit::Float(x), ParamScalar::Double) if count == 1 => {
                Ok(ParamValue::doubles(&[*x]))
            }
            (ParamEdit::Text(s), ParamScalar::String) => ParamValue::text(s),
            (ParamEdit::List(values), ParamScalar::Double) if values.len() == count => {
                Ok(ParamValue::doubles(values))
            }
            (ParamEdit::List(values), ParamScalar::Int) if values.len() == count => {
                let values = values
                    .iter()
                    .map(|&v| int(v))
                    .collect::<crate::Result<Vec<i32>>>()?;
                Ok(ParamValue::ints(&values))
            }
            _ => Err(mismatch()),
        }
    }
}

impl HostConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let user_path = directories::ProjectDirs::from("", "", "mfxhost")
            .map(|d| d.config_dir().join("config.toml"))
            .filter(|path| path.exists());
        match user_path {
            Some(path) => Self::load_from(&path),
            None => Self::defaults(),
        }
    }

    pub fn defaults() -> Result<Self> {
        let defaults = include_str!("../../config/default.toml");
        Self::parse(defaults)
    }

    /// Load a full configuration file. It replaces the defaults entirely.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let mut config: HostConfig = toml::from_str(text)?;

        // Expand ~ in the library path
        if config.plugin.library.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            config.plugin.library = config
                .plugin
                .library
                .replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(config)
    }

    pub fn library_path(&self) -> PathBuf {
        PathBuf::from(&self.plugin.library)
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
