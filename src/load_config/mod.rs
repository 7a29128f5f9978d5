use std::fs;
use std::path::Path;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const SETTINGS_F: &str = "settings.json";

/// Dataset selection read from `settings.json` in the classification dir.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifySettings {
  pub labeling: Option<String>,
  pub class_ids: Option<Vec<String>>,
  pub feature_ids: Option<Vec<String>>,
  pub standardized: bool,
}

impl Default for ClassifySettings {
  fn default() -> Self {
    ClassifySettings {
      labeling: None,
      class_ids: None,
      feature_ids: None,
      standardized: true,
    }
  }
}

/// Reads `<cl_dir>/settings.json`, falling back to defaults when absent.
pub fn load_config(cl_dir: &Path) -> Result<ClassifySettings> {
  let path = cl_dir.join(SETTINGS_F);
  if !path.exists() {
    log::debug!("load_config: no {}, using defaults", path.display());
    return Ok(ClassifySettings::default());
  }

  log::debug!("load_config: {}", path.display());
  let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
  serde_json::from_str(&content).map_err(|source| Error::Settings { path, source })
}
