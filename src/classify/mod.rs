use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::featmat::{Dataset, FeatureMatrix, ONE_CLASS};
use crate::file_io;
use crate::load_config::load_config;

pub const DATA_F: &str = "data.mat";
pub const TARGET_F: &str = "target.txt";
pub const TARGET_NAMES_F: &str = "target_names.txt";
pub const SAMPLE_NAMES_F: &str = "sample_names.txt";
pub const FEATURE_NAMES_F: &str = "feature_names.txt";
pub const TTEST_F: &str = "ttest.txt";
pub const RESULT_F: &str = "result.json";

#[derive(Serialize, Debug)]
pub struct ClassCount {
  pub name: String,
  pub count: usize,
}

#[derive(Serialize, Debug)]
pub struct RunSummary {
  pub fm_dir: String,
  pub labeling: String,
  pub standardized: bool,
  pub n_samples: usize,
  pub n_features: usize,
  pub classes: Vec<ClassCount>,
  pub created: String,
}

/// Loads the feature matrix in `fm_dir` and writes the dataset selected by
/// `<cl_dir>/settings.json` into `cl_dir`.
pub fn classify(fm_dir: &str, cl_dir: &str) -> Result<()> {
  let fm_path = Path::new(fm_dir);
  if !fm_path.is_dir() {
    return Err(Error::NotADirectory(fm_path.to_path_buf()));
  }

  log::info!("loading feature matrix from {}", fm_dir);
  let fm = FeatureMatrix::load(fm_path)?;
  if fm.object_ids().is_empty() || fm.feature_ids().is_empty() {
    return Err(Error::EmptyFeatureMatrix(fm_path.to_path_buf()));
  }
  log::debug!(
    "{} objects, {} features, labelings {:?}",
    fm.object_ids().len(),
    fm.feature_ids().len(),
    fm.labeling_names()
  );

  let cl_path = Path::new(cl_dir);
  fs::create_dir_all(cl_path).map_err(|e| Error::io(cl_path, e))?;
  let settings = load_config(cl_path)?;
  let labeling = settings.labeling.as_deref().unwrap_or(ONE_CLASS);

  let dataset = fm.dataset(
    settings.feature_ids.as_deref(),
    Some(labeling),
    settings.class_ids.as_deref(),
    settings.standardized,
  )?;
  log::info!(
    "writing {}x{} dataset ({} classes) to {}",
    dataset.matrix.nrows(),
    dataset.matrix.ncols(),
    dataset.target_names.len(),
    cl_dir
  );
  write_dataset(cl_path, &dataset)?;

  if let [class0, class1, ..] = dataset.target_names.as_slice() {
    log::info!("t-test {} vs {}", class0, class1);
    match fm.ttest(labeling, class0, class1, None) {
      Ok(ts) => {
        let lines = dataset
          .feature_names
          .iter()
          .filter_map(|f| {
            let i = fm.feature_ids().iter().position(|id| id == f)?;
            Some(format!("{}\t{}\t{}", f, ts[i].t, ts[i].p))
          })
          .collect::<Vec<String>>();
        file_io::write_names(&cl_path.join(TTEST_F), &lines)?;
      }
      Err(Error::EmptyClass { class, .. }) => {
        log::warn!("skipping t-test, class {} has no objects", class);
      }
      Err(e) => return Err(e),
    }
  }

  let summary = summarize(fm_dir, labeling, settings.standardized, &dataset);
  let result_f = cl_path.join(RESULT_F);
  let json = serde_json::to_string_pretty(&summary).map_err(Error::Summary)?;
  fs::write(&result_f, json).map_err(|e| Error::io(&result_f, e))?;

  log::info!("classification of {} done", fm_dir);
  Ok(())
}

fn write_dataset(cl_path: &Path, dataset: &Dataset) -> Result<()> {
  let target = dataset.target.iter().map(|t| t.to_string()).collect::<Vec<String>>();

  file_io::write_matrix(&cl_path.join(DATA_F), &dataset.matrix)?;
  file_io::write_ids(&cl_path.join(TARGET_F), &target)?;
  file_io::write_names(&cl_path.join(TARGET_NAMES_F), &dataset.target_names)?;
  file_io::write_ids(&cl_path.join(SAMPLE_NAMES_F), &dataset.sample_names)?;
  file_io::write_ids(&cl_path.join(FEATURE_NAMES_F), &dataset.feature_names)?;
  Ok(())
}

fn summarize(fm_dir: &str, labeling: &str, standardized: bool, dataset: &Dataset) -> RunSummary {
  let classes = dataset
    .target_names
    .iter()
    .enumerate()
    .map(|(i, name)| ClassCount {
      name: name.clone(),
      count: dataset.target.iter().filter(|&&t| t == i).count(),
    })
    .collect();

  RunSummary {
    fm_dir: fm_dir.to_string(),
    labeling: labeling.to_string(),
    standardized,
    n_samples: dataset.matrix.nrows(),
    n_features: dataset.matrix.ncols(),
    classes,
    created: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
  }
}
