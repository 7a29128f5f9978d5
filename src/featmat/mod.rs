mod labeling;

pub use labeling::Labeling;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use ndarray::{concatenate, Array2, Axis};
use statrs::distribution::{ContinuousCDF, StudentsT};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::file_io;

pub const OBJECTS_F: &str = "object_ids.txt";
pub const FEATURE_MATRIX_F: &str = "feature_matrix.mat";
pub const FEATURES_F: &str = "feature_ids.txt";
pub const FEATURE_NAMES_F: &str = "feature_names.txt";
pub const LABELS_DIR: &str = "labels";

pub const ONE_CLASS: &str = "one_class";

const CUSTOM_FEAT_PRE: &str = "cus";
const CUSTOM_FEAT_NAME: &str = "Custom feature vector";

/// Standardized (or raw) selection of a feature matrix, ready to hand to a
/// learner. `target` holds class indices re-mapped to `0..target_names.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
  pub matrix: Array2<f64>,
  pub sample_names: Vec<String>,
  pub feature_names: Vec<String>,
  pub target: Vec<usize>,
  pub target_names: Vec<String>,
}

/// Outcome of a two-sample t-test on one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
  pub t: f64,
  /// two-sided
  pub p: f64,
}

/// Objects (rows) by features (columns), plus any number of labelings of
/// the objects.
#[derive(Debug, Default, Clone)]
pub struct FeatureMatrix {
  object_ids: Option<Vec<String>>,
  feature_ids: Vec<String>,
  feature_names: HashMap<String, String>,
  feature_matrix: Option<Array2<f64>>,
  labelings: BTreeMap<String, Labeling>,
}

impl FeatureMatrix {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn object_ids(&self) -> &[String] {
    self.object_ids.as_deref().unwrap_or(&[])
  }

  pub fn feature_ids(&self) -> &[String] {
    &self.feature_ids
  }

  pub fn feature_name(&self, feature_id: &str) -> Option<&str> {
    self.feature_names.get(feature_id).map(|n| n.as_str())
  }

  pub fn matrix(&self) -> Option<&Array2<f64>> {
    self.feature_matrix.as_ref()
  }

  pub fn labeling(&self, name: &str) -> Result<&Labeling> {
    self.labelings.get(name).ok_or_else(|| Error::UnknownLabeling(name.to_string()))
  }

  pub fn labeling_names(&self) -> Vec<&str> {
    self.labelings.keys().map(|k| k.as_str()).collect()
  }

  /// Sets the rows. Ids must be unique and can only be set once; a
  /// `one_class` labeling with every object in class `all` is added.
  pub fn set_object_ids(&mut self, object_ids: Vec<String>) -> Result<()> {
    if self.object_ids.is_some() {
      return Err(Error::ObjectIdsAlreadySet);
    }
    let mut seen = HashSet::new();
    for id in &object_ids {
      if !seen.insert(id) {
        return Err(Error::DuplicateObjectId(id.clone()));
      }
    }

    let label_map = object_ids.iter().map(|o| (o.clone(), 0)).collect::<HashMap<String, usize>>();
    self.object_ids = Some(object_ids);
    self.add_labels(ONE_CLASS, &label_map, vec!["all".to_string()])
  }

  pub fn load_object_ids(&mut self, path: &Path) -> Result<()> {
    let ids = file_io::read_ids(path)?;
    self.set_object_ids(ids)
  }

  pub fn load_labels(&mut self, name: &str, path: &Path) -> Result<()> {
    let labeling = Labeling::load(name, self.require_objects()?, path)?;
    self.add_labeling(labeling)
  }

  pub fn add_labels(
    &mut self,
    name: &str,
    label_map: &HashMap<String, usize>,
    class_names: Vec<String>,
  ) -> Result<()> {
    let labeling = Labeling::new(name, self.require_objects()?, label_map, class_names)?;
    self.add_labeling(labeling)
  }

  /// Adds (or replaces) a labeling. It must have been built for this
  /// matrix's objects.
  pub fn add_labeling(&mut self, labeling: Labeling) -> Result<()> {
    if labeling.object_ids() != self.require_objects()? {
      return Err(Error::LabelingMismatch(labeling.name().to_string()));
    }
    self.labelings.insert(labeling.name().to_string(), labeling);
    Ok(())
  }

  /// Appends feature columns. `feature_names` defaults to the ids.
  pub fn add_features(
    &mut self,
    feature_ids: Vec<String>,
    matrix: Array2<f64>,
    feature_names: Option<Vec<String>>,
  ) -> Result<()> {
    self.check_features(&feature_ids, &matrix)?;

    let names = feature_names.unwrap_or_default();
    for (i, id) in feature_ids.iter().enumerate() {
      let name = names.get(i).unwrap_or(id);
      self.feature_names.insert(id.clone(), name.clone());
    }

    self.feature_matrix = Some(match self.feature_matrix.take() {
      Some(current) if !self.feature_ids.is_empty() => {
        concatenate(Axis(1), &[current.view(), matrix.view()])?
      }
      _ => matrix,
    });
    self.feature_ids.extend(feature_ids);
    Ok(())
  }

  /// Adds an anonymous feature vector as `cus<k>_0 .. cus<k>_<n-1>` and
  /// returns the new feature ids.
  pub fn add_custom_features(&mut self, matrix: Array2<f64>) -> Result<Vec<String>> {
    let (num_obj, num_feat) = matrix.dim();
    let expected = self.require_objects()?.len();
    if num_obj != expected {
      return Err(Error::RowCountMismatch { expected, found: num_obj });
    }

    let next = self
      .custom_features()
      .keys()
      .filter_map(|pre| pre[CUSTOM_FEAT_PRE.len()..].parse::<usize>().ok())
      .max()
      .map_or(0, |k| k + 1);

    let featvec_id = format!("{}{}", CUSTOM_FEAT_PRE, next);
    let ids = (0..num_feat).map(|i| format!("{}_{}", featvec_id, i)).collect::<Vec<String>>();
    let names = (0..num_feat)
      .map(|i| format!("{} {} - {}", CUSTOM_FEAT_NAME, next, i))
      .collect::<Vec<String>>();

    self.add_features(ids.clone(), matrix, Some(names))?;
    Ok(ids)
  }

  /// Custom feature vector id (`cus0`, `cus1`, ..) to its feature ids.
  pub fn custom_features(&self) -> BTreeMap<String, Vec<String>> {
    let mut result: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for fid in &self.feature_ids {
      if fid.starts_with(CUSTOM_FEAT_PRE) {
        let pre = fid.split('_').next().unwrap_or(fid);
        result.entry(pre.to_string()).or_default().push(fid.clone());
      }
    }
    result
  }

  pub fn delete_feature_matrix(&mut self) {
    self.feature_matrix = None;
    self.feature_ids.clear();
    self.feature_names.clear();
  }

  pub fn slice(&self, feat_is: &[usize], object_is: &[usize]) -> Array2<f64> {
    match &self.feature_matrix {
      Some(m) => m.select(Axis(1), feat_is).select(Axis(0), object_is),
      None => Array2::zeros((object_is.len(), 0)),
    }
  }

  pub fn standardized(&self) -> Array2<f64> {
    match &self.feature_matrix {
      Some(m) => standardize(m),
      None => Array2::zeros((self.object_ids().len(), 0)),
    }
  }

  pub fn standardized_slice(&self, feat_is: &[usize], object_is: &[usize]) -> Array2<f64> {
    standardize(&self.slice(feat_is, object_is))
  }

  pub fn feature_indices(&self, feature_ids: &[String]) -> Result<Vec<usize>> {
    let mut indices = feature_ids
      .iter()
      .map(|f| {
        self
          .feature_ids
          .iter()
          .position(|id| id == f)
          .ok_or_else(|| Error::UnknownFeature(f.clone()))
      })
      .collect::<Result<Vec<usize>>>()?;
    indices.sort_unstable();
    Ok(indices)
  }

  pub fn object_indices(&self, labeling: &str, class_ids: &[String]) -> Result<Vec<usize>> {
    let labeling = self.labeling(labeling)?;
    let mut indices = Vec::new();
    for c in class_ids {
      indices.extend_from_slice(labeling.class_objects(c)?);
    }
    indices.sort_unstable();
    Ok(indices)
  }

  pub fn class_indices(&self, labeling: &str, class_ids: &[String]) -> Result<Vec<usize>> {
    let labeling = self.labeling(labeling)?;
    let mut indices = class_ids
      .iter()
      .map(|c| labeling.class_index(c))
      .collect::<Result<Vec<usize>>>()?;
    indices.sort_unstable();
    Ok(indices)
  }

  /// Extracts a dataset. Without a feature or class selection the whole
  /// matrix is used; otherwise the selected columns and the objects of the
  /// selected classes, standardized after slicing.
  pub fn dataset(
    &self,
    feat_ids: Option<&[String]>,
    labeling_name: Option<&str>,
    class_ids: Option<&[String]>,
    standardized: bool,
  ) -> Result<Dataset> {
    let labeling_name = labeling_name.unwrap_or(ONE_CLASS);
    let labeling = self.labeling(labeling_name)?;
    // an empty selection means all
    let feat_ids = feat_ids.filter(|f| !f.is_empty());
    let class_ids = class_ids.filter(|c| !c.is_empty());

    if feat_ids.is_none() && class_ids.is_none() {
      let matrix = if standardized {
        self.standardized()
      } else {
        self.slice(
          &(0..self.feature_ids.len()).collect::<Vec<usize>>(),
          &(0..self.object_ids().len()).collect::<Vec<usize>>(),
        )
      };
      return Ok(Dataset {
        matrix,
        sample_names: self.object_ids().to_vec(),
        feature_names: self.feature_ids.clone(),
        target: labeling.labels().to_vec(),
        target_names: labeling.class_names().to_vec(),
      });
    }

    let feat_ids = feat_ids.unwrap_or(&self.feature_ids);
    let class_ids = class_ids.unwrap_or(labeling.class_names());

    let feat_is = self.feature_indices(feat_ids)?;
    let object_is = self.object_indices(labeling_name, class_ids)?;
    let class_is = self.class_indices(labeling_name, class_ids)?;

    let matrix = if standardized {
      self.standardized_slice(&feat_is, &object_is)
    } else {
      self.slice(&feat_is, &object_is)
    };

    let target_map = class_is
      .iter()
      .enumerate()
      .map(|(new, &old)| (old, new))
      .collect::<HashMap<usize, usize>>();
    let target = object_is
      .iter()
      .map(|&i| target_map[&labeling.labels()[i]])
      .collect();

    Ok(Dataset {
      matrix,
      sample_names: object_is.iter().map(|&i| self.object_ids()[i].clone()).collect(),
      feature_names: feat_is.iter().map(|&i| self.feature_ids[i].clone()).collect(),
      target,
      target_names: class_is.iter().map(|&i| labeling.class_names()[i].clone()).collect(),
    })
  }

  /// Appends the features of `other`, which must describe the same objects
  /// in the same order.
  pub fn merge(&mut self, other: &FeatureMatrix) -> Result<()> {
    if self.object_ids != other.object_ids {
      return Err(Error::ObjectMismatch);
    }
    let matrix = match &other.feature_matrix {
      Some(m) if !other.feature_ids.is_empty() => m.clone(),
      _ => return Ok(()),
    };
    let names = other
      .feature_ids
      .iter()
      .map(|id| other.feature_names.get(id).unwrap_or(id).clone())
      .collect();
    self.add_features(other.feature_ids.clone(), matrix, Some(names))
  }

  /// Student's two-sample t-test (pooled variance) per feature, comparing
  /// the objects of `class0` with those of `class1`. Both classes need at
  /// least one object.
  pub fn ttest(
    &self,
    labeling_name: &str,
    class0: &str,
    class1: &str,
    object_is: Option<&[usize]>,
  ) -> Result<Vec<TTest>> {
    let matrix = match &self.feature_matrix {
      Some(m) if !self.feature_ids.is_empty() => m,
      _ => return Ok(Vec::new()),
    };
    let labeling = self.labeling(labeling_name)?;
    for class in [class0, class1] {
      labeling.class_index(class)?;
    }

    let per_class = labeling.obj_is_per_class(object_is);
    let class_objects = |class: &str| match per_class.get(class) {
      Some(indices) if !indices.is_empty() => Ok(indices),
      _ => Err(Error::EmptyClass { labeling: labeling_name.to_string(), class: class.to_string() }),
    };
    let lab0 = class_objects(class0)?;
    let lab1 = class_objects(class1)?;

    Ok(
      matrix
        .columns()
        .into_iter()
        .map(|col| {
          let a = lab0.iter().map(|&i| col[i]).collect::<Vec<f64>>();
          let b = lab1.iter().map(|&i| col[i]).collect::<Vec<f64>>();
          student_t(&a, &b)
        })
        .collect(),
    )
  }

  /// Pearson correlation between every pair of feature columns. Constant
  /// columns correlate as NaN.
  pub fn feature_correlation_matrix(&self) -> Array2<f64> {
    let matrix = match &self.feature_matrix {
      Some(m) if m.nrows() > 0 => m,
      _ => return Array2::zeros((self.feature_ids.len(), self.feature_ids.len())),
    };
    let mean = match matrix.mean_axis(Axis(0)) {
      Some(mean) => mean,
      None => return Array2::zeros((0, 0)),
    };
    let centered = matrix - &mean;
    let cov = centered.t().dot(&centered);
    let norm = cov.diag().mapv(f64::sqrt);
    let mut corr = cov;
    for ((i, j), v) in corr.indexed_iter_mut() {
      *v /= norm[i] * norm[j];
    }
    corr
  }

  pub fn load(root_dir: &Path) -> Result<Self> {
    let mut fm = FeatureMatrix::new();

    let objects_f = root_dir.join(OBJECTS_F);
    if objects_f.exists() {
      fm.load_object_ids(&objects_f)?;
    }

    let features_f = root_dir.join(FEATURES_F);
    let feature_ids = if features_f.exists() { file_io::read_ids(&features_f)? } else { Vec::new() };

    let names_f = root_dir.join(FEATURE_NAMES_F);
    let feature_names = if names_f.exists() { Some(file_io::read_names(&names_f)?) } else { None };

    let matrix_f = root_dir.join(FEATURE_MATRIX_F);
    if matrix_f.exists() && !feature_ids.is_empty() {
      let matrix = file_io::read_matrix(&matrix_f)?;
      log::debug!("loaded {:?} feature matrix from {}", matrix.dim(), matrix_f.display());
      fm.add_features(feature_ids, matrix, feature_names)?;
    }

    let labels_dir = root_dir.join(LABELS_DIR);
    if labels_dir.is_dir() {
      for entry in WalkDir::new(&labels_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::io(&labels_dir, e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "txt") {
          continue;
        }
        let name = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        fm.load_labels(&name, path)?;
      }
    }

    Ok(fm)
  }

  pub fn save(&self, root_dir: &Path) -> Result<()> {
    fs::create_dir_all(root_dir).map_err(|e| Error::io(root_dir, e))?;

    if let Some(ids) = &self.object_ids {
      file_io::write_ids(&root_dir.join(OBJECTS_F), ids)?;
    }

    let features_f = root_dir.join(FEATURES_F);
    let names_f = root_dir.join(FEATURE_NAMES_F);
    let matrix_f = root_dir.join(FEATURE_MATRIX_F);
    match &self.feature_matrix {
      Some(matrix) if !self.feature_ids.is_empty() => {
        let names = self
          .feature_ids
          .iter()
          .map(|id| self.feature_names.get(id).unwrap_or(id).clone())
          .collect::<Vec<String>>();
        file_io::write_ids(&features_f, &self.feature_ids)?;
        file_io::write_names(&names_f, &names)?;
        file_io::write_matrix(&matrix_f, matrix)?;
      }
      _ => {
        for stale in [&features_f, &names_f, &matrix_f] {
          if stale.exists() {
            fs::remove_file(stale).map_err(|e| Error::io(stale, e))?;
          }
        }
      }
    }

    if !self.labelings.is_empty() {
      let labels_dir = root_dir.join(LABELS_DIR);
      fs::create_dir_all(&labels_dir).map_err(|e| Error::io(&labels_dir, e))?;
      for (name, labeling) in &self.labelings {
        labeling.save(&labels_dir.join(format!("{}.txt", name)))?;
      }
    }

    Ok(())
  }

  fn require_objects(&self) -> Result<&[String]> {
    self.object_ids.as_deref().ok_or(Error::ObjectsNotSet)
  }

  fn check_features(&self, feature_ids: &[String], matrix: &Array2<f64>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in feature_ids {
      if !seen.insert(id) {
        return Err(Error::DuplicateFeatureId(id.clone()));
      }
    }

    let existing = feature_ids
      .iter()
      .filter(|id| self.feature_ids.contains(id))
      .cloned()
      .collect::<Vec<String>>();
    if !existing.is_empty() {
      return Err(Error::FeatureIdsExist(existing));
    }

    let expected = self.require_objects()?.len();
    if matrix.nrows() != expected {
      return Err(Error::RowCountMismatch { expected, found: matrix.nrows() });
    }
    if matrix.ncols() != feature_ids.len() {
      return Err(Error::ColumnCountMismatch { expected: feature_ids.len(), found: matrix.ncols() });
    }
    Ok(())
  }
}

impl fmt::Display for FeatureMatrix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "FeatureMatrix:")?;
    if let Some(ids) = &self.object_ids {
      writeln!(f, "\nobject ids:\n{:?}", ids)?;
    }
    if !self.feature_ids.is_empty() {
      writeln!(f, "\nfeature ids:\n{:?}", self.feature_ids)?;
    }
    if !self.labelings.is_empty() {
      writeln!(f, "\nlabelings:\n{:?}", self.labeling_names())?;
    }
    if let Some(m) = &self.feature_matrix {
      writeln!(f, "\nfeature matrix:\n{}", m)?;
    }
    Ok(())
  }
}

/// Column-wise z-score, population std. Constant columns are only centered.
fn standardize(mat: &Array2<f64>) -> Array2<f64> {
  let mut result = mat.to_owned();
  let mean = match mat.mean_axis(Axis(0)) {
    Some(mean) => mean,
    None => return result,
  };
  let mut std = mat.std_axis(Axis(0), 0.0);
  std.mapv_inplace(|s| if s == 0.0 { 1.0 } else { s });
  result -= &mean;
  result /= &std;
  result
}

fn student_t(a: &[f64], b: &[f64]) -> TTest {
  let (n0, n1) = (a.len() as f64, b.len() as f64);
  let m0 = a.iter().sum::<f64>() / n0;
  let m1 = b.iter().sum::<f64>() / n1;
  let ss0 = a.iter().map(|v| (v - m0).powi(2)).sum::<f64>();
  let ss1 = b.iter().map(|v| (v - m1).powi(2)).sum::<f64>();
  let df = n0 + n1 - 2.0;
  let pooled = (ss0 + ss1) / df;
  let t = (m0 - m1) / (pooled * (1.0 / n0 + 1.0 / n1)).sqrt();
  TTest { t, p: two_sided_p(t, df) }
}

fn two_sided_p(t: f64, df: f64) -> f64 {
  if t.is_nan() {
    return f64::NAN;
  }
  if t.is_infinite() {
    return 0.0;
  }
  match StudentsT::new(0.0, 1.0, df) {
    Ok(dist) => (2.0 * dist.sf(t.abs())).min(1.0),
    Err(_) => f64::NAN,
  }
}
