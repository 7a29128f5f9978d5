use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{}:{line}: {msg}", .path.display())]
  Parse { path: PathBuf, line: usize, msg: String },

  #[error("{}: invalid settings: {source}", .path.display())]
  Settings {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to serialize run summary: {0}")]
  Summary(#[source] serde_json::Error),

  #[error("not a directory: {}", .0.display())]
  NotADirectory(PathBuf),

  #[error("feature matrix in {} has no objects or no features", .0.display())]
  EmptyFeatureMatrix(PathBuf),

  #[error("object ids are already set")]
  ObjectIdsAlreadySet,

  #[error("objects are not set")]
  ObjectsNotSet,

  #[error("there are multiple objects with the same id: {0}")]
  DuplicateObjectId(String),

  #[error("the added features contain duplicate id: {0}")]
  DuplicateFeatureId(String),

  #[error("feature ids already exist: {0:?}")]
  FeatureIdsExist(Vec<String>),

  #[error("feature matrix has {found} rows, expected one per object ({expected})")]
  RowCountMismatch { expected: usize, found: usize },

  #[error("feature matrix has {found} columns, expected one per feature id ({expected})")]
  ColumnCountMismatch { expected: usize, found: usize },

  #[error("feature {0} does not exist")]
  UnknownFeature(String),

  #[error("labeling does not exist: {0}")]
  UnknownLabeling(String),

  #[error("class {class} does not exist in labeling {labeling}")]
  UnknownClass { labeling: String, class: String },

  #[error("class {class} of labeling {labeling} has no objects")]
  EmptyClass { labeling: String, class: String },

  #[error("labels are missing for objects: {0:?}")]
  MissingLabels(Vec<String>),

  #[error("label {label} has no class name ({names} names provided)")]
  NotEnoughClassNames { label: usize, names: usize },

  #[error("labeling {0} was built for a different set of objects")]
  LabelingMismatch(String),

  #[error("objects of the two feature matrices do not correspond")]
  ObjectMismatch,

  #[error("matrix shape error: {0}")]
  Shape(#[from] ndarray::ShapeError),
}

impl Error {
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io { path: path.into(), source }
  }

  pub fn parse(path: impl Into<PathBuf>, line: usize, msg: impl Into<String>) -> Self {
    Error::Parse { path: path.into(), line, msg: msg.into() }
  }
}
