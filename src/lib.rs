pub mod classify;
pub mod cli;
pub mod error;
pub mod featmat;
pub mod file_io;
pub mod load_config;

pub use classify::{classify, ClassCount, RunSummary};
pub use error::{Error, Result};
pub use load_config::{load_config, ClassifySettings};

/// The classification step behind the command line: takes the feature
/// matrix dir and the classification dir, in that order.
pub trait Classifier {
  type Error;

  fn classify(&self, fm_dir: &str, cl_dir: &str) -> std::result::Result<(), Self::Error>;
}

/// Default classifier, see [`classify`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureMatrixClassifier;

impl Classifier for FeatureMatrixClassifier {
  type Error = Error;

  fn classify(&self, fm_dir: &str, cl_dir: &str) -> Result<()> {
    classify::classify(fm_dir, cl_dir)
  }
}
