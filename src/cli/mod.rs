use clap::builder::NonEmptyStringValueParser;
use clap::Parser;

use crate::Classifier;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about = "Classify a feature matrix directory", long_about = None)]
pub struct Cli {
    /// Feature matrix directory (source)
    #[arg(short = 'f', long = "fm_dir", value_parser = NonEmptyStringValueParser::new())]
    pub fm_dir: String,
    /// Classification directory (destination)
    #[arg(short = 'c', long = "cl_dir", value_parser = NonEmptyStringValueParser::new())]
    pub cl_dir: String,
}

impl Cli {
    /// Hands both paths, unmodified and in order, to `classifier`. Its error
    /// is returned as is.
    pub fn dispatch<C: Classifier>(&self, classifier: &C) -> Result<(), C::Error> {
        classifier.classify(&self.fm_dir, &self.cl_dir)
    }
}
