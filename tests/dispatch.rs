use std::cell::RefCell;
use std::fmt;

use clap::error::ErrorKind;
use clap::Parser;
use fm_classify::cli::Cli;
use fm_classify::Classifier;

#[derive(Debug, PartialEq)]
struct StubError(&'static str);

impl fmt::Display for StubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stub failed: {}", self.0)
    }
}

impl std::error::Error for StubError {}

#[derive(Default)]
struct RecordingClassifier {
    calls: RefCell<Vec<(String, String)>>,
    fail: Option<&'static str>,
}

impl Classifier for RecordingClassifier {
    type Error = StubError;

    fn classify(&self, fm_dir: &str, cl_dir: &str) -> Result<(), StubError> {
        self.calls.borrow_mut().push((fm_dir.to_string(), cl_dir.to_string()));
        match self.fail {
            Some(msg) => Err(StubError(msg)),
            None => Ok(()),
        }
    }
}

fn run(args: &[&str], classifier: &RecordingClassifier) -> Result<Result<(), StubError>, clap::Error> {
    let cli = Cli::try_parse_from(std::iter::once("fm-classify").chain(args.iter().copied()))?;
    Ok(cli.dispatch(classifier))
}

#[test]
fn short_flags_forward_paths_once() {
    let stub = RecordingClassifier::default();

    let result = run(&["-f", "/data/in", "-c", "/data/out"], &stub).unwrap();

    assert_eq!(result, Ok(()));
    assert_eq!(
        *stub.calls.borrow(),
        vec![("/data/in".to_string(), "/data/out".to_string())]
    );
}

#[test]
fn long_flags_behave_like_short_flags() {
    let stub = RecordingClassifier::default();

    let result = run(&["--fm_dir", "/data/in", "--cl_dir", "/data/out"], &stub).unwrap();

    assert_eq!(result, Ok(()));
    assert_eq!(
        *stub.calls.borrow(),
        vec![("/data/in".to_string(), "/data/out".to_string())]
    );
}

#[test]
fn flag_order_does_not_change_argument_order() {
    let stub = RecordingClassifier::default();

    run(&["--cl_dir=/data/out", "-f", "/data/in"], &stub).unwrap().unwrap();

    assert_eq!(
        *stub.calls.borrow(),
        vec![("/data/in".to_string(), "/data/out".to_string())]
    );
}

#[test]
fn values_are_passed_verbatim() {
    let stub = RecordingClassifier::default();

    run(&["-f", " ./in/../in/ ", "-c", "out dir"], &stub).unwrap().unwrap();

    assert_eq!(
        *stub.calls.borrow(),
        vec![(" ./in/../in/ ".to_string(), "out dir".to_string())]
    );
}

#[test]
fn missing_destination_never_calls_classifier() {
    let stub = RecordingClassifier::default();

    let err = run(&["-f", "/data/in"], &stub).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    assert_eq!(err.exit_code(), 2);
    assert!(stub.calls.borrow().is_empty());
}

#[test]
fn missing_value_never_calls_classifier() {
    let stub = RecordingClassifier::default();

    assert!(run(&["-f", "/data/in", "-c"], &stub).is_err());
    assert!(run(&["-f", "", "-c", "/data/out"], &stub).is_err());
    assert!(stub.calls.borrow().is_empty());
}

#[test]
fn classifier_error_is_returned_unchanged() {
    let stub = RecordingClassifier {
        fail: Some("no such directory"),
        ..Default::default()
    };

    let result = run(&["-f", "/data/in", "-c", "/data/out"], &stub).unwrap();

    assert_eq!(result, Err(StubError("no such directory")));
    assert_eq!(stub.calls.borrow().len(), 1);
}
