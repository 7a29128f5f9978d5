use std::fs;
use std::path::Path;

use ndarray::Array2;

use crate::error::{Error, Result};

fn read_lines(path: &Path) -> Result<Vec<String>> {
  let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
  Ok(content.lines().map(|l| l.to_string()).collect())
}

fn write_lines<I, S>(path: &Path, lines: I) -> Result<()>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut out = String::new();
  for line in lines {
    out.push_str(line.as_ref());
    out.push('\n');
  }
  fs::write(path, out).map_err(|e| Error::io(path, e))
}

/// One id per line. Blank lines and `#` comments are skipped.
pub fn read_ids(path: &Path) -> Result<Vec<String>> {
  Ok(
    read_lines(path)?
      .iter()
      .map(|l| l.trim())
      .filter(|l| !l.is_empty() && !l.starts_with('#'))
      .map(|l| l.to_string())
      .collect(),
  )
}

pub fn write_ids(path: &Path, ids: &[String]) -> Result<()> {
  write_lines(path, ids)
}

/// One name per line, inner whitespace is kept.
pub fn read_names(path: &Path) -> Result<Vec<String>> {
  Ok(
    read_lines(path)?
      .into_iter()
      .filter(|l| !l.trim().is_empty())
      .collect(),
  )
}

pub fn write_names(path: &Path, names: &[String]) -> Result<()> {
  write_lines(path, names)
}

/// Labeling file: tab separated class names on the first line, then
/// `object_id<TAB>label` per object.
pub fn read_labeling(path: &Path) -> Result<(Vec<(String, usize)>, Vec<String>)> {
  let lines = read_lines(path)?;
  let mut iter = lines.iter().enumerate();

  let class_names = match iter.next() {
    Some((_, header)) => header
      .split('\t')
      .map(|n| n.trim().to_string())
      .filter(|n| !n.is_empty())
      .collect::<Vec<String>>(),
    None => return Err(Error::parse(path, 1, "missing class names header")),
  };

  let mut labels = Vec::new();
  for (i, line) in iter {
    if line.trim().is_empty() {
      continue;
    }
    let mut parts = line.split('\t');
    let (object_id, label) = match (parts.next(), parts.next(), parts.next()) {
      (Some(o), Some(l), None) => (o.trim(), l.trim()),
      _ => return Err(Error::parse(path, i + 1, "expected `object_id<TAB>label`")),
    };
    let label = label
      .parse::<usize>()
      .map_err(|e| Error::parse(path, i + 1, format!("invalid label {:?}: {}", label, e)))?;
    labels.push((object_id.to_string(), label));
  }

  Ok((labels, class_names))
}

pub fn write_labeling(
  path: &Path,
  object_ids: &[String],
  labels: &[usize],
  class_names: &[String],
) -> Result<()> {
  let header = class_names.join("\t");
  let rows = object_ids
    .iter()
    .zip(labels)
    .map(|(o, l)| format!("{}\t{}", o, l));
  write_lines(path, std::iter::once(header).chain(rows))
}

/// Whitespace separated floats, one matrix row per line.
pub fn read_matrix(path: &Path) -> Result<Array2<f64>> {
  let mut data = Vec::new();
  let mut cols: Option<usize> = None;
  let mut rows = 0;

  for (i, line) in read_lines(path)?.iter().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    let mut n = 0;
    for value in line.split_whitespace() {
      let v = value
        .parse::<f64>()
        .map_err(|e| Error::parse(path, i + 1, format!("invalid value {:?}: {}", value, e)))?;
      data.push(v);
      n += 1;
    }
    match cols {
      Some(c) if c != n => {
        return Err(Error::parse(path, i + 1, format!("expected {} values, found {}", c, n)));
      }
      _ => cols = Some(n),
    }
    rows += 1;
  }

  Ok(Array2::from_shape_vec((rows, cols.unwrap_or(0)), data)?)
}

pub fn write_matrix(path: &Path, matrix: &Array2<f64>) -> Result<()> {
  let rows = matrix.rows().into_iter().map(|row| {
    row
      .iter()
      .map(|v| format!("{:.18e}", v))
      .collect::<Vec<String>>()
      .join(" ")
  });
  write_lines(path, rows.collect::<Vec<String>>())
}
