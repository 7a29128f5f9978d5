use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{Error, Result};
use crate::file_io;

/// Assignment of every object of a feature matrix to one class.
#[derive(Debug, Clone, PartialEq)]
pub struct Labeling {
  name: String,
  object_ids: Vec<String>,
  labels: Vec<usize>,
  class_names: Vec<String>,
  object_indices_per_class: BTreeMap<String, Vec<usize>>,
}

impl Labeling {
  /// `label_map` must hold a label for each of `object_ids`; entries for
  /// unknown objects are ignored.
  pub fn new(
    name: &str,
    object_ids: &[String],
    label_map: &HashMap<String, usize>,
    class_names: Vec<String>,
  ) -> Result<Self> {
    let mut missing = object_ids
      .iter()
      .filter(|o| !label_map.contains_key(*o))
      .cloned()
      .collect::<Vec<String>>();
    if !missing.is_empty() {
      missing.sort();
      return Err(Error::MissingLabels(missing));
    }

    let labels = object_ids.iter().map(|o| label_map[o]).collect::<Vec<usize>>();

    if let Some(&max) = labels.iter().max() {
      if max >= class_names.len() {
        return Err(Error::NotEnoughClassNames { label: max, names: class_names.len() });
      }
    }

    let mut object_indices_per_class = class_names
      .iter()
      .map(|c| (c.clone(), Vec::new()))
      .collect::<BTreeMap<String, Vec<usize>>>();
    for (index, &label) in labels.iter().enumerate() {
      if let Some(indices) = object_indices_per_class.get_mut(&class_names[label]) {
        indices.push(index);
      }
    }

    Ok(Labeling {
      name: name.to_string(),
      object_ids: object_ids.to_vec(),
      labels,
      class_names,
      object_indices_per_class,
    })
  }

  pub fn load(name: &str, object_ids: &[String], path: &Path) -> Result<Self> {
    let (labels, class_names) = file_io::read_labeling(path)?;
    let label_map = labels.into_iter().collect::<HashMap<String, usize>>();
    Labeling::new(name, object_ids, &label_map, class_names)
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    file_io::write_labeling(path, &self.object_ids, &self.labels, &self.class_names)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn object_ids(&self) -> &[String] {
    &self.object_ids
  }

  pub fn labels(&self) -> &[usize] {
    &self.labels
  }

  pub fn class_names(&self) -> &[String] {
    &self.class_names
  }

  pub fn object_indices_per_class(&self) -> &BTreeMap<String, Vec<usize>> {
    &self.object_indices_per_class
  }

  pub fn class_objects(&self, class: &str) -> Result<&[usize]> {
    self
      .object_indices_per_class
      .get(class)
      .map(|v| v.as_slice())
      .ok_or_else(|| Error::UnknownClass { labeling: self.name.clone(), class: class.to_string() })
  }

  pub fn class_index(&self, class: &str) -> Result<usize> {
    self
      .class_names
      .iter()
      .position(|c| c == class)
      .ok_or_else(|| Error::UnknownClass { labeling: self.name.clone(), class: class.to_string() })
  }

  pub fn label_map(&self) -> HashMap<String, usize> {
    self.object_ids.iter().cloned().zip(self.labels.iter().copied()).collect()
  }

  /// Object indices grouped per class name, restricted to `object_is` when given.
  pub fn obj_is_per_class(&self, object_is: Option<&[usize]>) -> BTreeMap<String, Vec<usize>> {
    match object_is {
      None => self.object_indices_per_class.clone(),
      Some(object_is) => {
        let mut result: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for &i in object_is {
          let class = &self.class_names[self.labels[i]];
          result.entry(class.clone()).or_default().push(i);
        }
        result
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
  }

  fn labels(v: &[(&str, usize)]) -> HashMap<String, usize> {
    v.iter().map(|(o, l)| (o.to_string(), *l)).collect()
  }

  #[test]
  fn groups_objects_per_class() {
    let objects = ids(&["a", "b", "c"]);
    let l = Labeling::new(
      "loc",
      &objects,
      &labels(&[("a", 1), ("b", 0), ("c", 1), ("x", 0)]),
      ids(&["cyto", "nucl"]),
    )
    .unwrap();

    assert_eq!(l.labels(), &[1, 0, 1]);
    assert_eq!(l.class_objects("nucl").unwrap(), &[0, 2]);
    assert_eq!(l.class_objects("cyto").unwrap(), &[1]);
    assert_eq!(l.class_index("nucl").unwrap(), 1);
    assert!(l.class_objects("memb").is_err());
  }

  #[test]
  fn empty_class_has_no_objects() {
    let objects = ids(&["a"]);
    let l = Labeling::new("loc", &objects, &labels(&[("a", 0)]), ids(&["cyto", "nucl"])).unwrap();

    assert!(l.class_objects("nucl").unwrap().is_empty());
  }

  #[test]
  fn missing_labels_are_reported() {
    let objects = ids(&["a", "b", "c"]);
    let err = Labeling::new("loc", &objects, &labels(&[("b", 0)]), ids(&["cyto"])).unwrap_err();

    match err {
      Error::MissingLabels(missing) => assert_eq!(missing, ids(&["a", "c"])),
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  fn class_names_must_cover_labels() {
    let objects = ids(&["a", "b"]);
    let err =
      Labeling::new("loc", &objects, &labels(&[("a", 0), ("b", 2)]), ids(&["x", "y"])).unwrap_err();

    assert!(matches!(err, Error::NotEnoughClassNames { label: 2, names: 2 }));
  }

  #[test]
  fn restricted_grouping() {
    let objects = ids(&["a", "b", "c", "d"]);
    let l = Labeling::new(
      "loc",
      &objects,
      &labels(&[("a", 0), ("b", 1), ("c", 0), ("d", 1)]),
      ids(&["x", "y"]),
    )
    .unwrap();

    let grouped = l.obj_is_per_class(Some(&[2, 3]));
    assert_eq!(grouped["x"], vec![2]);
    assert_eq!(grouped["y"], vec![3]);
    assert_eq!(l.label_map()["d"], 1);
  }
}
