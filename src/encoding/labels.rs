use crate::bio::sequence::SequenceRecord;
use crate::error::{ProtlocError, ProtlocResult};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bijection between category names and dense codes `0..n`, in configuration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassDictionary {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl ClassDictionary {
    pub fn new<I, S>(categories: I) -> ProtlocResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = categories.into_iter().map(Into::into).collect();
        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code).is_some() {
                return Err(ProtlocError::Configuration(format!(
                    "Duplicate class: {}",
                    class
                )));
            }
        }
        Ok(Self { classes, codes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, label: &str) -> ProtlocResult<usize> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| ProtlocError::Configuration(format!("Unknown class label: {}", label)))
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for ClassDictionary {
    type Error = ProtlocError;

    fn try_from(classes: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(classes)
    }
}

impl From<ClassDictionary> for Vec<String> {
    fn from(dict: ClassDictionary) -> Self {
        dict.classes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LabelEncoding {
    Indices(Array1<usize>),
    /// One row per record, one column per class
    OneHot(Array2<f64>),
}

impl LabelEncoding {
    pub fn len(&self) -> usize {
        match self {
            LabelEncoding::Indices(codes) => codes.len(),
            LabelEncoding::OneHot(rows) => rows.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> Vec<usize> {
        match self {
            LabelEncoding::Indices(codes) => codes.shape().to_vec(),
            LabelEncoding::OneHot(rows) => rows.shape().to_vec(),
        }
    }
}

/// Encode the labels of `records`. Every record must carry a label.
pub fn encode_labels(
    records: &[SequenceRecord],
    dict: &ClassDictionary,
    one_hot: bool,
) -> ProtlocResult<LabelEncoding> {
    let codes = records
        .iter()
        .map(|r| {
            let label = r.label.as_deref().ok_or_else(|| {
                ProtlocError::Configuration(format!("Record {} has no class label", r.id))
            })?;
            dict.encode(label)
        })
        .collect::<ProtlocResult<Vec<usize>>>()?;

    if !one_hot {
        return Ok(LabelEncoding::Indices(Array1::from(codes)));
    }
    let mut matrix = Array2::zeros((codes.len(), dict.len()));
    for (row, &code) in codes.iter().enumerate() {
        matrix[[row, code]] = 1.0;
    }
    Ok(LabelEncoding::OneHot(matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn records(labels: &[&str]) -> Vec<SequenceRecord> {
        labels
            .iter()
            .enumerate()
            .map(|(i, l)| SequenceRecord::new(format!(">r{}", i), "MK").with_label(Some(l.to_string())))
            .collect()
    }

    #[test]
    fn test_codes_follow_configuration_order() {
        let dict = ClassDictionary::new(["cyto", "mito", "nucleus", "secreted"]).unwrap();
        assert_eq!(dict.encode("cyto").unwrap(), 0);
        assert_eq!(dict.encode("secreted").unwrap(), 3);
        assert_eq!(dict.decode(1), Some("mito"));
        assert_eq!(dict.decode(4), None);
        assert!(matches!(
            dict.encode("golgi"),
            Err(ProtlocError::Configuration(_))
        ));
    }

    #[test]
    fn test_duplicate_classes_rejected() {
        assert!(ClassDictionary::new(["a", "b", "a"]).is_err());
    }

    #[test]
    fn test_index_and_one_hot() {
        let dict = ClassDictionary::new(["a", "b", "c"]).unwrap();
        let recs = records(&["c", "a", "b"]);

        assert_eq!(
            encode_labels(&recs, &dict, false).unwrap(),
            LabelEncoding::Indices(array![2, 0, 1])
        );
        assert_eq!(
            encode_labels(&recs, &dict, true).unwrap(),
            LabelEncoding::OneHot(array![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
        );
    }

    #[test]
    fn test_unlabelled_record_is_rejected() {
        let dict = ClassDictionary::new(["a"]).unwrap();
        let recs = vec![SequenceRecord::new(">blind", "MK")];
        assert!(encode_labels(&recs, &dict, false).is_err());
    }

    #[test]
    fn test_serializes_as_class_list() {
        let dict = ClassDictionary::new(["a", "b"]).unwrap();
        let json = serde_json::to_string(&dict).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let back: ClassDictionary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dict);
    }
}
