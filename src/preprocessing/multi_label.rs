//! Multi-hot кодирование колонок со списками меток через запятую

use std::collections::BTreeSet;

use ndarray::{concatenate, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::pipeline::{persist_value, Component};
use crate::types::Frame;

/// Что делать с метками, которых не было при обучении
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownLabels {
    /// Пропустить метку (нулевые биты) и записать предупреждение
    #[default]
    Ignore,
    /// Вернуть ошибку
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLabelBinarizer {
    columns: Vec<String>,
    unknown_labels: UnknownLabels,
}

impl MultiLabelBinarizer {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            unknown_labels: UnknownLabels::default(),
        }
    }

    pub fn with_unknown_labels(mut self, policy: UnknownLabels) -> Self {
        self.unknown_labels = policy;
        self
    }

    pub fn fit(&self, frame: &Frame) -> Result<FittedMultiLabelBinarizer> {
        let mut encoders = Vec::with_capacity(self.columns.len());

        for name in &self.columns {
            let column = frame.column(name)?;
            let classes: BTreeSet<String> = column
                .values
                .iter()
                .flat_map(|value| split_labels(value.as_deref()))
                .collect();

            tracing::debug!("Column '{}': {} distinct labels", name, classes.len());

            encoders.push(LabelClasses {
                column: name.clone(),
                classes: classes.into_iter().collect(),
            });
        }

        Ok(FittedMultiLabelBinarizer {
            encoders,
            unknown_labels: self.unknown_labels,
        })
    }

    pub fn fit_transform(&self, frame: &Frame) -> Result<Array2<f64>> {
        self.fit(frame)?.transform(frame)
    }
}

/// Отсортированный набор меток одной колонки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLabelClasses")]
pub struct LabelClasses {
    column: String,
    classes: Vec<String>,
}

#[derive(Deserialize)]
struct RawLabelClasses {
    column: String,
    classes: Vec<String>,
}

// encode ищет метки через binary_search, порядок классов обязателен
impl TryFrom<RawLabelClasses> for LabelClasses {
    type Error = FeatureError;

    fn try_from(raw: RawLabelClasses) -> Result<Self> {
        if !raw.classes.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(FeatureError::UnsortedClasses { column: raw.column });
        }
        Ok(Self {
            column: raw.column,
            classes: raw.classes,
        })
    }
}

impl LabelClasses {
    fn encode(&self, frame: &Frame, policy: UnknownLabels) -> Result<Array2<f64>> {
        let column = frame.column(&self.column)?;
        let mut encoded = Array2::<f64>::zeros((column.values.len(), self.classes.len()));
        let mut unknown: BTreeSet<String> = BTreeSet::new();

        for (row, value) in column.values.iter().enumerate() {
            for label in split_labels(value.as_deref()) {
                match self.classes.binary_search(&label) {
                    Ok(idx) => encoded[[row, idx]] = 1.0,
                    Err(_) => {
                        unknown.insert(label);
                    }
                }
            }
        }

        if !unknown.is_empty() {
            let labels: Vec<String> = unknown.into_iter().collect();
            match policy {
                UnknownLabels::Ignore => {
                    tracing::warn!(
                        "Column '{}': ignoring labels unseen during fit: {:?}",
                        self.column,
                        labels
                    );
                }
                UnknownLabels::Error => {
                    return Err(FeatureError::UnknownLabels {
                        column: self.column.clone(),
                        labels,
                    });
                }
            }
        }

        Ok(encoded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedMultiLabelBinarizer {
    encoders: Vec<LabelClasses>,
    unknown_labels: UnknownLabels,
}

impl FittedMultiLabelBinarizer {
    pub fn transform(&self, frame: &Frame) -> Result<Array2<f64>> {
        let blocks = self
            .encoders
            .iter()
            .map(|encoder| encoder.encode(frame, self.unknown_labels))
            .collect::<Result<Vec<_>>>()?;

        if blocks.is_empty() {
            return Ok(Array2::zeros((frame.n_rows(), 0)));
        }

        let views: Vec<ArrayView2<f64>> = blocks.iter().map(|b| b.view()).collect();
        Ok(concatenate(Axis(1), &views)?)
    }

    /// Имена признаков `<колонка>_<метка>` в порядке колонок матрицы
    pub fn feature_names_out(&self) -> Vec<String> {
        self.encoders
            .iter()
            .flat_map(|e| {
                e.classes
                    .iter()
                    .map(move |label| format!("{}_{}", e.column, label))
            })
            .collect()
    }

    pub fn classes(&self, column: &str) -> Option<&[String]> {
        self.encoders
            .iter()
            .find(|e| e.column == column)
            .map(|e| e.classes.as_slice())
    }

    pub fn columns(&self) -> Vec<&str> {
        self.encoders.iter().map(|e| e.column.as_str()).collect()
    }

    pub fn n_features_out(&self) -> usize {
        self.encoders.iter().map(|e| e.classes.len()).sum()
    }
}

impl Component for MultiLabelBinarizer {
    fn persist(&self) -> Result<serde_json::Value> {
        persist_value(self)
    }

    fn attributes(&self) -> Vec<(&'static str, Result<serde_json::Value>)> {
        vec![
            ("columns", persist_value(&self.columns)),
            ("unknown_labels", persist_value(&self.unknown_labels)),
        ]
    }
}

impl Component for FittedMultiLabelBinarizer {
    fn persist(&self) -> Result<serde_json::Value> {
        persist_value(self)
    }

    fn attributes(&self) -> Vec<(&'static str, Result<serde_json::Value>)> {
        vec![
            ("encoders", persist_value(&self.encoders)),
            ("unknown_labels", persist_value(&self.unknown_labels)),
        ]
    }
}

/// Пропуск -> пустая строка, split по запятой, trim, пустые токены отбрасываем
fn split_labels(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
