/// Табличные данные для трансформеров

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<String>>,
}

/// Набор именованных строковых колонок одинаковой длины
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrame")]
pub struct Frame {
    columns: Vec<Column>,
}

/// Колонки как есть, до проверки длин
#[derive(Deserialize)]
struct RawFrame {
    columns: Vec<Column>,
}

impl TryFrom<RawFrame> for Frame {
    type Error = FeatureError;

    fn try_from(raw: RawFrame) -> Result<Self> {
        raw.columns
            .into_iter()
            .try_fold(Frame::new(), |frame, column| {
                frame.with_column(column.name, column.values)
            })
    }
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column<N, I, S>(mut self, name: N, values: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let name = name.into();
        let values: Vec<Option<String>> = values.into_iter().map(|v| v.map(Into::into)).collect();

        if let Some(first) = self.columns.first() {
            if first.values.len() != values.len() {
                return Err(FeatureError::RowCountMismatch {
                    column: name,
                    expected: first.values.len(),
                    got: values.len(),
                });
            }
        }

        // Повторное имя заменяет колонку
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(self)
    }

    /// Построение из JSON-записей: строки остаются строками,
    /// числа и bool приводятся к строке, null и отсутствующие ключи - пропуски
    pub fn from_records(records: &[serde_json::Value]) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                FeatureError::InvalidRecord(format!("record {} is not an object", i))
            })?;
            for key in object.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let values = records
                    .iter()
                    .map(|record| match record.get(&name) {
                        None | Some(serde_json::Value::Null) => None,
                        Some(serde_json::Value::String(s)) => Some(s.clone()),
                        Some(other) => Some(other.to_string()),
                    })
                    .collect();
                Column { name, values }
            })
            .collect();

        Ok(Self { columns })
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| FeatureError::MissingColumn(name.to_string()))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
}

/// Итоговая матрица признаков вместе с именами колонок
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub values: Array2<f64>,
    pub feature_names: Vec<String>,
}
