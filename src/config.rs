/// Конфигурация набора признаков

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::preprocessing::{BucketDomain, UnknownLabels};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketColumn {
    pub column: String,
    pub domain: BucketDomain,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default)]
    pub bucket_columns: Vec<BucketColumn>,
    #[serde(default)]
    pub multi_label_columns: Vec<String>,
    #[serde(default = "default_unknown_labels")]
    pub unknown_labels: UnknownLabels,
}

fn default_unknown_labels() -> UnknownLabels {
    UnknownLabels::Ignore
}

impl FeatureConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Колонка с метками бакетов и таблица, по которой её переводить в числа
    pub fn with_bucket(mut self, column: impl Into<String>, domain: BucketDomain) -> Self {
        self.bucket_columns.push(BucketColumn {
            column: column.into(),
            domain,
        });
        self
    }

    pub fn with_multi_label(mut self, column: impl Into<String>) -> Self {
        self.multi_label_columns.push(column.into());
        self
    }
}
