//! План признаков: все трансформеры одной таблицы и общая матрица

use ndarray::{concatenate, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::config::FeatureConfig;
use crate::error::Result;
use crate::pipeline::{ParallelEntry, ParallelTransformer, PipelineNode};
use crate::preprocessing::{
    BucketTransformer, FittedBucketTransformer, FittedMultiLabelBinarizer, MultiLabelBinarizer,
};
use crate::types::{FeatureMatrix, Frame};

pub struct FeaturePlan {
    config: FeatureConfig,
}

impl FeaturePlan {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn fit(&self, frame: &Frame) -> Result<FittedFeaturePlan> {
        let mut buckets = Vec::with_capacity(self.config.bucket_columns.len());
        for spec in &self.config.bucket_columns {
            let column = frame.column(&spec.column)?;
            let fitted = BucketTransformer::new(spec.domain).fit(&column.values)?;
            buckets.push(FittedBucketColumn {
                column: spec.column.clone(),
                transformer: fitted,
            });
        }

        let multi_label = if self.config.multi_label_columns.is_empty() {
            None
        } else {
            let columns = self.config.multi_label_columns.iter().cloned();
            let binarizer =
                MultiLabelBinarizer::new(columns).with_unknown_labels(self.config.unknown_labels);
            Some(binarizer.fit(frame)?)
        };

        let fitted = FittedFeaturePlan {
            buckets,
            multi_label,
        };
        tracing::info!(
            "Feature plan fitted on {} rows: {} features",
            frame.n_rows(),
            fitted.feature_names().len()
        );
        Ok(fitted)
    }

    pub fn fit_transform(&self, frame: &Frame) -> Result<FeatureMatrix> {
        self.fit(frame)?.transform(frame)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedBucketColumn {
    pub column: String,
    pub transformer: FittedBucketTransformer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedFeaturePlan {
    buckets: Vec<FittedBucketColumn>,
    multi_label: Option<FittedMultiLabelBinarizer>,
}

impl FittedFeaturePlan {
    /// Сначала бакеты в порядке конфигурации, затем multi-hot блоки
    pub fn transform(&self, frame: &Frame) -> Result<FeatureMatrix> {
        let mut blocks: Vec<Array2<f64>> = Vec::new();
        for bucket in &self.buckets {
            let column = frame.column(&bucket.column)?;
            blocks.push(bucket.transformer.transform(&column.values));
        }
        if let Some(ref binarizer) = self.multi_label {
            blocks.push(binarizer.transform(frame)?);
        }

        let values = if blocks.is_empty() {
            Array2::zeros((frame.n_rows(), 0))
        } else {
            let views: Vec<ArrayView2<f64>> = blocks.iter().map(|b| b.view()).collect();
            concatenate(Axis(1), &views)?
        };

        Ok(FeatureMatrix {
            values,
            feature_names: self.feature_names(),
        })
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.buckets.iter().map(|b| b.column.clone()).collect();
        if let Some(ref binarizer) = self.multi_label {
            names.extend(binarizer.feature_names_out());
        }
        names
    }

    pub fn bucket(&self, column: &str) -> Option<&FittedBucketTransformer> {
        self.buckets
            .iter()
            .find(|b| b.column == column)
            .map(|b| &b.transformer)
    }

    pub fn multi_label(&self) -> Option<&FittedMultiLabelBinarizer> {
        self.multi_label.as_ref()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// План в виде параллельного узла, чтобы проверить его перед сохранением
    pub fn pipeline(&self) -> PipelineNode {
        let mut entries: Vec<ParallelEntry> = self
            .buckets
            .iter()
            .map(|b| {
                ParallelEntry::new(
                    b.column.clone(),
                    ParallelTransformer::Node(PipelineNode::component(b.transformer)),
                    [b.column.clone()],
                )
            })
            .collect();

        if let Some(ref binarizer) = self.multi_label {
            entries.push(ParallelEntry::new(
                "multi_label",
                ParallelTransformer::Node(PipelineNode::component(binarizer.clone())),
                binarizer.columns(),
            ));
        }

        PipelineNode::Parallel(entries)
    }
}
