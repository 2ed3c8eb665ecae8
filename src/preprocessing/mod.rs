/// Модуль предобработки данных

pub mod bucket;
pub mod functions;
pub mod mappings;
pub mod multi_label;
pub mod plan;

pub use bucket::{BucketTransformer, FittedBucketTransformer};
pub use functions::{convert_to_str, exp_transform, log_transform, ScalarFunction};
pub use mappings::{BucketDomain, BucketTable, FallbackPolicy};
pub use multi_label::{FittedMultiLabelBinarizer, LabelClasses, MultiLabelBinarizer, UnknownLabels};
pub use plan::{FeaturePlan, FittedFeaturePlan};
