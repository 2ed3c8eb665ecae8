//! Проверка, что собранный пайплайн можно сохранить целиком

use std::fmt;

use super::node::{ParallelTransformer, PipelineNode, TargetFunction};
use crate::error::Result;

/// Несохраняемый узел или атрибут
#[derive(Debug, Clone, PartialEq)]
pub struct PersistWarning {
    /// Путь к объекту: `step`, `step attribute`, `root regressor`
    pub path: String,
    pub message: String,
    pub reason: String,
}

impl fmt::Display for PersistWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.reason)
    }
}

/// Обходит граф в глубину и собирает предупреждения; никогда не падает
pub fn check_persistable(root: &PipelineNode) -> Vec<PersistWarning> {
    let mut warnings = Vec::new();
    visit(root, "root", &mut warnings);
    warnings
}

fn visit(node: &PipelineNode, name: &str, warnings: &mut Vec<PersistWarning>) {
    match node {
        PipelineNode::Sequential(steps) => {
            for (step_name, step) in steps {
                report(
                    warnings,
                    step_name.clone(),
                    format!("Pipeline step '{}' is not persistable", step_name),
                    step.to_bytes().map(drop),
                );
                visit(step, step_name, warnings);
            }
        }
        PipelineNode::Parallel(entries) => {
            for entry in entries {
                let transformer = match &entry.transformer {
                    ParallelTransformer::Drop | ParallelTransformer::Passthrough => continue,
                    ParallelTransformer::Node(transformer) => transformer,
                };
                report(
                    warnings,
                    entry.name.clone(),
                    format!("Column transformer '{}' is not persistable", entry.name),
                    transformer.to_bytes().map(drop),
                );
                visit(transformer, &entry.name, warnings);
            }
        }
        PipelineNode::TargetTransform {
            func,
            inverse_func,
            regressor,
        } => {
            for (field, function) in [("func", func), ("inverse_func", inverse_func)] {
                report(
                    warnings,
                    format!("{} {}", name, field),
                    format!("Target transform '{}' in '{}' is not persistable", field, name),
                    function_bytes(function),
                );
            }
            report(
                warnings,
                format!("{} regressor", name),
                format!("Target transform 'regressor' in '{}' is not persistable", name),
                regressor.to_bytes().map(drop),
            );
            visit(regressor, &format!("{} regressor", name), warnings);
        }
        PipelineNode::Component(component) => {
            for (attribute, persisted) in component.attributes() {
                report(
                    warnings,
                    format!("{} {}", name, attribute),
                    format!("Object '{}' attribute '{}' is not persistable", name, attribute),
                    persisted.map(drop),
                );
            }
        }
    }
}

fn function_bytes(function: &TargetFunction) -> Result<()> {
    serde_json::to_vec(function)?;
    Ok(())
}

fn report(warnings: &mut Vec<PersistWarning>, path: String, message: String, outcome: Result<()>) {
    if let Err(err) = outcome {
        tracing::warn!("{}: {}", message, err);
        warnings.push(PersistWarning {
            path,
            message,
            reason: err.to_string(),
        });
    }
}
