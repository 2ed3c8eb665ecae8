//! Граф композиции пайплайна

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::error::Result;
use crate::preprocessing::ScalarFunction;

/// Объект, который можно положить в пайплайн и попытаться сохранить
pub trait Component: fmt::Debug {
    /// Сохраняемое представление объекта
    fn persist(&self) -> Result<Value>;

    /// Именованные атрибуты объекта и их сохраняемые представления
    fn attributes(&self) -> Vec<(&'static str, Result<Value>)> {
        Vec::new()
    }
}

pub fn persist_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Функция преобразования целевой переменной
#[derive(Clone)]
pub enum TargetFunction {
    Named(ScalarFunction),
    /// Произвольное замыкание; сохранить его нельзя
    Closure {
        name: String,
        f: Arc<dyn Fn(f64) -> f64 + Send + Sync>,
    },
}

impl TargetFunction {
    pub fn closure<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        TargetFunction::Closure {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        match self {
            TargetFunction::Named(function) => function.apply(x),
            TargetFunction::Closure { f, .. } => f(x),
        }
    }
}

impl fmt::Debug for TargetFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFunction::Named(function) => f.debug_tuple("Named").field(function).finish(),
            TargetFunction::Closure { name, .. } => {
                f.debug_struct("Closure").field("name", name).finish_non_exhaustive()
            }
        }
    }
}

impl Serialize for TargetFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TargetFunction::Named(function) => function.serialize(serializer),
            TargetFunction::Closure { name, .. } => Err(serde::ser::Error::custom(format!(
                "closure '{}' has no persistent form",
                name
            ))),
        }
    }
}

impl From<ScalarFunction> for TargetFunction {
    fn from(function: ScalarFunction) -> Self {
        TargetFunction::Named(function)
    }
}

#[derive(Debug)]
pub enum ParallelTransformer {
    Drop,
    Passthrough,
    Node(PipelineNode),
}

/// Именованный трансформер, применяемый к набору колонок
#[derive(Debug)]
pub struct ParallelEntry {
    pub name: String,
    pub transformer: ParallelTransformer,
    pub columns: Vec<String>,
}

impl ParallelEntry {
    pub fn new<I, S>(name: impl Into<String>, transformer: ParallelTransformer, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            transformer,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug)]
pub enum PipelineNode {
    /// Последовательные именованные шаги
    Sequential(Vec<(String, PipelineNode)>),
    /// Параллельные трансформеры по колонкам
    Parallel(Vec<ParallelEntry>),
    /// Регрессор, обучаемый на преобразованной целевой переменной
    TargetTransform {
        func: TargetFunction,
        inverse_func: TargetFunction,
        regressor: Box<PipelineNode>,
    },
    Component(Box<dyn Component>),
}

impl PipelineNode {
    pub fn component<C: Component + 'static>(component: C) -> Self {
        PipelineNode::Component(Box::new(component))
    }

    pub fn sequential<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = (S, PipelineNode)>,
        S: Into<String>,
    {
        PipelineNode::Sequential(
            steps
                .into_iter()
                .map(|(name, step)| (name.into(), step))
                .collect(),
        )
    }

    pub fn target_transform(
        func: impl Into<TargetFunction>,
        inverse_func: impl Into<TargetFunction>,
        regressor: PipelineNode,
    ) -> Self {
        PipelineNode::TargetTransform {
            func: func.into(),
            inverse_func: inverse_func.into(),
            regressor: Box::new(regressor),
        }
    }

    /// Сохраняемое представление всего поддерева; ошибка в любом узле - ошибка целиком
    pub fn persist(&self) -> Result<Value> {
        match self {
            PipelineNode::Sequential(steps) => {
                let steps = steps
                    .iter()
                    .map(|(name, step)| -> Result<Value> {
                        Ok(json!({ "name": name, "step": step.persist()? }))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(json!({ "sequential": steps }))
            }
            PipelineNode::Parallel(entries) => {
                let entries = entries
                    .iter()
                    .map(|entry| -> Result<Value> {
                        let transformer = match &entry.transformer {
                            ParallelTransformer::Drop => json!("drop"),
                            ParallelTransformer::Passthrough => json!("passthrough"),
                            ParallelTransformer::Node(node) => node.persist()?,
                        };
                        Ok(json!({
                            "name": entry.name,
                            "transformer": transformer,
                            "columns": entry.columns,
                        }))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(json!({ "parallel": entries }))
            }
            PipelineNode::TargetTransform {
                func,
                inverse_func,
                regressor,
            } => Ok(json!({
                "target_transform": {
                    "func": persist_value(func)?,
                    "inverse_func": persist_value(inverse_func)?,
                    "regressor": regressor.persist()?,
                }
            })),
            PipelineNode::Component(component) => component.persist(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.persist()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::BucketTransformer;

    #[test]
    fn test_named_target_function_persists() {
        let value = persist_value(&TargetFunction::Named(ScalarFunction::Log1p)).unwrap();
        assert_eq!(value, json!("log1p"));
    }

    #[test]
    fn test_closure_target_function_does_not_persist() {
        let closure = TargetFunction::closure("halve", |x| x / 2.0);
        assert_eq!(closure.apply(3.0), 1.5);

        let err = persist_value(&closure).unwrap_err();
        assert!(err.to_string().contains("halve"));
    }

    #[test]
    fn test_sequential_persists_nested_components() {
        let node = PipelineNode::sequential([
            ("engine", PipelineNode::component(BucketTransformer::engine_size())),
            ("log", PipelineNode::component(ScalarFunction::Log1p)),
        ]);

        let bytes = node.to_bytes().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["sequential"][0]["name"], "engine");
        assert_eq!(value["sequential"][1]["step"], "log1p");
    }

    #[test]
    fn test_target_transform_with_closure_fails_to_persist() {
        let node = PipelineNode::target_transform(
            TargetFunction::closure("square", |x| x * x),
            ScalarFunction::Expm1,
            PipelineNode::component(ScalarFunction::Log1p),
        );
        assert!(node.to_bytes().is_err());
    }
}
