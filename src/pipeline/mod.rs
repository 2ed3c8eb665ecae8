/// Композиция пайплайна и проверка сохраняемости

pub mod checker;
pub mod node;

pub use checker::{check_persistable, PersistWarning};
pub use node::{
    persist_value, Component, ParallelEntry, ParallelTransformer, PipelineNode, TargetFunction,
};
