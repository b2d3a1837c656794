pub mod analytics;
pub mod classify;
pub mod etl;
pub mod filter;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod sample;
pub mod value;

pub use crate::domain::model::TransformResult;
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
