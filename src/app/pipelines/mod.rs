pub mod eda_pipeline;
pub mod projection_pipeline;

pub use eda_pipeline::EdaPipeline;
pub use projection_pipeline::ProjectionPipeline;
