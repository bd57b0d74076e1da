pub mod csv_io;
pub mod etl;
pub mod layout;

pub use crate::domain::model::{AnalysisResult, RawTable};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
