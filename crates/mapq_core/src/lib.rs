pub mod demo;
pub mod domain;
pub mod error;
pub mod infer;
pub mod normalize;
pub mod report;
pub mod validate;
pub mod vocab;

pub use domain::{Entities, Issue, IssueCode, PipelineOutput, Severity, ValidationReport};
pub use error::AppError;
pub use infer::infer_maptype;
pub use validate::validate_and_correct;
