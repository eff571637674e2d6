// Resume analysis core: skill matching, feature assembly, scoring, feedback.
// All pipeline steps are synchronous; handlers move them onto the blocking pool.

pub mod error;
pub mod features;
pub mod feedback;
pub mod handlers;
pub mod orchestrator;
pub mod predictor;
pub mod skill_matcher;

pub use error::AnalysisError;
pub use orchestrator::AnalysisContext;
