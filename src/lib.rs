pub mod cli;
pub mod plan;
pub mod report;
pub mod resolver;
pub mod strategy;
pub mod workspace;

pub use resolver::{Analysis, Recommendation, Resolver};
pub use strategy::Strategy;
pub use workspace::{GitWorkspace, Workspace};
