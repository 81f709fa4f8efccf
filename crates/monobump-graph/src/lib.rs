mod error;
mod graph;
mod package;

pub use error::GraphError;
pub use graph::{DependentEdge, PackageGraph};
pub use package::{Dependency, Package};

pub type Result<T> = std::result::Result<T, GraphError>;
