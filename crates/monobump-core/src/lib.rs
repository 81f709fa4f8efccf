pub mod error;
mod package;
pub mod types;

pub use error::*;
pub use package::{DependencyKind, DependencyManifest, PackageManifest};
pub use types::*;
