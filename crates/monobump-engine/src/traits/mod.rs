mod version_scheme;

pub use version_scheme::VersionScheme;
