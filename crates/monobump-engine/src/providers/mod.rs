mod semver_scheme;

pub use semver_scheme::SemverScheme;
