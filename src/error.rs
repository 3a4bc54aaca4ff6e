//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with declaration file reading, parsing and writing
//! - RegistryError: Issues with package index communication
//! - PublishError: Issues with committing changes and opening pull requests
//! - ConfigError: Issues with CLI/environment configuration

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run before any file is read
///
/// Everything that happens per file or per package is recovered and
/// reported instead.
#[derive(Error, Debug)]
pub enum AppError {
    /// The HTTP client could not be built
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Unusable configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to declaration file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read declaration file
    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write declaration file
    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// pyproject.toml is not valid TOML
    #[error("{path} is not valid TOML: {message}")]
    TomlParseError { path: PathBuf, message: String },
}

/// Errors related to package index communication
///
/// Every variant names the package and the index it was looked up in, so a
/// failed lookup can be reported next to the declaration that caused it.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The index has no such project
    #[error("{index} has no project named '{package}'")]
    PackageNotFound { package: String, index: String },

    /// Transport failure or unexpected HTTP status
    #[error("lookup of '{package}' on {index} failed: {message}")]
    NetworkError {
        package: String,
        index: String,
        message: String,
    },

    /// Body could not be decoded as release metadata
    #[error("{index} returned unusable metadata for '{package}': {message}")]
    InvalidResponse {
        package: String,
        index: String,
        message: String,
    },

    /// No response within the request deadline
    #[error("lookup of '{package}' on {index} timed out")]
    Timeout { package: String, index: String },
}

/// Errors related to publishing a change request
#[derive(Error, Debug)]
pub enum PublishError {
    /// A git command could not be run or exited unsuccessfully
    #[error("git {command} failed: {message}")]
    GitFailed { command: String, message: String },

    /// Hosting API rejected or failed the request
    #[error("{host} API error: {message}")]
    HostApi { host: String, message: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid support window
    #[error("invalid support window '{value}': expected a positive number of years")]
    InvalidWindow { value: String },

    /// Target path cannot be used as a project directory
    #[error("cannot use '{path}' as project directory: {message}")]
    InvalidPath { path: PathBuf, message: String },
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    pub fn package_not_found(package: impl Into<String>, index: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            index: index.into(),
        }
    }

    pub fn network_error(
        package: impl Into<String>,
        index: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            index: index.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(
        package: impl Into<String>,
        index: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            index: index.into(),
            message: message.into(),
        }
    }

    pub fn timeout(package: impl Into<String>, index: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            index: index.into(),
        }
    }
}

impl PublishError {
    /// Creates a new GitFailed error
    pub fn git_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        PublishError::GitFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a new HostApi error
    pub fn host_api(host: impl Into<String>, message: impl Into<String>) -> Self {
        PublishError::HostApi {
            host: host.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_manifest_errors_name_the_file() {
        let err = ManifestError::read_error(
            "/project/requirements.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "cannot read /project/requirements.txt: denied");

        let err = ManifestError::toml_parse_error("/project/pyproject.toml", "expected `]`");
        assert_eq!(
            err.to_string(),
            "/project/pyproject.toml is not valid TOML: expected `]`"
        );
    }

    #[test]
    fn test_registry_error_messages() {
        assert_eq!(
            RegistryError::package_not_found("not-a-project", "PyPI").to_string(),
            "PyPI has no project named 'not-a-project'"
        );
        assert_eq!(
            RegistryError::network_error("requests", "PyPI", "HTTP 503").to_string(),
            "lookup of 'requests' on PyPI failed: HTTP 503"
        );
        assert!(RegistryError::invalid_response("numpy", "PyPI", "missing field `releases`")
            .to_string()
            .ends_with("missing field `releases`"));
        assert_eq!(
            RegistryError::timeout("numpy", "PyPI").to_string(),
            "lookup of 'numpy' on PyPI timed out"
        );
    }

    #[test]
    fn test_publish_errors() {
        let err = PublishError::git_failed("push", "remote rejected");
        assert_eq!(err.to_string(), "git push failed: remote rejected");

        let err = PublishError::host_api("GitHub", "HTTP 422");
        assert_eq!(err.to_string(), "GitHub API error: HTTP 422");
    }

    #[test]
    fn test_config_errors() {
        let err = ConfigError::InvalidWindow {
            value: "-1".to_string(),
        };
        assert!(err.to_string().contains("'-1'"));

        let err = ConfigError::InvalidPath {
            path: PathBuf::from("setup.py"),
            message: "not a directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot use 'setup.py' as project directory: not a directory"
        );
    }

    #[test]
    fn test_app_error_is_transparent() {
        let app: AppError = RegistryError::network_error("", "HTTP client", "no TLS backend").into();
        assert!(matches!(app, AppError::Registry(_)));
        assert_eq!(
            app.to_string(),
            "lookup of '' on HTTP client failed: no TLS backend"
        );

        let app: AppError = ConfigError::InvalidPath {
            path: PathBuf::from("setup.py"),
            message: "not a directory".to_string(),
        }
        .into();
        assert!(matches!(app, AppError::Config(_)));
    }
}
