use std::fs::DirBuilder;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Ensures the socket's parent directory exists.
///
/// The directory is created traversable by every local user because the
/// socket itself is world-writable: privilege checks happen per operation,
/// not per connection.
pub fn prepare_socket_directory(path: &Utf8Path) -> Result<(), SocketPreparationError> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Err(SocketPreparationError::MissingParent {
            path: path.to_path_buf(),
        });
    };

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    if let Err(source) = builder.create(parent.as_std_path())
        && source.kind() != io::ErrorKind::AlreadyExists
    {
        return Err(SocketPreparationError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// Errors raised when preparing socket directories.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// Parent directory is missing when creating a Unix socket path.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent { path: Utf8PathBuf },
    /// Failed to create the socket directory.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}
