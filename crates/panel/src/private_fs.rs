// Owner-only file helpers for panel state under `~/.wordassist/`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Create `dir` (and parents) and restrict it to the owner on unix.
pub fn ensure_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory `{}`", dir.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = fs::metadata(dir)
            .with_context(|| format!("failed to read metadata for `{}`", dir.display()))?
            .permissions()
            .mode()
            & 0o777;
        if mode != 0o700 {
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
                .with_context(|| format!("failed to set owner-only mode on `{}`", dir.display()))?;
        }
    }

    Ok(())
}

/// Write `contents` to `path`, creating the parent directory, with 0600
/// permissions on unix.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_private_dir(parent)?;
    }

    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file =
        options.open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    file.write_all(contents).with_context(|| format!("failed to write `{}`", path.display()))?;
    file.sync_data().with_context(|| format!("failed to fsync `{}`", path.display()))?;
    Ok(())
}
