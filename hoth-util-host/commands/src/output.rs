// Licensed under the Apache-2.0 license

//! Multi-output sink
//!
//! Regular-file destinations are staged as temporary files next to the file
//! they replace, with symlinks resolved to their targets. Other existing
//! destinations (character devices, FIFOs) are written in place during
//! [`OutputSink::commit`]. Dropping or releasing an uncommitted sink deletes
//! the staged files, so existing destinations are left exactly as they were.

use crate::error::{HtoolError, HtoolResult};
use log::{debug, error};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

struct StagedOutput {
    /// Destination as requested
    path: PathBuf,
    /// Destination with symlinks resolved
    target: PathBuf,
    /// `None` for destinations written in place
    file: Option<NamedTempFile>,
}

impl StagedOutput {
    fn io_error(&self, source: io::Error) -> HtoolError {
        let e = HtoolError::Io {
            path: self.path.clone(),
            source,
        };
        error!("{}", e);
        e
    }
}

pub struct OutputSink {
    staged: Vec<StagedOutput>,
}

impl OutputSink {
    /// Stage one writable handle per path, in order
    ///
    /// Handles already staged are released if a later path cannot be opened.
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> HtoolResult<Self> {
        let mut sink = Self {
            staged: Vec::with_capacity(paths.len()),
        };
        for path in paths {
            let path = path.as_ref();
            let (target, file) = stage(path).map_err(|source| {
                let e = HtoolError::Resource {
                    path: path.to_path_buf(),
                    source,
                };
                error!("{}", e);
                e
            })?;
            sink.staged.push(StagedOutput {
                path: path.to_path_buf(),
                target,
                file,
            });
        }
        Ok(sink)
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Write `contents[i]` to the i-th destination
    ///
    /// Staged files are written and synced first, then in-place destinations
    /// are written, then staged files are renamed over their targets. If a
    /// rename fails, targets already replaced by this commit are put back:
    /// previous contents are restored and newly created files are removed.
    /// In-place destinations cannot be rolled back.
    pub fn commit(mut self, contents: &[&[u8]]) -> HtoolResult<()> {
        if contents.len() != self.staged.len() {
            let path = self
                .staged
                .first()
                .map(|out| out.path.clone())
                .unwrap_or_default();
            return Err(HtoolError::Io {
                path,
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "{} outputs staged, {} buffers supplied",
                        self.staged.len(),
                        contents.len()
                    ),
                ),
            });
        }

        let mut outputs = std::mem::take(&mut self.staged);
        for (out, data) in outputs.iter_mut().zip(contents) {
            let result = match out.file.as_mut() {
                Some(file) => file
                    .write_all(data)
                    .and_then(|_| file.as_file().sync_all()),
                None => Ok(()),
            };
            result.map_err(|source| out.io_error(source))?;
        }

        let mut backups = Vec::with_capacity(outputs.len());
        for out in &outputs {
            let backup = match out.file {
                Some(_) => backup_existing(&out.target).map_err(|source| out.io_error(source))?,
                None => None,
            };
            backups.push(backup);
        }

        for (out, data) in outputs.iter().zip(contents) {
            if out.file.is_none() {
                write_in_place(&out.target, data).map_err(|source| out.io_error(source))?;
                debug!("wrote {} in place", out.path.display());
            }
        }

        let mut replaced = Vec::with_capacity(outputs.len());
        for (out, backup) in outputs.into_iter().zip(backups) {
            let StagedOutput { path, target, file } = out;
            let Some(file) = file else {
                continue;
            };
            if let Err(e) = file.persist(&target) {
                let e = HtoolError::Io {
                    path,
                    source: e.error,
                };
                error!("{}", e);
                restore(replaced);
                return Err(e);
            }
            debug!("wrote {}", path.display());
            replaced.push((target, backup));
        }
        Ok(())
    }

    /// Discard every staged handle; safe to call any number of times
    pub fn release(&mut self) {
        if !self.staged.is_empty() {
            debug!("releasing {} uncommitted outputs", self.staged.len());
        }
        self.staged.clear();
    }
}

impl Drop for OutputSink {
    fn drop(&mut self) {
        self.release();
    }
}

fn stage(path: &Path) -> io::Result<(PathBuf, Option<NamedTempFile>)> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "destination is a directory",
        )),
        Ok(meta) => {
            let target = fs::canonicalize(path)?;
            if !meta.is_file() {
                return Ok((target, None));
            }
            let file = staged_file(&target)?;
            file.as_file().set_permissions(meta.permissions())?;
            Ok((target, Some(file)))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Ok((path.to_path_buf(), Some(staged_file(path)?)))
        }
        Err(e) => Err(e),
    }
}

// New files get 0666 less the umask, as `fopen` would create them
fn staged_file(target: &Path) -> io::Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

fn backup_existing(target: &Path) -> io::Result<Option<NamedTempFile>> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_file() => {
            let mut backup = staged_file(target)?;
            io::copy(&mut File::open(target)?, backup.as_file_mut())?;
            backup.as_file().set_permissions(meta.permissions())?;
            Ok(Some(backup))
        }
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn write_in_place(target: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).truncate(true).open(target)?;
    file.write_all(data)?;
    file.flush()
}

fn restore(replaced: Vec<(PathBuf, Option<NamedTempFile>)>) {
    for (target, backup) in replaced.into_iter().rev() {
        let result = match backup {
            Some(backup) => backup.persist(&target).map(|_| ()).map_err(|e| e.error),
            None => fs::remove_file(&target),
        };
        match result {
            Ok(()) => debug!("restored {}", target.display()),
            Err(e) => error!("Unable to restore {}: {}", target.display(), e),
        }
    }
}
