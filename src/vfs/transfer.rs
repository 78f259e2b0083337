//! Copying between the host file system and an open store.

use crate::error::{Error, Result};
use crate::vfs::path::VfsPath;
use crate::vfs::store::Store;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

impl Store {
    /// Copy a host file, or a host directory recursively, to `store_path`.
    ///
    /// Existing store files at the destination are replaced. Symlinks are
    /// skipped. Returns the number of files imported.
    pub fn import(&mut self, host: &Path, store_path: &str) -> Result<usize> {
        let target = VfsPath::parse(store_path)?;

        if fs::metadata(host)?.is_file() {
            self.import_file(host, &target)?;
            return Ok(1);
        }

        self.create_dir_all(&target.to_string())?;
        let mut imported = 0;
        for entry in WalkDir::new(host).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            let relative = entry
                .path()
                .strip_prefix(host)
                .map_err(|_| Error::InvalidPath(entry.path().display().to_string()))?;

            let mut dest = target.clone();
            for component in relative.components() {
                let name = component.as_os_str().to_str().ok_or_else(|| {
                    Error::InvalidPath(format!("non UTF-8 name: {}", entry.path().display()))
                })?;
                dest = dest.join(name)?;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                self.create_dir_all(&dest.to_string())?;
            } else if file_type.is_file() {
                self.import_file(entry.path(), &dest)?;
                imported += 1;
            } else {
                tracing::debug!(path = %entry.path().display(), "skipping non-regular file");
            }
        }

        tracing::info!(host = %host.display(), store_path, files = imported, "imported");
        Ok(imported)
    }

    fn import_file(&mut self, host: &Path, dest: &VfsPath) -> Result<()> {
        let data = fs::read(host)?;
        let dest = dest.to_string();
        if self.exists(&dest)? {
            self.truncate(&dest, 0)?;
        }
        self.write_file(&dest, 0, &data)
    }

    /// Copy a store file or directory tree out to `host`.
    ///
    /// Refuses to overwrite anything already at `host`. Returns the number
    /// of files exported.
    pub fn export(&self, store_path: &str, host: &Path) -> Result<usize> {
        let source = VfsPath::parse(store_path)?;
        if host.exists() {
            return Err(Error::PathExists(host.display().to_string()));
        }

        let exported = if self.stat(store_path)?.kind.is_file() {
            fs::write(host, self.read_all(store_path)?)?;
            1
        } else {
            self.export_dir(&source, host)?
        };

        tracing::info!(store_path, host = %host.display(), files = exported, "exported");
        Ok(exported)
    }

    fn export_dir(&self, dir: &VfsPath, host: &Path) -> Result<usize> {
        fs::create_dir(host)?;

        let mut exported = 0;
        for entry in self.list(&dir.to_string())? {
            let child = dir.join(&entry.name)?;
            let host_child = host.join(&entry.name);
            if entry.is_dir() {
                exported += self.export_dir(&child, &host_child)?;
            } else {
                fs::write(&host_child, self.read_all(&child.to_string())?)?;
                exported += 1;
            }
        }
        Ok(exported)
    }
}
