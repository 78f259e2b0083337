//! Virtual path handling.

use crate::error::{Error, Result};

/// A validated, normalized absolute path inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VfsPath {
    components: Vec<String>,
}

impl VfsPath {
    /// The root directory.
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Parse a path string.
    ///
    /// Paths must be absolute (start with /). Repeated and trailing slashes
    /// collapse; `.` and `..` are rejected.
    pub fn parse(path: &str) -> Result<Self> {
        if !path.starts_with('/') {
            return Err(Error::InvalidPath(format!(
                "Path must be absolute (start with /): {}",
                path
            )));
        }

        let mut components = Vec::new();
        for component in path.split('/').filter(|s| !s.is_empty()) {
            validate_component(component)?;
            components.push(component.to_string());
        }

        Ok(Self { components })
    }

    /// Check if this is the root path.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Get path components.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Get the parent path.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else {
            Some(Self {
                components: self.components[..self.components.len() - 1].to_vec(),
            })
        }
    }

    /// Get the file/directory name (last component).
    pub fn name(&self) -> Option<&str> {
        self.components.last().map(|s| s.as_str())
    }

    /// Join a child path component.
    pub fn join(&self, name: &str) -> Result<Self> {
        validate_component(name)?;

        let mut components = self.components.clone();
        components.push(name.to_string());
        Ok(Self { components })
    }

    /// True if `self` equals `ancestor` or lies beneath it.
    pub fn starts_with(&self, ancestor: &VfsPath) -> bool {
        self.components.starts_with(&ancestor.components)
    }

    /// Get the depth of this path.
    pub fn depth(&self) -> usize {
        self.components.len()
    }
}

fn validate_component(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
        return Err(Error::InvalidPath(format!(
            "Invalid path component: {:?}",
            name
        )));
    }
    Ok(())
}

impl std::fmt::Display for VfsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "/{}", self.components.join("/"))
        }
    }
}
