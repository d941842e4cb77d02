use std::fs;
use std::path::{Path, PathBuf};

use relative_path::RelativePath;

use crate::io::has_extension;

/// Rewrites local link targets in multi-file parses and remembers the
/// Markdown files they point to.
///
/// With an empty working path every URL is kept as written.
#[derive(Debug, Clone, Default)]
pub struct LinkResolver {
    working_path: String,
    file_name: String,
    extensions: Vec<String>,
    linked_files: Vec<String>,
}

impl LinkResolver {
    pub fn new(working_path: &str, file_name: &str, extensions: &[String]) -> Self {
        Self {
            working_path: working_path.to_string(),
            file_name: file_name.to_string(),
            extensions: extensions.to_vec(),
            linked_files: vec![],
        }
    }

    /// Absolute path of the file being parsed, or empty for in-memory text.
    pub fn file_path(&self) -> String {
        if self.working_path.is_empty() {
            return String::new();
        }
        Path::new(&self.working_path)
            .join(&self.file_name)
            .to_string_lossy()
            .into_owned()
    }

    /// Appended to every label so that labels of different files never clash.
    pub fn label_suffix(&self) -> String {
        suffix_for(&self.file_path())
    }

    /// Rewrites `url` as seen from the current file.
    ///
    /// `#frag` gets the label suffix of this file; a path to an existing file
    /// becomes absolute, and `file#frag` becomes `#frag` with that file's
    /// suffix.
    pub fn resolve(&mut self, url: &str) -> String {
        if self.working_path.is_empty() || url.contains("://") || url.starts_with("mailto:") {
            return url.to_string();
        }

        if let Some(fragment) = url.strip_prefix('#') {
            return format!("#{fragment}{}", self.label_suffix());
        }

        let (path, fragment) = match url.split_once('#') {
            Some((p, f)) => (p, Some(f)),
            None => (url, None),
        };

        let target = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            RelativePath::new(path).to_logical_path(&self.working_path)
        };
        if !target.is_file() {
            return url.to_string();
        }

        let target = fs::canonicalize(&target).unwrap_or(target);
        let abs = target.to_string_lossy().into_owned();

        let followed = has_extension(&target, &self.extensions);
        if followed && !self.linked_files.contains(&abs) {
            log::debug!("Linked file {abs}");
            self.linked_files.push(abs.clone());
        }

        match fragment {
            Some(f) if !f.is_empty() => format!("#{f}{}", suffix_for(&abs)),
            _ => abs,
        }
    }

    /// Markdown files linked from the parsed text, in order of appearance.
    pub fn take_linked_files(&mut self) -> Vec<String> {
        std::mem::take(&mut self.linked_files)
    }
}

fn suffix_for(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("/{}", path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn in_memory_text_keeps_urls() {
        let mut r = LinkResolver::default();
        assert_eq!(r.resolve("#a"), "#a");
        assert_eq!(r.resolve("other.md"), "other.md");
        assert_eq!(r.label_suffix(), "");
    }

    #[test]
    fn local_links_become_absolute() {
        let temp = TempDir::new().unwrap();
        let dir = fs::canonicalize(temp.path()).unwrap();
        fs::write(dir.join("other.md"), "# Other").unwrap();
        fs::write(dir.join("image.png"), "").unwrap();

        let wp = dir.to_string_lossy().into_owned();
        let mut r = LinkResolver::new(&wp, "index.md", &["md".to_string()]);
        let other = dir.join("other.md").to_string_lossy().into_owned();

        assert_eq!(r.resolve("other.md"), other);
        assert_eq!(
            r.resolve("other.md#intro"),
            format!("#intro/{}", other.trim_start_matches('/'))
        );
        assert_eq!(r.resolve("./sub/../other.md"), other);
        assert_eq!(r.resolve("missing.md"), "missing.md");
        assert_eq!(r.resolve("https://x.org/a.md"), "https://x.org/a.md");
        assert!(r.resolve("#local").starts_with("#local/"));

        r.resolve("image.png");
        assert_eq!(r.take_linked_files(), vec![other]);
    }
}
