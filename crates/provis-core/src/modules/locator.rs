//! Module source resolution across lookup directories.

use std::path::PathBuf;

use crate::error::{Component, Result};

const COMPONENT: &str = "MODULE";

/// File name for a logical module name: `.py` and `.wsgi` suffixes are
/// kept, anything else gets `.py` appended.
pub fn module_file_name(name: &str) -> String {
    if name.ends_with(".py") || name.ends_with(".wsgi") {
        name.to_string()
    } else {
        format!("{name}.py")
    }
}

/// Probes an ordered list of directories for module source files.
pub struct ModuleLocator {
    lookup_paths: Vec<PathBuf>,
}

impl Component for ModuleLocator {
    fn component(&self) -> &'static str {
        COMPONENT
    }
}

impl ModuleLocator {
    pub fn new(lookup_paths: Vec<PathBuf>) -> Self {
        Self { lookup_paths }
    }

    /// Resolves a module name to exactly one existing regular file.
    ///
    /// Zero matches and multiple matches are both fatal: silently picking
    /// one of several candidates could deploy the wrong version.
    pub fn locate(&self, name: &str) -> Result<PathBuf> {
        let file_name = module_file_name(name);
        let mut matches = Vec::new();
        for path in &self.lookup_paths {
            let candidate = path.join(&file_name);
            if candidate.is_file() {
                matches.push(candidate);
            }
        }

        if matches.len() > 1 {
            return Err(self.resolution_error(format!(
                "the module {name} has been located in multiple places: {matches:?}, the installation cannot continue"
            )));
        }
        matches.pop().ok_or_else(|| {
            self.resolution_error(format!(
                "the module {name} was not located in any of: {:?}",
                self.lookup_paths
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_file_name_inference() {
        assert_eq!(module_file_name("app"), "app.py");
        assert_eq!(module_file_name("app.py"), "app.py");
        assert_eq!(module_file_name("site.wsgi"), "site.wsgi");
        assert_eq!(module_file_name("app.txt"), "app.txt.py");
    }

    #[test]
    fn test_locate_returns_the_single_match() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("app.py"), "print()\n").unwrap();

        let locator = ModuleLocator::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(locator.locate("app").unwrap(), second.path().join("app.py"));
    }

    #[test]
    fn test_ambiguous_module_names_every_match() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("app.py"), "\n").unwrap();
        fs::write(second.path().join("app.py"), "\n").unwrap();

        let locator = ModuleLocator::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        let message = locator.locate("app").unwrap_err().to_string();
        assert!(message.starts_with("[MODULE]"));
        assert!(message.contains(first.path().to_str().unwrap()));
        assert!(message.contains(second.path().to_str().unwrap()));
    }

    #[test]
    fn test_absent_module_names_every_probed_path() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        let locator = ModuleLocator::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        let message = locator.locate("app").unwrap_err().to_string();
        assert!(message.contains(first.path().to_str().unwrap()));
        assert!(message.contains(second.path().to_str().unwrap()));
    }

    #[test]
    fn test_directories_do_not_count_as_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("app.py")).unwrap();

        let locator = ModuleLocator::new(vec![dir.path().to_path_buf()]);
        assert!(locator.locate("app").is_err());
    }
}
