use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Settings;
use crate::declarations;
use crate::error::RouteError;
use crate::scan::{module_path, scan_sources};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub extensions: Vec<String>,
    /// Module path prepended to every discovered name, e.g. `app::routes`.
    pub root_module: Option<String>,
}

impl From<&Settings> for ScanOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            extensions: settings.extensions.clone(),
            root_module: settings.root_module.clone(),
        }
    }
}

/// Discovered type name -> declaring file, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassMap {
    entries: Vec<ClassEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassEntry {
    pub name: String,
    pub path: PathBuf,
}

impl ClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A name seen again keeps its first position and takes the newer path.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        let name = name.into();
        let path = path.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.path = path,
            None => self.entries.push(ClassEntry { name, path }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.path.as_path())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the class map of every source file under `root`.
///
/// Files are parsed in parallel; results are merged back in traversal order.
pub fn class_map(root: &Path, options: &ScanOptions) -> Result<ClassMap, RouteError> {
    let sources = scan_sources(root, &options.extensions)?;
    let base: Vec<String> = options
        .root_module
        .as_deref()
        .map(|m| {
            m.split("::")
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let discovered: Vec<(PathBuf, Vec<String>)> = sources
        .par_iter()
        .map(|path| {
            let mut namespace = base.clone();
            namespace.extend(module_path(root, path));
            (path.clone(), declarations::scan_file(path, &namespace))
        })
        .collect();

    let mut map = ClassMap::new();
    for (path, names) in discovered {
        debug!(path = %path.display(), types = names.len(), "scanned source file");
        for name in names {
            map.insert(name, path.clone());
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position_and_last_path() {
        let mut map = ClassMap::new();
        map.insert("a::Users", "a.rs");
        map.insert("a::Posts", "a.rs");
        map.insert("a::Users", "b.rs");

        assert_eq!(map.names().collect::<Vec<_>>(), vec!["a::Users", "a::Posts"]);
        assert_eq!(map.get("a::Users"), Some(Path::new("b.rs")));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn class_map_serializes_as_ordered_entries() {
        let mut map = ClassMap::new();
        map.insert("routes::Users", "/src/routes.rs");
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "name": "routes::Users", "path": "/src/routes.rs" }])
        );
    }

    #[test]
    fn class_map_qualifies_names_by_root_module_and_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("admin"))?;
        std::fs::write(
            dir.path().join("admin/users.rs"),
            "pub struct UserRoutes;\npub struct UserFilters;\n",
        )?;
        std::fs::write(
            dir.path().join("posts.rs"),
            "fn wire() { let _ = UserRoutes::default(); }\n",
        )?;

        let options = ScanOptions {
            extensions: vec!["rs".to_string()],
            root_module: Some("app::routes".to_string()),
        };
        let map = class_map(dir.path(), &options)?;

        let users = dir.path().join("admin/users.rs");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("app::routes::admin::users::UserRoutes"), Some(users.as_path()));
        assert_eq!(map.get("app::routes::admin::users::UserFilters"), Some(users.as_path()));
        Ok(())
    }
}
