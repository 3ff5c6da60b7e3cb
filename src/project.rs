//! Translation project model
//!
//! A project is a TOML file listing file groups. Each file group is a set of
//! JSON resource files sharing a base name, one per language:
//! `<directory>/<name>.<code>.json`.

use crate::error::{Error, Result};
use crate::locale::Culture;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use xxhash_rust::xxh3::xxh3_64;

/// A named, checksum-identified collection of resource files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileGroup {
    /// Group name, also the resource file base name
    pub name: String,

    /// Directory of the resource files, relative to the project file
    #[serde(default)]
    pub directory: PathBuf,

    /// Languages configured explicitly for this group
    #[serde(default)]
    pub languages: Vec<String>,
}

impl FileGroup {
    /// Create a group with no directory and no explicit languages
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: PathBuf::new(),
            languages: Vec::new(),
        }
    }

    /// Signature shared by every representation of this group
    pub fn checksum(&self) -> String {
        format!("{:016x}", xxh3_64(self.name.trim().to_lowercase().as_bytes()))
    }

    /// Human-readable name for lists
    pub fn display_name(&self) -> String {
        if self.directory.as_os_str().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.directory.display())
        }
    }

    /// Absolute directory of the resource files
    pub fn resource_dir(&self, project: &Project) -> PathBuf {
        project.base_dir().join(&self.directory)
    }

    /// Path of the resource file for one language
    pub fn resource_path(&self, project: &Project, language_code: &str) -> PathBuf {
        self.resource_dir(project)
            .join(format!("{}.{}.json", self.name, language_code))
    }

    /// Explicit languages plus those found as resource files on disk
    pub fn language_codes(&self, project: &Project) -> Vec<String> {
        let mut codes: Vec<String> = self
            .languages
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        let dir = self.resource_dir(project);
        if !dir.is_dir() {
            return codes;
        }

        let prefix = format!("{}.", self.name);
        for entry in WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let file_name = entry.file_name().to_string_lossy();
            let Some(code) = file_name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(".json"))
            else {
                continue;
            };
            if !code.is_empty() && !codes.iter().any(|c| c.eq_ignore_ascii_case(code)) {
                codes.push(code.to_string());
            }
        }

        codes
    }
}

impl PartialEq for FileGroup {
    fn eq(&self, other: &Self) -> bool {
        self.checksum() == other.checksum()
    }
}

impl Eq for FileGroup {}

/// Translation project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project name
    pub name: String,

    /// Source/reference language
    pub neutral_language: String,

    /// Cultures shown as columns; empty means all
    #[serde(default)]
    languages_to_display: Vec<String>,

    /// File groups
    #[serde(default)]
    pub file_groups: Vec<FileGroup>,

    /// Project file this was loaded from
    #[serde(skip)]
    path: PathBuf,
}

impl Project {
    /// Create an in-memory project rooted at `path`
    pub fn new(name: impl Into<String>, neutral_language: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            neutral_language: neutral_language.into(),
            languages_to_display: Vec::new(),
            file_groups: Vec::new(),
            path,
        }
    }

    /// Load a project from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut project: Project = toml::from_str(&content).map_err(|e| Error::ProjectParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        project.path = path.to_path_buf();

        info!(
            project = %project.name,
            file_groups = project.file_groups.len(),
            "Loaded project"
        );
        Ok(project)
    }

    /// Save the project back to its file
    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "Saved project");
        Ok(())
    }

    /// Project file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the project file
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Path of the project-scoped settings store
    pub fn settings_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string());
        self.base_dir().join(format!("{}.settings.json", stem))
    }

    /// Configured display cultures; empty means every language is shown
    pub fn languages_to_display(&self) -> Vec<Culture> {
        self.languages_to_display
            .iter()
            .map(|code| Culture::tolerant(code))
            .collect()
    }

    /// Replace the display cultures; `None` or empty shows every language
    pub fn set_languages_to_display(&mut self, cultures: Option<Vec<Culture>>) {
        self.languages_to_display = cultures
            .unwrap_or_default()
            .iter()
            .map(Culture::name)
            .collect();
        info!(languages = ?self.languages_to_display, "Updated display languages");
    }

    /// Find a group by name (case-insensitive)
    pub fn file_group(&self, name: &str) -> Option<&FileGroup> {
        self.file_groups
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Find a group by checksum
    pub fn file_group_by_checksum(&self, checksum: &str) -> Option<&FileGroup> {
        self.file_groups.iter().find(|g| g.checksum() == checksum)
    }

    /// Resolve group names to groups, failing on the first unknown name
    pub fn select_file_groups(&self, names: &[String]) -> Result<Vec<FileGroup>> {
        if names.is_empty() {
            return Ok(self.file_groups.clone());
        }
        names
            .iter()
            .map(|name| {
                self.file_group(name)
                    .cloned()
                    .ok_or_else(|| Error::UnknownFileGroup(name.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_project(dir: &Path) -> Project {
        let mut project = Project::new("Demo", "en-US", dir.join("demo.toml"));
        project.file_groups.push(FileGroup {
            name: "Strings".into(),
            directory: PathBuf::from("Resources"),
            languages: vec!["de-DE".into()],
        });
        project
    }

    #[test]
    fn test_checksum_ignores_case() {
        assert_eq!(FileGroup::new("Strings").checksum(), FileGroup::new("strings ").checksum());
        assert_ne!(FileGroup::new("Strings").checksum(), FileGroup::new("Menus").checksum());
        assert_eq!(FileGroup::new("Strings").checksum().len(), 16);
    }

    #[test]
    fn test_language_codes_include_files_on_disk() {
        let dir = tempdir().unwrap();
        let project = sample_project(dir.path());
        let resources = dir.path().join("Resources");
        fs::create_dir_all(&resources).unwrap();
        fs::write(resources.join("Strings.fr-FR.json"), "{}").unwrap();
        fs::write(resources.join("Strings.DE-de.json"), "{}").unwrap();
        fs::write(resources.join("Other.it.json"), "{}").unwrap();

        let mut codes = project.file_groups[0].language_codes(&project);
        codes.sort();
        assert_eq!(codes, vec!["de-DE".to_string(), "fr-FR".to_string()]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut project = sample_project(dir.path());
        project.set_languages_to_display(Some(vec![Culture::tolerant("de-DE")]));
        project.save().unwrap();

        let loaded = Project::load(&dir.path().join("demo.toml")).unwrap();
        assert_eq!(loaded.name, "Demo");
        assert_eq!(loaded.file_groups.len(), 1);
        assert_eq!(loaded.file_groups[0].directory, PathBuf::from("Resources"));
        assert_eq!(loaded.languages_to_display()[0].name(), "de-DE");
        assert_eq!(loaded.settings_path(), dir.path().join("demo.settings.json"));
    }

    #[test]
    fn test_select_file_groups() {
        let dir = tempdir().unwrap();
        let project = sample_project(dir.path());
        assert_eq!(project.select_file_groups(&[]).unwrap().len(), 1);
        assert_eq!(
            project.select_file_groups(&["strings".into()]).unwrap()[0].name,
            "Strings"
        );
        assert!(project.select_file_groups(&["Nope".into()]).is_err());
    }
}
