//! Spreadsheet backend built on calamine
//!
//! Expected layout, as produced by the export side of the tool:
//! - one worksheet per file group, named after the group
//! - row 0 is a header: a key column followed by one column per language code
//! - every following row holds a resource key and its translations

use crate::backend::{
    FileGroupDetector, ImportContext, ImportProcessor, ImportRequest, ImportSummary,
    LanguageDetector,
};
use crate::error::ImportError;
use crate::project::{FileGroup, Project};
use calamine::{Data, Reader, open_workbook_auto};
use rust_i18n::t;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info, warn};

/// Rows between cancellation checks while collecting translations
const CANCEL_CHECK_INTERVAL: usize = 64;

/// Translations for one language: resource key to text
pub type Translations = BTreeMap<String, String>;

/// Default [`ImportBackend`](crate::backend::ImportBackend) reading real workbooks
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookBackend;

impl WorkbookBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Sheet contents as plain strings
fn read_workbook(path: &Path) -> Result<Vec<(String, Vec<Vec<String>>)>, ImportError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ImportError::Workbook {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        sheets.push((name, rows));
    }
    Ok(sheets)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Language codes named in a sheet's header row, without the key column
pub fn header_languages(rows: &[Vec<String>]) -> Vec<String> {
    rows.first()
        .map(|header| {
            header
                .iter()
                .skip(1)
                .map(|cell| cell.trim().to_string())
                .filter(|cell| !cell.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Collect non-empty translations for the selected languages
///
/// Columns are matched to `language_codes` case-insensitively; the returned
/// map is keyed by the requested spelling of each code.
pub fn collect_translations(
    rows: &[Vec<String>],
    language_codes: &[String],
    context: &ImportContext,
) -> Result<BTreeMap<String, Translations>, ImportError> {
    let Some(header) = rows.first() else {
        return Ok(BTreeMap::new());
    };

    let columns: Vec<(usize, &String)> = language_codes
        .iter()
        .filter_map(|code| {
            header
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, cell)| cell.trim().eq_ignore_ascii_case(code))
                .map(|(index, _)| (index, code))
        })
        .collect();

    let mut result: BTreeMap<String, Translations> = BTreeMap::new();
    for (row_index, row) in rows.iter().enumerate().skip(1) {
        if row_index % CANCEL_CHECK_INTERVAL == 0 {
            context.check_cancelled()?;
        }

        let Some(key) = row.first().map(|k| k.trim()).filter(|k| !k.is_empty()) else {
            continue;
        };

        for (column, code) in &columns {
            let Some(text) = row.get(*column).filter(|t| !t.is_empty()) else {
                continue;
            };
            result
                .entry((*code).clone())
                .or_default()
                .insert(key.to_string(), text.clone());
        }
    }

    Ok(result)
}

/// Merge translations into a JSON resource file, replacing it atomically
///
/// Returns the number of entries written.
pub fn merge_resource_file(path: &Path, translations: &Translations) -> Result<usize, ImportError> {
    let mut merged: Translations = if path.exists() {
        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ImportError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        Translations::new()
    };

    for (key, text) in translations {
        merged.insert(key.clone(), text.clone());
    }

    let io_error = |source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(io_error)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &merged).map_err(|source| {
        ImportError::Json {
            path: temp_path.clone(),
            source,
        }
    })?;
    fs::rename(&temp_path, path).map_err(io_error)?;

    debug!(path = %path.display(), entries = translations.len(), "Merged resource file");
    Ok(translations.len())
}

impl FileGroupDetector for WorkbookBackend {
    fn detect_file_groups(&self, project: &Project, path: &Path) -> Option<Vec<FileGroup>> {
        let sheets = match read_workbook(path) {
            Ok(sheets) => sheets,
            Err(e) => {
                warn!(error = %e, "File group detection failed");
                return None;
            }
        };

        let groups = sheets
            .into_iter()
            .map(|(name, _)| {
                let detected = FileGroup::new(name);
                project
                    .file_group_by_checksum(&detected.checksum())
                    .cloned()
                    .unwrap_or(detected)
            })
            .collect::<Vec<_>>();

        debug!(count = groups.len(), "Detected file groups");
        Some(groups)
    }
}

impl LanguageDetector for WorkbookBackend {
    fn detect_languages(&self, path: &Path) -> Option<Vec<String>> {
        let sheets = match read_workbook(path) {
            Ok(sheets) => sheets,
            Err(e) => {
                warn!(error = %e, "Language detection failed");
                return None;
            }
        };

        let mut codes: Vec<String> = Vec::new();
        for (_, rows) in &sheets {
            for code in header_languages(rows) {
                if !codes.iter().any(|c| c.eq_ignore_ascii_case(&code)) {
                    codes.push(code);
                }
            }
        }

        debug!(?codes, "Detected languages");
        Some(codes)
    }
}

impl ImportProcessor for WorkbookBackend {
    fn process(
        &self,
        request: &ImportRequest,
        context: &ImportContext,
    ) -> Result<ImportSummary, ImportError> {
        let path = &request.source_path;
        context.report(t!("progress_reading", file = path.display().to_string()));
        let sheets = read_workbook(path)?;

        let mut summary = ImportSummary {
            file_groups: request.file_groups.len(),
            languages: request.language_codes.len(),
            ..Default::default()
        };

        for group in &request.file_groups {
            context.check_cancelled()?;
            context.report(t!("progress_group", group = group.name.as_str()));

            let (_, rows) = sheets
                .iter()
                .find(|(name, _)| name.trim().eq_ignore_ascii_case(group.name.trim()))
                .ok_or_else(|| ImportError::MissingSheet {
                    group: group.name.clone(),
                })?;

            let translations = collect_translations(rows, &request.language_codes, context)?;
            for (code, entries) in &translations {
                context.check_cancelled()?;
                context.report(t!(
                    "progress_language",
                    group = group.name.as_str(),
                    language = code.as_str()
                ));

                let target = group.resource_path(&request.project, code);
                summary.entries += merge_resource_file(&target, entries)?;
                summary.files_written += 1;
            }
        }

        context.report(String::new());
        info!(
            file_groups = summary.file_groups,
            languages = summary.languages,
            entries = summary.entries,
            files_written = summary.files_written,
            "Import finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::WorkerEvent;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::sync::mpsc::channel;
    use tempfile::{TempDir, tempdir};

    type Sheet<'a> = (&'a str, &'a [&'a [&'a str]]);

    /// Write an .xlsx with one worksheet per entry; empty strings stay blank
    fn write_workbook(path: &Path, sheets: &[Sheet]) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        for (name, data) in sheets {
            let sheet = workbook.add_worksheet();
            sheet.set_name(*name).unwrap();
            for (r, row) in data.iter().enumerate() {
                for (c, text) in row.iter().enumerate() {
                    if !text.is_empty() {
                        sheet.write_string(r as u32, c as u16, *text).unwrap();
                    }
                }
            }
        }
        workbook.save(path).unwrap();
    }

    struct Fixture {
        dir: TempDir,
        project: Arc<Project>,
        book: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let mut project = Project::new("Demo", "en", dir.path().join("demo.toml"));
        let mut strings = FileGroup::new("Strings");
        strings.directory = PathBuf::from("Resources");
        project.file_groups.push(strings);
        project.file_groups.push(FileGroup::new("Menus"));

        let book = dir.path().join("translated.xlsx");
        write_workbook(
            &book,
            &[
                (
                    "Strings",
                    &[
                        &["Key", "de-DE", "fr"],
                        &["hello", "Hallo", "Bonjour"],
                        &["bye", "", "Au revoir"],
                    ],
                ),
                ("Menus", &[&["Key", "DE-de", "it"], &["file", "Datei", "File"]]),
                ("Extra", &[&["Key", "it"]]),
            ],
        );

        Fixture {
            project: Arc::new(project),
            book,
            dir,
        }
    }

    fn read_json(path: &Path) -> Translations {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_header_languages() {
        let sheet = rows(&[&["Key", "de-DE", "", "fr"], &["a", "b", "c", "d"]]);
        assert_eq!(header_languages(&sheet), vec!["de-DE", "fr"]);
        assert!(header_languages(&[]).is_empty());
    }

    #[test]
    fn test_collect_translations_selected_columns_only() {
        let sheet = rows(&[
            &["Key", "de-DE", "fr-FR"],
            &["hello", "Hallo", "Bonjour"],
            &["", "ignored", "ignored"],
            &["bye", "", "Au revoir"],
        ]);

        let result =
            collect_translations(&sheet, &["DE-de".to_string()], &ImportContext::detached())
                .unwrap();

        assert_eq!(result.len(), 1);
        let german = &result["DE-de"];
        assert_eq!(german.len(), 1);
        assert_eq!(german["hello"], "Hallo");
    }

    #[test]
    fn test_collect_translations_honours_cancellation() {
        let mut data = vec![vec!["Key".to_string(), "de".to_string()]];
        for i in 0..200 {
            data.push(vec![format!("k{}", i), "v".to_string()]);
        }
        let (tx, _rx) = channel();
        let context = ImportContext::new(Arc::new(AtomicBool::new(true)), tx);

        let result = collect_translations(&data, &["de".to_string()], &context);
        assert!(matches!(result, Err(ImportError::Cancelled)));
    }

    #[test]
    fn test_merge_resource_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Resources").join("Strings.de.json");

        let mut first = Translations::new();
        first.insert("hello".into(), "Hallo".into());
        first.insert("bye".into(), "Tschüss".into());
        assert_eq!(merge_resource_file(&path, &first).unwrap(), 2);

        let mut second = Translations::new();
        second.insert("hello".into(), "Servus".into());
        assert_eq!(merge_resource_file(&path, &second).unwrap(), 1);

        let content: Translations =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["hello"], "Servus");
        assert_eq!(content["bye"], "Tschüss");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_unreadable_workbook_detects_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, b"not a workbook").unwrap();
        let project = Project::new("Demo", "en", dir.path().join("demo.toml"));

        let backend = WorkbookBackend::new();
        assert!(backend.detect_file_groups(&project, &path).is_none());
        assert!(backend.detect_languages(&path).is_none());
    }

    #[test]
    fn test_detection_on_real_workbook() {
        let fx = fixture();
        let backend = WorkbookBackend::new();

        let groups = backend.detect_file_groups(&fx.project, &fx.book).unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Strings", "Menus", "Extra"]);
        // Known groups come back as the project's own definition
        assert_eq!(groups[0].directory, PathBuf::from("Resources"));
        assert_eq!(groups[0].checksum(), fx.project.file_groups[0].checksum());

        let languages = backend.detect_languages(&fx.book).unwrap();
        assert_eq!(languages, vec!["de-DE", "fr", "it"]);
    }

    #[test]
    fn test_process_merges_into_resource_files() {
        let fx = fixture();
        let existing = fx.dir.path().join("Resources").join("Strings.de-DE.json");
        fs::create_dir_all(existing.parent().unwrap()).unwrap();
        fs::write(&existing, r#"{"hello": "old", "bye": "Tschüss"}"#).unwrap();

        let request = ImportRequest {
            project: Arc::clone(&fx.project),
            source_path: fx.book.clone(),
            file_groups: fx.project.file_groups.clone(),
            language_codes: vec!["de-DE".into(), "fr".into()],
        };
        let (tx, rx) = channel();
        let context = ImportContext::new(Arc::new(AtomicBool::new(false)), tx);

        let summary = WorkbookBackend::new().process(&request, &context).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                file_groups: 2,
                languages: 2,
                entries: 4,
                files_written: 3,
            }
        );

        let german = read_json(&existing);
        assert_eq!(german["hello"], "Hallo");
        assert_eq!(german["bye"], "Tschüss");

        let french = read_json(&fx.dir.path().join("Resources").join("Strings.fr.json"));
        assert_eq!(french.len(), 2);
        assert_eq!(french["bye"], "Au revoir");

        let menus = read_json(&fx.dir.path().join("Menus.de-DE.json"));
        assert_eq!(menus["file"], "Datei");
        assert!(!fx.dir.path().join("Menus.fr.json").exists());

        let progress: Vec<String> = rx
            .try_iter()
            .map(|event| match event {
                WorkerEvent::Progress(text) => text,
                WorkerEvent::Finished(_) => panic!("processor must not report completion"),
            })
            .collect();
        assert!(progress.len() > 2);
        assert!(!progress[0].is_empty());
        assert_eq!(progress.last().map(String::as_str), Some(""));
    }

    #[test]
    fn test_process_fails_on_missing_sheet() {
        let fx = fixture();
        let request = ImportRequest {
            project: Arc::clone(&fx.project),
            source_path: fx.book.clone(),
            file_groups: vec![FileGroup::new("Dialogs")],
            language_codes: vec!["de-DE".into()],
        };

        match WorkbookBackend::new().process(&request, &ImportContext::detached()) {
            Err(ImportError::MissingSheet { group }) => assert_eq!(group, "Dialogs"),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(!fx.dir.path().join("Dialogs.de-DE.json").exists());
    }
}
