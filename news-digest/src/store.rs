use crate::types::{AggregatorError, ArticleRecord, Result, STORE_COLUMNS};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Append-only CSV table of accepted articles.
///
/// One writer per process; nothing guards against two pipelines appending to
/// the same file at once.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the file exists with at least a header row.
    pub fn exists(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() > 0).unwrap_or(false)
    }

    /// Fail unless the store is missing or carries exactly the
    /// `Title,Link,Source,Published,Summary` header.
    ///
    /// Files written with another column layout stay readable for titles but
    /// must never be appended to.
    pub fn verify_layout(&self) -> Result<()> {
        if !self.exists() {
            return Ok(());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?;
        if headers.iter().map(str::trim).eq(STORE_COLUMNS) {
            return Ok(());
        }

        Err(AggregatorError::IncompatibleStore {
            path: self.path.display().to_string(),
            found: headers.iter().map(str::to_string).collect(),
        })
    }

    /// Every stored title, in file order. A missing store has no titles.
    pub fn load_existing_titles(&self) -> Result<Vec<String>> {
        if !self.exists() {
            debug!("No record store at {}, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        // Located by name so rows with an unreadable date still count as seen
        let title_idx = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == STORE_COLUMNS[0])
            .ok_or_else(|| {
                AggregatorError::Parse(format!("{} has no {} column", self.path.display(), STORE_COLUMNS[0]))
            })?;

        let mut titles = Vec::new();
        for row in reader.records() {
            let row = row?;
            if let Some(title) = row.get(title_idx) {
                titles.push(title.to_string());
            }
        }

        debug!("Loaded {} stored titles from {}", titles.len(), self.path.display());
        Ok(titles)
    }

    /// Every stored record, in file order.
    pub fn load_all(&self) -> Result<Vec<ArticleRecord>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader.deserialize().collect::<std::result::Result<Vec<ArticleRecord>, _>>()?;
        Ok(records)
    }

    /// Append a batch, writing the header first if the store is new.
    ///
    /// The whole batch is encoded before the file is touched and then written
    /// in one call, so an invalid record leaves the store as it was.
    pub fn append(&self, records: &[ArticleRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        for record in records {
            if record.title.trim().is_empty() {
                return Err(AggregatorError::InvalidRecord(format!("empty title for {}", record.link)));
            }
            if record.summary.trim().is_empty() {
                return Err(AggregatorError::InvalidRecord(format!("empty summary for {:?}", record.title)));
            }
        }

        let needs_header = !self.exists();
        let mut buf = Vec::new();
        if !needs_header {
            self.verify_layout()?;
            // A hand-edited last row may lack its terminator
            if !self.ends_with_newline()? {
                buf.push(b'\n');
            }
        }

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(buf);
        if needs_header {
            writer.write_record(STORE_COLUMNS)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        let encoded = writer.into_inner().map_err(|e| AggregatorError::Io(e.into_error()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(&encoded)?;
        file.sync_data()?;

        info!(
            "Appended {} records to {}{}",
            records.len(),
            self.path.display(),
            if needs_header { " (new store)" } else { "" }
        );
        Ok(records.len())
    }

    fn ends_with_newline(&self) -> Result<bool> {
        let mut file = File::open(&self.path)?;
        if file.metadata()?.len() == 0 {
            return Ok(true);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] == b'\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(title: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            link: format!("https://example.com/{}", title.replace(' ', "-")),
            source: "BBC".to_string(),
            published: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            summary: "A short summary.".to_string(),
        }
    }

    fn line_count(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn test_missing_store_has_no_titles() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("News.csv"));
        assert!(store.load_existing_titles().unwrap().is_empty());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_first_append_creates_header_plus_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("News.csv");
        let store = RecordStore::new(&path);

        assert_eq!(store.append(&[record("Oil prices surge"), record("Gas shortage")]).unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Title,Link,Source,Published,Summary\n"));
        assert_eq!(line_count(&path), 3);
        assert_eq!(store.load_existing_titles().unwrap(), vec!["Oil prices surge", "Gas shortage"]);
    }

    #[test]
    fn test_append_never_rewrites_prior_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("News.csv");
        let store = RecordStore::new(&path);

        store.append(&[record("First story")]).unwrap();
        let before = fs::read(&path).unwrap();

        store.append(&[record("Second story"), record("Third story")]).unwrap();
        let after = fs::read(&path).unwrap();

        assert!(after.starts_with(&before));
        assert_eq!(line_count(&path), 4);
        assert_eq!(store.load_all().unwrap().len(), 3);
    }

    #[test]
    fn test_round_trips_awkward_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("News.csv"));
        let mut awkward = record("Oil, gas and \"energy\" prices");
        awkward.summary = "Line one,\nline two.".to_string();

        store.append(&[awkward.clone()]).unwrap();
        assert_eq!(store.load_all().unwrap(), vec![awkward]);
    }

    #[test]
    fn test_empty_batch_does_not_create_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("News.csv");
        let store = RecordStore::new(&path);
        assert_eq!(store.append(&[]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_record_rejects_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("News.csv");
        let store = RecordStore::new(&path);
        store.append(&[record("Kept")]).unwrap();
        let before = fs::read(&path).unwrap();

        let mut blank = record("Blank summary");
        blank.summary = "  ".to_string();
        let result = store.append(&[record("Would be fine"), blank]);

        assert!(matches!(result, Err(AggregatorError::InvalidRecord(_))));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_titles_load_from_store_with_other_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("News.csv");
        fs::write(&path, "Source,Title,Link,Summary\nBBC,Old story,https://x,Old summary\n").unwrap();

        let store = RecordStore::new(&path);
        assert_eq!(store.load_existing_titles().unwrap(), vec!["Old story"]);
    }

    #[test]
    fn test_append_refuses_store_with_other_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("News.csv");
        fs::write(&path, "Source,Title,Link,Summary\nBBC,Old story,https://x,Old summary\n").unwrap();
        let before = fs::read(&path).unwrap();
        let store = RecordStore::new(&path);

        let err = store.append(&[record("New story")]).unwrap_err();
        assert!(matches!(err, AggregatorError::IncompatibleStore { ref found, .. } if found.len() == 4));
        assert_eq!(err.kind(), crate::types::FailureKind::Storage);
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(store.load_existing_titles().unwrap(), vec!["Old story"]);
    }

    #[test]
    fn test_append_after_unterminated_last_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("News.csv");
        let store = RecordStore::new(&path);
        store.append(&[record("First story")]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, content.trim_end_matches('\n')).unwrap();

        store.append(&[record("Second story")]).unwrap();
        store.append(&[record("Third story")]).unwrap();

        assert_eq!(
            store.load_existing_titles().unwrap(),
            vec!["First story", "Second story", "Third story"]
        );
        assert_eq!(store.load_all().unwrap().len(), 3);
    }

    #[test]
    fn test_append_after_header_only_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("News.csv");
        fs::write(&path, "Title,Link,Source,Published,Summary").unwrap();
        let store = RecordStore::new(&path);

        store.append(&[record("Only story")]).unwrap();
        assert_eq!(line_count(&path), 2);
        assert_eq!(store.load_existing_titles().unwrap(), vec!["Only story"]);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("News.csv");
        let store = RecordStore::new(&path);
        store.append(&[record("Nested")]).unwrap();
        assert!(path.exists());
    }
}
