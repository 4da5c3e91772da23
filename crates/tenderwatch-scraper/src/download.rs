//! Download directory observation and document adoption.
//!
//! A triggered download is identified purely by diffing directory listings
//! taken before and after the trigger. This is only sound while a single
//! download is in flight, which the session guarantees by owning the
//! directory and awaiting each download before starting the next.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tenderwatch_core::MultiFilePolicy;
use tokio::time::Instant;

/// Suffixes browsers use for downloads that are still being written
const IN_PROGRESS_SUFFIXES: [&str; 3] = [".crdownload", ".part", ".tmp"];

/// Download directory owned by one scrape session.
#[derive(Debug, Clone)]
pub struct DownloadDir {
    path: PathBuf,
}

impl DownloadDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.path).await
    }

    /// Names of completed files currently in the directory.
    pub async fn snapshot(&self) -> io::Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        let mut entries = tokio::fs::read_dir(&self.path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_settled(&name) {
                names.insert(name);
            }
        }

        Ok(names)
    }

    /// Existing document named `<stem>` or `<stem>.<ext>`, if any.
    pub async fn existing(&self, stem: &str) -> io::Result<Option<PathBuf>> {
        Ok(self
            .snapshot()
            .await?
            .into_iter()
            .find(|name| matches_stem(name, stem))
            .map(|name| self.path.join(name)))
    }

    /// Poll until a file absent from `before` appears, or `timeout` elapses.
    ///
    /// Returns every new name seen by the first poll that saw any.
    pub async fn wait_for_new(
        &self,
        before: &BTreeSet<String>,
        timeout: Duration,
        poll: Duration,
    ) -> io::Result<Vec<String>> {
        let deadline = Instant::now() + timeout;

        loop {
            let after = self.snapshot().await?;
            let new = new_files(before, &after);
            if !new.is_empty() {
                return Ok(new);
            }

            if Instant::now() >= deadline {
                return Ok(Vec::new());
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// Rename a downloaded file to `<stem><original extension>`.
    pub async fn adopt(&self, file_name: &str, stem: &str) -> io::Result<PathBuf> {
        let source = self.path.join(file_name);
        let destination = self.path.join(destination_name(file_name, stem));
        tokio::fs::rename(&source, &destination).await?;
        Ok(destination)
    }
}

/// Completed names present in `after` but not in `before`, sorted.
pub fn new_files(before: &BTreeSet<String>, after: &BTreeSet<String>) -> Vec<String> {
    after
        .difference(before)
        .filter(|name| is_settled(name))
        .cloned()
        .collect()
}

/// Choose the file to adopt from one poll's new names.
///
/// `Err` carries the names when the policy refuses to choose.
pub fn pick_new_file(
    mut new: Vec<String>,
    policy: MultiFilePolicy,
) -> std::result::Result<Option<String>, Vec<String>> {
    new.sort();
    match (new.len(), policy) {
        (0, _) => Ok(None),
        (1, _) | (_, MultiFilePolicy::TakeAny) => Ok(new.pop()),
        (_, MultiFilePolicy::Reject) => Err(new),
    }
}

/// `<stem>` plus the extension of `file_name` (with its dot), if it has one.
pub fn destination_name(file_name: &str, stem: &str) -> String {
    match Path::new(file_name).extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem.to_string(),
    }
}

fn matches_stem(name: &str, stem: &str) -> bool {
    if name == stem {
        return true;
    }
    name.strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|ext| !ext.is_empty() && !ext.contains('.'))
}

/// Hidden files and partial downloads are not yet documents.
fn is_settled(name: &str) -> bool {
    !name.starts_with('.')
        && !IN_PROGRESS_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_new_files_ignores_partial_downloads() {
        let before = set(&["a.pdf"]);
        let after = set(&["a.pdf", "b.pdf.crdownload", ".com.google.Chrome.x1", "c.pdf"]);
        assert_eq!(new_files(&before, &after), vec!["c.pdf"]);
    }

    #[test]
    fn test_pick_new_file_policies() {
        let two = vec!["z.pdf".to_string(), "b.pdf".to_string()];

        assert_eq!(
            pick_new_file(two.clone(), MultiFilePolicy::TakeAny),
            Ok(Some("z.pdf".to_string()))
        );
        assert_eq!(
            pick_new_file(two, MultiFilePolicy::Reject),
            Err(vec!["b.pdf".to_string(), "z.pdf".to_string()])
        );
        assert_eq!(
            pick_new_file(vec!["only.pdf".to_string()], MultiFilePolicy::Reject),
            Ok(Some("only.pdf".to_string()))
        );
        assert_eq!(pick_new_file(Vec::new(), MultiFilePolicy::TakeAny), Ok(None));
    }

    #[test]
    fn test_destination_name_keeps_extension() {
        assert_eq!(destination_name("notice (1).PDF", "T-1"), "T-1.PDF");
        assert_eq!(destination_name("archive.tar.gz", "T-1"), "T-1.gz");
        assert_eq!(destination_name("README", "T-1"), "T-1");
    }

    #[test]
    fn test_matches_stem() {
        assert!(matches_stem("T-1.pdf", "T-1"));
        assert!(matches_stem("T-1", "T-1"));
        assert!(matches_stem("TS.12.pdf", "TS.12"));
        assert!(!matches_stem("T-10.pdf", "T-1"));
        assert!(!matches_stem("T-1.old.pdf", "T-1"));
        assert!(!matches_stem("T-1.", "T-1"));
    }

    #[tokio::test]
    async fn test_adopt_renames_into_place() {
        let tmp = TempDir::new().expect("create temp dir");
        let dir = DownloadDir::new(tmp.path());
        tokio::fs::write(tmp.path().join("Tender_Notice.pdf"), b"%PDF")
            .await
            .unwrap();

        let adopted = dir.adopt("Tender_Notice.pdf", "T-7").await.unwrap();
        assert_eq!(adopted, tmp.path().join("T-7.pdf"));
        assert!(adopted.exists());
        assert!(!tmp.path().join("Tender_Notice.pdf").exists());
        assert_eq!(dir.existing("T-7").await.unwrap(), Some(adopted));
    }

    #[tokio::test]
    async fn test_wait_for_new_times_out_empty() {
        let tmp = TempDir::new().expect("create temp dir");
        let dir = DownloadDir::new(tmp.path());
        let before = dir.snapshot().await.unwrap();

        let new = dir
            .wait_for_new(&before, Duration::from_millis(20), Duration::from_millis(5))
            .await
            .unwrap();
        assert!(new.is_empty());
    }

    #[tokio::test]
    async fn test_wait_for_new_sees_late_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let dir = DownloadDir::new(tmp.path());
        let before = dir.snapshot().await.unwrap();

        let path = tmp.path().join("late.pdf");
        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            tokio::fs::write(path, b"%PDF").await.unwrap();
        });

        let new = dir
            .wait_for_new(&before, Duration::from_secs(5), Duration::from_millis(5))
            .await
            .unwrap();
        writer.await.unwrap();
        assert_eq!(new, vec!["late.pdf"]);
    }
}
