//! Content, thumbnail and download transfers.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;
use crate::remote::endpoints::ApiEndpoints;

/// Fetches raw entry content for previews and saves downloads to disk.
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    endpoints: ApiEndpoints,
    timeout: Duration,
}

impl ContentClient {
    /// `timeout` bounds preview and thumbnail fetches. Downloads are not
    /// time-bounded since archives of large folders take a while to stream.
    pub fn new(http: reqwest::Client, endpoints: ApiEndpoints, timeout: Duration) -> Self {
        Self {
            http,
            endpoints,
            timeout,
        }
    }

    /// Fetches the bytes served by `/api/view` for `path`.
    pub async fn fetch(&self, path: &str) -> CoreResult<Vec<u8>> {
        self.get_bytes(self.endpoints.view(path), path).await
    }

    /// Fetches the bytes served by `/api/thumb` for `path`.
    pub async fn thumbnail(&self, path: &str) -> CoreResult<Vec<u8>> {
        self.get_bytes(self.endpoints.thumb(path), path).await
    }

    /// Streams `entry` into `dest_dir` and returns the written file path.
    ///
    /// Files use `/api/download`; directories use `/api/download_folder` and
    /// are saved as `<name>.zip`. An existing file is never overwritten: a
    /// ` (n)` suffix is added to the stem instead.
    ///
    /// The body is written to `<target>.part` and renamed into place once
    /// the transfer completes. On any failure neither file is left behind.
    pub async fn download(&self, entry: &FileEntry, dest_dir: &Path) -> CoreResult<PathBuf> {
        let url = self.endpoints.download_for(entry);
        tracing::info!(%url, "starting download");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::ContentStatus {
                path: entry.path().to_string(),
                status: status.as_u16(),
            });
        }

        tokio::fs::create_dir_all(dest_dir).await?;
        let target = reserve_destination(dest_dir, &download_file_name(entry)).await?;
        let partial = partial_path(&target);

        match save_body(response, &partial, &target).await {
            Ok(written) => {
                tracing::info!(target = %target.display(), bytes = written, "download complete");
                Ok(target)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                let _ = tokio::fs::remove_file(&target).await;
                tracing::warn!(target = %target.display(), error = %e, "download aborted");
                Err(e)
            }
        }
    }

    async fn get_bytes(&self, url: url::Url, path: &str) -> CoreResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::ContentStatus {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Local file name for a downloaded entry, stripped of path separators.
fn download_file_name(entry: &FileEntry) -> String {
    let cleaned: String = entry
        .name()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    let base = match cleaned.as_str() {
        "" | "." | ".." => "download".to_string(),
        _ => cleaned,
    };
    if entry.is_dir() {
        format!("{base}.zip")
    } else {
        base
    }
}

/// Streams the body into `partial`, then moves it over `target`.
async fn save_body(response: reqwest::Response, partial: &Path, target: &Path) -> CoreResult<u64> {
    let mut file = tokio::fs::File::create(partial).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| CoreError::Transport(e.to_string()))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);
    tokio::fs::rename(partial, target).await?;
    Ok(written)
}

/// Claims the first free name among `file_name`, `stem (1).ext`, ...
///
/// The claim is an empty file created with `create_new`, so two downloads
/// of the same entry never pick the same target.
async fn reserve_destination(dir: &Path, file_name: &str) -> CoreResult<PathBuf> {
    let mut n = 0;
    loop {
        let candidate = numbered_name(dir, file_name, n);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

fn numbered_name(dir: &Path, file_name: &str, n: u32) -> PathBuf {
    if n == 0 {
        return dir.join(file_name);
    }
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => dir.join(format!("{stem} ({n}).{ext}")),
        _ => dir.join(format!("{file_name} ({n})")),
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::test_server::{spawn, Fixture};
    use std::fs;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn client(base: &str) -> ContentClient {
        ContentClient::new(
            reqwest::Client::new(),
            ApiEndpoints::new(base).unwrap(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn fetch_returns_view_bytes() {
        let base = spawn(Fixture::default().file("docs/a b.txt", b"hello")).await;

        let bytes = client(&base).fetch("docs/a b.txt").await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn fetch_missing_is_content_status() {
        let base = spawn(Fixture::default()).await;

        let err = client(&base).fetch("gone.png").await.unwrap_err();
        assert!(matches!(err, CoreError::ContentStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn thumbnail_returns_bytes() {
        let base = spawn(Fixture::default().file("p.jpg", &[0xff, 0xd8])).await;

        let bytes = client(&base).thumbnail("p.jpg").await.unwrap();
        assert_eq!(bytes, vec![0xff, 0xd8]);
    }

    #[tokio::test]
    async fn download_file_writes_to_destination() {
        let base = spawn(Fixture::default().file("music/song.mp3", b"ID3data")).await;
        let tmp = TempDir::new().unwrap();
        let entry = FileEntry::new("music/song.mp3", "song.mp3", false, 7, None, None);

        let target = client(&base).download(&entry, tmp.path()).await.unwrap();

        assert_eq!(target, tmp.path().join("song.mp3"));
        assert_eq!(fs::read(&target).unwrap(), b"ID3data");
    }

    #[tokio::test]
    async fn download_folder_is_saved_as_zip() {
        let base = spawn(Fixture::default().folder("music", b"PK\x03\x04")).await;
        let tmp = TempDir::new().unwrap();
        let entry = FileEntry::new("music", "music", true, 0, None, None);

        let target = client(&base).download(&entry, tmp.path()).await.unwrap();

        assert_eq!(target, tmp.path().join("music.zip"));
        assert_eq!(fs::read(&target).unwrap(), b"PK\x03\x04");
    }

    #[tokio::test]
    async fn download_does_not_overwrite_existing_file() {
        let base = spawn(Fixture::default().file("a.txt", b"new")).await;
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"old").unwrap();
        let entry = FileEntry::new("a.txt", "a.txt", false, 3, None, None);

        let target = client(&base).download(&entry, tmp.path()).await.unwrap();

        assert_eq!(target, tmp.path().join("a (1).txt"));
        assert_eq!(fs::read(tmp.path().join("a.txt")).unwrap(), b"old");
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[tokio::test]
    async fn download_failure_leaves_no_file() {
        let base = spawn(Fixture::default()).await;
        let tmp = TempDir::new().unwrap();
        let entry = FileEntry::new("missing.bin", "missing.bin", false, 0, None, None);

        let err = client(&base).download(&entry, tmp.path()).await.unwrap_err();

        assert!(matches!(err, CoreError::ContentStatus { status: 404, .. }));
        assert!(!tmp.path().join("missing.bin").exists());
    }

    /// Serves one response that promises more bytes than it sends.
    async fn spawn_truncating_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nhello")
                .await
                .unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn interrupted_download_leaves_no_file() {
        let base = spawn_truncating_server().await;
        let tmp = TempDir::new().unwrap();
        let entry = FileEntry::new("big.iso", "big.iso", false, 100, None, None);

        let err = client(&base).download(&entry, tmp.path()).await.unwrap_err();

        assert!(matches!(err, CoreError::Transport(_)));
        assert!(!tmp.path().join("big.iso").exists());
        assert!(!tmp.path().join("big.iso.part").exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn file_name_strips_separators() {
        let entry = FileEntry::new("x", "a/b\\c", false, 0, None, None);
        assert_eq!(download_file_name(&entry), "a_b_c");
    }

    #[tokio::test]
    async fn reserve_destination_without_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Makefile"), "").unwrap();
        assert_eq!(
            reserve_destination(tmp.path(), "Makefile").await.unwrap(),
            tmp.path().join("Makefile (1)")
        );
    }

    #[tokio::test]
    async fn reserved_names_are_not_handed_out_twice() {
        let tmp = TempDir::new().unwrap();
        let first = reserve_destination(tmp.path(), "a.txt").await.unwrap();
        let second = reserve_destination(tmp.path(), "a.txt").await.unwrap();
        assert_eq!(first, tmp.path().join("a.txt"));
        assert_eq!(second, tmp.path().join("a (1).txt"));
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/tmp/big.iso")),
            Path::new("/tmp/big.iso.part")
        );
    }
}
