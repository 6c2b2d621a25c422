//! URL construction for the listing/content API.

use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;

/// Builds request URLs for every route of the file service.
///
/// The `path` query parameter is always percent-encoded (spaces become
/// `%20`, `/` becomes `%2F`), and an empty path addresses the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base: Url,
}

impl ApiEndpoints {
    /// Parses and validates the server base URL (`http` or `https`).
    ///
    /// A path prefix on the base URL is preserved, so
    /// `http://host/share` yields `http://host/share/api/files?...`.
    pub fn new(base_url: &str) -> CoreResult<Self> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| CoreError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(CoreError::InvalidUrl(format!(
                "{base_url}: expected an http(s) url"
            )));
        }
        Ok(Self { base })
    }

    /// `GET /api/files`: directory listing.
    pub fn files(&self, path: &str) -> Url {
        self.endpoint("files", path)
    }

    /// `GET /api/view`: raw content used for previews.
    pub fn view(&self, path: &str) -> Url {
        self.endpoint("view", path)
    }

    /// `GET /api/thumb`: thumbnail image bytes.
    pub fn thumb(&self, path: &str) -> Url {
        self.endpoint("thumb", path)
    }

    /// `GET /api/download`: single file as an attachment.
    pub fn download(&self, path: &str) -> Url {
        self.endpoint("download", path)
    }

    /// `GET /api/download_folder`: directory as a zip archive.
    pub fn download_folder(&self, path: &str) -> Url {
        self.endpoint("download_folder", path)
    }

    /// Picks the download route matching the entry type.
    pub fn download_for(&self, entry: &FileEntry) -> Url {
        if entry.is_dir() {
            self.download_folder(entry.path())
        } else {
            self.download(entry.path())
        }
    }

    fn endpoint(&self, route: &str, path: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}/api/{route}"));
        url.set_query(Some(&format!("path={}", urlencoding::encode(path))));
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> ApiEndpoints {
        ApiEndpoints::new("http://127.0.0.1:8000").unwrap()
    }

    #[test]
    fn root_listing_has_empty_path() {
        assert_eq!(
            endpoints().files("").as_str(),
            "http://127.0.0.1:8000/api/files?path="
        );
    }

    #[test]
    fn path_is_percent_encoded() {
        let url = endpoints().view("My Photos/été & co.jpg");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/api/view?path=My%20Photos%2F%C3%A9t%C3%A9%20%26%20co.jpg"
        );
    }

    #[test]
    fn each_route_has_its_own_endpoint() {
        let e = endpoints();
        assert!(e.thumb("a").as_str().ends_with("/api/thumb?path=a"));
        assert!(e.download("a").as_str().ends_with("/api/download?path=a"));
        assert!(e
            .download_folder("a")
            .as_str()
            .ends_with("/api/download_folder?path=a"));
    }

    #[test]
    fn base_path_prefix_is_preserved() {
        let e = ApiEndpoints::new("https://nas.local/share/").unwrap();
        assert_eq!(
            e.files("docs").as_str(),
            "https://nas.local/share/api/files?path=docs"
        );
    }

    #[test]
    fn download_for_picks_route_by_entry_type() {
        let e = endpoints();
        let dir = FileEntry::new("music", "music", true, 0, None, None);
        let file = FileEntry::new("music/a.mp3", "a.mp3", false, 3, None, None);

        assert!(e.download_for(&dir).as_str().contains("/api/download_folder?"));
        assert!(e.download_for(&file).as_str().contains("/api/download?"));
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(
            ApiEndpoints::new("ftp://example.com"),
            Err(CoreError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiEndpoints::new("not a url"),
            Err(CoreError::InvalidUrl(_))
        ));
    }
}
