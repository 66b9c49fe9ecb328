use serde::Deserialize;

/// One child of a remote directory, as reported by a listing call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteEntry {
    /// Device path of the entry, usually with a leading `/`.
    pub uri: String,
    pub name: String,
    #[serde(rename = "isDirectory", default)]
    pub is_directory: bool,
    /// Byte size when the device reports one.
    #[serde(default)]
    pub size: Option<u64>,
    /// Display date, passed through untouched.
    #[serde(default)]
    pub date: Option<String>,
}

impl RemoteEntry {
    pub fn file(uri: impl Into<String>, size: Option<u64>) -> Self {
        let uri = uri.into();
        Self {
            name: entry_name(&uri),
            uri,
            is_directory: false,
            size,
            date: None,
        }
    }

    pub fn directory(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        Self {
            name: entry_name(&uri),
            uri,
            is_directory: true,
            size: None,
            date: None,
        }
    }

    /// The URI with its leading separator stripped, as used for recursion
    /// and URL building.
    pub fn relative_uri(&self) -> &str {
        self.uri.trim_start_matches('/')
    }

    /// True if this entry lies strictly below `directory` and its URI has
    /// no `.` or `..` segments. Only such entries are safe to recurse
    /// into: each step then adds at least one path segment.
    pub fn is_below(&self, directory: &str) -> bool {
        let directory = directory.trim_matches('/');
        let uri = self.uri.trim_matches('/');

        let rest = if directory.is_empty() {
            uri
        } else {
            match uri.strip_prefix(directory).and_then(|r| r.strip_prefix('/')) {
                Some(rest) => rest,
                None => return false,
            }
        };

        let mut segments = rest.split('/').filter(|s| !s.is_empty()).peekable();
        segments.peek().is_some() && segments.all(|s| s != "." && s != "..")
    }
}

fn entry_name(uri: &str) -> String {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_owned()
}

/// The JSON payload embedded in a directory listing page.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    #[serde(rename = "fileList")]
    pub file_list: Vec<RemoteEntry>,
}

impl Listing {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Split a listing into its files and subdirectories, preserving listing order.
pub fn partition(entries: Vec<RemoteEntry>) -> (Vec<RemoteEntry>, Vec<RemoteEntry>) {
    entries.into_iter().partition(|entry| !entry.is_directory)
}
