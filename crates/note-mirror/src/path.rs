use std::path::{Component, Path, PathBuf};

use url::Url;

/// Map a remote URI onto the local mirror.
///
/// The leading separator is stripped and the remainder is joined onto
/// `local_root`. `.`, `..` and root components are dropped so the result
/// always stays under `local_root`.
pub fn local_path(local_root: &Path, uri: &str) -> PathBuf {
    let relative = uri.trim_start_matches('/');
    let mut path = local_root.to_path_buf();

    for component in Path::new(relative).components() {
        if let Component::Normal(segment) = component {
            path.push(segment);
        }
    }

    path
}

/// Join a remote root and a device path into a request URL.
///
/// Each path segment is percent-encoded, so names containing `#`, `?`,
/// `%` or spaces address the file itself. An empty path addresses the
/// root.
pub fn remote_url(remote_root: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(remote_root)?;

    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));

    Ok(url)
}

/// True if a local path names a notebook file (`.note`, any case).
pub fn is_note_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("note"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_separator() {
        let root = Path::new("/mirror");
        assert_eq!(
            local_path(root, "/Note/a.note"),
            PathBuf::from("/mirror/Note/a.note")
        );
        assert_eq!(
            local_path(root, "Note/a.note"),
            PathBuf::from("/mirror/Note/a.note")
        );
    }

    #[test]
    fn mapping_is_deterministic() {
        let root = Path::new("out");
        assert_eq!(local_path(root, "/x/y"), local_path(root, "/x/y"));
    }

    #[test]
    fn parent_components_stay_inside_root() {
        let root = Path::new("/mirror");
        assert_eq!(
            local_path(root, "/../../etc/passwd"),
            PathBuf::from("/mirror/etc/passwd")
        );
        assert_eq!(
            local_path(root, "//Note/./a.note"),
            PathBuf::from("/mirror/Note/a.note")
        );
    }

    #[test]
    fn remote_url_joins_with_single_separator() {
        let cases = [
            ("http://10.0.0.2:8089", "/Note/a.note", "http://10.0.0.2:8089/Note/a.note"),
            ("http://10.0.0.2:8089/", "Note", "http://10.0.0.2:8089/Note"),
            ("http://10.0.0.2:8089/base", "Note/Sub/", "http://10.0.0.2:8089/base/Note/Sub"),
        ];
        for (root, path, expected) in cases {
            assert_eq!(remote_url(root, path).unwrap().as_str(), expected, "{path}");
        }
    }

    #[test]
    fn empty_remote_path_is_root() {
        assert_eq!(
            remote_url("http://10.0.0.2:8089", "").unwrap().as_str(),
            "http://10.0.0.2:8089/"
        );
        assert_eq!(
            remote_url("http://10.0.0.2:8089", "/").unwrap().as_str(),
            "http://10.0.0.2:8089/"
        );
    }

    #[test]
    fn reserved_characters_are_encoded() {
        let cases = [
            ("/Note/Meeting #3.note", "/Note/Meeting%20%233.note"),
            ("/Note/what?.note", "/Note/what%3F.note"),
            ("/Note/100%.note", "/Note/100%25.note"),
            ("/My Notes/a b.note", "/My%20Notes/a%20b.note"),
        ];
        for (path, expected) in cases {
            let url = remote_url("http://10.0.0.2:8089", path).unwrap();
            assert_eq!(url.path(), expected, "{path}");
            assert_eq!(url.query(), None);
            assert_eq!(url.fragment(), None);
        }
    }

    #[test]
    fn unparseable_root_is_an_error() {
        assert!(remote_url("not a url", "Note").is_err());
    }

    #[test]
    fn note_extension_is_case_insensitive() {
        assert!(is_note_file(Path::new("a.note")));
        assert!(is_note_file(Path::new("dir/B.NOTE")));
        assert!(!is_note_file(Path::new("a.pdf")));
        assert!(!is_note_file(Path::new("note")));
    }
}
