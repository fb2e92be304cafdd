/// Every ancestor of `path` from the top down, ending with `path`
/// itself. Empty components collapse, so the enumeration is bounded by
/// the path's own depth and never walks above the filesystem root.
///
/// For example:
/// ```text
/// "/a/b/c" -> ["/a", "/a/b", "/a/b/c"]
/// "a/b"    -> ["a", "a/b"]
/// "/"      -> []
/// ```
pub fn ancestors(path: &str) -> Vec<String> {
    let mut ancestors = Vec::new();
    let mut current = if path.starts_with('/') {
        String::from("/")
    } else {
        String::new()
    };

    for component in path.split('/').filter(|c| !c.is_empty()) {
        if !current.is_empty() && !current.ends_with('/') {
            current.push('/');
        }
        current.push_str(component);
        ancestors.push(current.clone());
    }

    ancestors
}

/// Parent directory of a path, `None` for a bare name.
pub fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    let (parent, _) = trimmed.rsplit_once('/')?;
    if parent.is_empty() {
        Some("/")
    } else {
        Some(parent)
    }
}

/// Last component of a path.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed
        .rsplit_once('/')
        .map(|(_, name)| name)
        .unwrap_or(trimmed)
}

/// Join a directory and an entry name into a key, trimmed of
/// leading and trailing separators.
pub fn join_key(directory: &str, name: &str) -> String {
    format!("{}/{}", directory, name)
        .trim_matches('/')
        .to_owned()
}
