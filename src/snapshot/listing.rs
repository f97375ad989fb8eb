use std::fmt;

use crate::snapshot::{Entry, EntryKind};

/// Joins a reported path prefix and an entry's display name.
pub fn display_path(prefix: Option<&str>, display_name: &str) -> String {
    match prefix {
        Some(prefix) if prefix.ends_with('/') => format!("{prefix}{display_name}"),
        Some(prefix) => format!("{prefix}/{display_name}"),
        None => display_name.to_string(),
    }
}

/// Human readable dump of a snapshot, one entry per line, children sorted by
/// name.
pub struct Listing<'a> {
    root: &'a Entry,
}

impl Entry {
    pub fn listing(&self) -> Listing<'_> {
        Listing { root: self }
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entry(f, self.root, None)
    }
}

fn write_entry(f: &mut fmt::Formatter<'_>, entry: &Entry, prefix: Option<&str>) -> fmt::Result {
    let printed_name = display_path(prefix, entry.display_name());
    let modified = entry.modified().unix_seconds();

    match entry.kind() {
        EntryKind::File { size, checksum } => {
            write!(f, "{printed_name} (file, size: {size}, modified: {modified}")?;
            if let Some(checksum) = checksum {
                write!(f, ", checksum: {checksum}")?;
            }
            writeln!(f, ")")
        }
        EntryKind::Directory { children } => {
            writeln!(f, "{printed_name}/ (directory, modified: {modified})")?;
            let mut sorted = children.values().collect::<Vec<_>>();
            sorted.sort_by(|a, b| a.name().cmp(b.name()));
            sorted
                .into_iter()
                .try_for_each(|child| write_entry(f, child, Some(&printed_name)))
        }
        EntryKind::Other => writeln!(f, "{printed_name} (other)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Checksum;
    use filetime::FileTime;
    use rstest::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn entry(name: &str, modified: i64, kind: EntryKind) -> Entry {
        Entry::new(
            name.into(),
            name.to_string(),
            FileTime::from_unix_time(modified, 0),
            PathBuf::from("/").join(name),
            kind,
        )
    }

    #[rstest]
    #[case(None, "a", "a")]
    #[case(Some("dest"), "a", "dest/a")]
    #[case(Some("/"), "a", "/a")]
    fn display_path_joins_prefix(
        #[case] prefix: Option<&str>,
        #[case] name: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(display_path(prefix, name), expected);
    }

    #[test]
    fn listing_renders_tree_sorted_by_name() {
        let children = [
            entry(
                "b.txt",
                20,
                EntryKind::File {
                    size: 3,
                    checksum: None,
                },
            ),
            entry("a-link", 30, EntryKind::Other),
        ]
        .into_iter()
        .map(|child| (child.name().to_os_string(), child))
        .collect();
        let root = entry("root", 10, EntryKind::Directory { children });

        assert_eq!(
            root.listing().to_string(),
            "root/ (directory, modified: 10)\n\
             root/a-link (other)\n\
             root/b.txt (file, size: 3, modified: 20)\n"
        );
    }

    #[test]
    fn listing_includes_checksum_when_present() {
        let checksum = Checksum::from_reader(&mut Cursor::new(b"abc".to_vec()))
            .expect("Failed to checksum content");
        let file = entry(
            "f",
            5,
            EntryKind::File {
                size: 3,
                checksum: Some(checksum),
            },
        );

        assert_eq!(
            file.listing().to_string(),
            format!("f (file, size: 3, modified: 5, checksum: {checksum})\n")
        );
    }
}
