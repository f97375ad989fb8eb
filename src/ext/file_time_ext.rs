use filetime::FileTime;

/// Modified times are compared at whole-second resolution. Sub-second
/// precision does not survive every filesystem a tree may be mirrored onto.
pub trait FileTimeExt {
    fn same_second(&self, other: &FileTime) -> bool;
}

impl FileTimeExt for FileTime {
    fn same_second(&self, other: &FileTime) -> bool {
        self.unix_seconds() == other.unix_seconds()
    }
}
