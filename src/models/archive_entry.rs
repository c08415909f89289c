/// One member of a desktop tar archive, as recorded in its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

impl ArchiveEntry {
    pub fn new(raw_name: &str, is_dir: bool, size: u64) -> Self {
        let name = raw_name.strip_prefix("./").unwrap_or(raw_name);
        ArchiveEntry {
            name: name.trim_end_matches('/').to_string(),
            is_dir,
            size,
        }
    }

    pub fn kind(&self) -> &'static str {
        if self.is_dir {
            "dir"
        } else {
            "file"
        }
    }
}
