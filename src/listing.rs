use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// A single line of a raw `LIST` reply, split into its fields.
///
/// Only `permissions` and `name` drive key enumeration; the remaining
/// fields are kept as the server reported them so callers can inspect
/// them without re-parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub permissions: String,
    pub links: String,
    pub owner: String,
    pub group: String,
    pub size: String,
    pub month: String,
    pub day: String,
    /// Time of day for recent entries, year otherwise.
    pub time: String,
    pub name: String,
}

impl DirectoryEntry {
    /// Plain files are the only entries projected into keys;
    /// directories and links are not.
    pub fn is_file(&self) -> bool {
        self.permissions.starts_with('-')
    }
}

/// Parse raw listing lines into entries keyed by name.
///
/// Lines are split on runs of whitespace into at most 9 fields, so a
/// name may contain spaces. The `total` summary line is not an entry.
/// A later line with an already-seen name overwrites the earlier
/// entry. Lines with fewer than 9 fields are skipped.
pub fn parse_raw_listing(
    lines: &[String],
) -> LinkedHashMap<String, DirectoryEntry> {
    let mut entries = LinkedHashMap::new();

    for line in lines {
        let fields = split_listing_line(line);
        if fields.first() == Some(&"total") {
            continue;
        }
        if fields.len() < 9 {
            if !line.trim().is_empty() {
                log::warn!("skipping malformed listing line: {:?}", line);
            }
            continue;
        }

        let entry = DirectoryEntry {
            permissions: fields[0].to_owned(),
            links: fields[1].to_owned(),
            owner: fields[2].to_owned(),
            group: fields[3].to_owned(),
            size: fields[4].to_owned(),
            month: fields[5].to_owned(),
            day: fields[6].to_owned(),
            time: fields[7].to_owned(),
            name: fields[8].to_owned(),
        };
        entries.insert(entry.name.clone(), entry);
    }

    entries
}

/// Split on whitespace runs into at most 9 fields; the 9th keeps the
/// rest of the line verbatim.
fn split_listing_line(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(9);
    let mut rest = line.trim_start();

    while fields.len() < 8 && !rest.is_empty() {
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        fields.push(rest);
    }

    fields
}
