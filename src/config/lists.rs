/// Split a comma-separated option value into its entries.
///
/// Entries are trimmed and empty entries are dropped, so `""` yields an
/// empty list rather than a single empty prefix that would match every file.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}
