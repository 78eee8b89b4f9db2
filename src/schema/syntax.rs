//! Action syntax lists (`moose-app --syntax`).

/// Parse a newline-delimited action syntax listing.
///
/// Order is preserved. Wildcard leaf entries (lines ending in `*`), blank
/// lines and consecutive repeats are dropped; `\r` line endings are accepted.
pub fn load_action_syntax(text: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r').trim();
        if line.is_empty() || line.ends_with('*') {
            continue;
        }
        if paths.last().is_some_and(|prev| prev == line) {
            continue;
        }
        paths.push(line.to_string());
    }
    paths
}
