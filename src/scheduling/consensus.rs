/// Strips whitespace and clock decoration (시/분/:) so "목요일 19:00" and
/// "목요일 19시" compare equal.
pub fn strip_time_decoration(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '시' && *c != '분' && *c != ':')
        .collect()
}

/// Picks the candidate the group actually confirmed.
///
/// `history` is the transcript in arrival order and is scanned newest-first;
/// within a message candidates are tested in list order. The first candidate
/// contained (after decoration stripping) in the first message containing
/// any candidate wins. With no match anywhere the earliest-listed candidate
/// is the default. Returns None only for an empty candidate list.
pub fn select_final<'a>(candidates: &'a [String], history: &[String]) -> Option<&'a str> {
    let first = candidates.first()?;
    let stripped: Vec<String> = candidates
        .iter()
        .map(|candidate| strip_time_decoration(candidate))
        .collect();

    for message in history.iter().rev() {
        let message = strip_time_decoration(message);
        for (candidate, pattern) in candidates.iter().zip(&stripped) {
            if message.contains(pattern.as_str()) {
                return Some(candidate);
            }
        }
    }
    Some(first)
}
