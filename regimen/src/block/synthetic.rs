//! Names for anonymous `( ... )` groups.
//!
//! A group opened inside `parent` is called `parent/1`. If that name is
//! taken, the trailing number is bumped until a free one is found.

/// The first candidate name for a group opened inside `parent`.
pub fn first_child(parent: &str) -> String {
    format!("{}/1", parent)
}

/// The next candidate after `name`: `a/b/3` becomes `a/b/4`.
/// Returns `None` if `name` has no numeric suffix.
pub fn bump(name: &str) -> Option<String> {
    let (stem, suffix) = name.rsplit_once('/')?;
    let n: u64 = suffix.parse().ok()?;
    Some(format!("{}/{}", stem, n.checked_add(1)?))
}

/// Pick the first free synthetic name below `parent`.
pub fn fresh(parent: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = first_child(parent);
    while is_taken(&candidate) {
        match bump(&candidate) {
            Some(next) => candidate = next,
            None => break,
        }
    }
    candidate
}

/// Whether `name` looks like a generated group name.
pub fn is_synthetic(name: &str) -> bool {
    name.rsplit_once('/')
        .is_some_and(|(stem, n)| !stem.is_empty() && !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}
