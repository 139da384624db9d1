//! URL-safe identifiers derived from human titles.

use std::collections::HashSet;

/// Turn a title into a slug: lowercase, apostrophes dropped, every run of
/// characters outside `[a-z0-9]` collapsed into a single `-`, no leading or
/// trailing `-`.
///
/// ```text
/// "Larry’s Spot"  -> "larrys-spot"
/// "  A -- B!  "   -> "a-b"
/// ```
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for c in lowered.chars() {
        match c {
            '\'' | '’' => {}
            'a'..='z' | '0'..='9' => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            }
            _ => pending_dash = true,
        }
    }

    slug
}

/// Pick `desired` if it is free, otherwise the first free `desired-N` for
/// `N = 2, 3, ...`. An empty `desired` is replaced by `fallback`.
pub fn unique_slug(desired: &str, existing: &HashSet<String>, fallback: &str) -> String {
    let base = if desired.is_empty() { fallback } else { desired };
    if !existing.contains(base) {
        return base.to_string();
    }

    let mut n = 2u32;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
