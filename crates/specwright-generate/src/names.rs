//! Collision-free names for clones.

use specwright_common::constants::CLONE_SUFFIX;
use specwright_runtime::Runtime;

/// Which namespace of names to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// Container names.
    Container,
    /// Pod names.
    Pod,
}

fn taken(runtime: &Runtime, kind: NameKind, name: &str) -> bool {
    match kind {
        NameKind::Container => runtime.containers().lookup_container(name).is_ok(),
        NameKind::Pod => runtime.pods().lookup_pod(name).is_ok(),
    }
}

/// Returns a name for a clone of `name` that is not in use.
///
/// A name without the `-clone` marker gets it appended and is returned
/// without a lookup. Otherwise the number after the marker is incremented
/// until a free name is found; `x-clone` is first tried as `x-clone1`.
/// A number too large to increment is kept and counting restarts after it.
#[must_use]
pub fn check_name(runtime: &Runtime, name: &str, kind: NameKind) -> String {
    let Some(pos) = name.find(CLONE_SUFFIX) else {
        return format!("{name}{CLONE_SUFFIX}");
    };
    let ind = pos + CLONE_SUFFIX.len();
    let parsed = name[ind..].parse::<i64>();
    let num = parsed.as_ref().map_or(0, |n| *n);

    let mut base = name.to_string();
    if num == 0 && parsed.is_err() {
        let first = format!("{base}1");
        if !taken(runtime, kind, &first) {
            return first;
        }
    } else {
        base.truncate(ind);
    }

    let mut count = num;
    loop {
        count = match count.checked_add(1) {
            Some(next) => next,
            None => {
                base = name.to_string();
                1
            }
        };
        let candidate = format!("{base}{count}");
        tracing::debug!(candidate = %candidate, ?kind, "trying clone name");
        if !taken(runtime, kind, &candidate) {
            return candidate;
        }
    }
}
