use std::cmp::Ordering;

/// Linear merge intersection into `out`.
#[inline]
pub fn intersect_sorted_into<T: Ord + Copy>(a: &[T], b: &[T], out: &mut Vec<T>) {
    out.clear();

    if a.is_empty() || b.is_empty() {
        return;
    }

    out.reserve(a.len().min(b.len()));

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
}

/// Owning wrapper around `intersect_sorted_into`.
#[inline]
pub fn intersect_sorted<T: Ord + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    intersect_sorted_into(a, b, &mut out);
    out
}

/// Intersect any number of sorted lists, smallest first.
///
/// Returns `None` when given no lists at all, so callers can tell
/// "unconstrained" apart from "nothing matched".
pub fn intersect_all<T: Ord + Copy>(mut lists: Vec<&[T]>) -> Option<Vec<T>> {
    if lists.is_empty() {
        return None;
    }
    lists.sort_unstable_by_key(|l| l.len());

    let mut acc = lists[0].to_vec();
    let mut scratch = Vec::new();
    for list in &lists[1..] {
        if acc.is_empty() {
            break;
        }
        intersect_sorted_into(&acc, list, &mut scratch);
        std::mem::swap(&mut acc, &mut scratch);
    }
    Some(acc)
}

/// Insert `id` into a sorted, deduplicated list.
#[inline]
pub fn insert_sorted<T: Ord + Copy>(list: &mut Vec<T>, id: T) {
    if let Err(pos) = list.binary_search(&id) {
        list.insert(pos, id);
    }
}

#[cfg(test)]
#[path = "helpers_tests.rs"]
mod tests;
