/// Id allocation for boards, tasks and subtasks.
///
/// Ids are creation timestamps in milliseconds, bumped past every id already
/// in use within the same parent scope. Two creations in the same
/// millisecond therefore still get distinct ids, and ids sort by creation.
use std::collections::HashSet;

fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

fn smallest_unused(taken: &HashSet<u64>) -> u64 {
    (0..=u64::MAX).find(|id| !taken.contains(id)).unwrap_or(0)
}

/// Allocate an id that is not in `taken`. Falls back to the smallest free id
/// once `u64::MAX` is in use.
pub fn next_id<I>(taken: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let taken: HashSet<u64> = taken.into_iter().collect();
    let now = now_millis();
    match taken.iter().copied().max() {
        Some(max) if max >= now => max
            .checked_add(1)
            .unwrap_or_else(|| smallest_unused(&taken)),
        _ => now,
    }
}

/// Reassign ids that repeat within `items`. The first occurrence keeps its id.
/// Returns how many items were reassigned.
pub fn dedupe<T>(items: &mut [T], get: impl Fn(&T) -> u64, set: impl Fn(&mut T, u64)) -> usize {
    let mut taken: HashSet<u64> = items.iter().map(&get).collect();
    let mut max = taken.iter().copied().max().unwrap_or(0);
    let mut seen = HashSet::with_capacity(items.len());
    let mut reassigned = 0;
    for item in items.iter_mut() {
        if !seen.insert(get(item)) {
            let id = match max.checked_add(1) {
                Some(id) => {
                    max = id;
                    id
                }
                None => smallest_unused(&taken),
            };
            taken.insert(id);
            seen.insert(id);
            set(item, id);
            reassigned += 1;
        }
    }
    reassigned
}
