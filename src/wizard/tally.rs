use std::collections::BTreeMap;

use crate::model::{Event, EventKind};

/// Occurrences per (player, kind), counting only events attached to a player
pub fn tally(events: &[Event]) -> BTreeMap<(String, EventKind), u32> {
    let mut counts = BTreeMap::new();
    for event in events.iter().filter(|e| !e.player.is_empty()) {
        *counts.entry((event.player.clone(), event.event)).or_insert(0) += 1;
    }
    counts
}

/// Compact per-player summary such as `M:2 A:1`, in vocabulary order
pub fn badge(player: &str, counts: &BTreeMap<(String, EventKind), u32>) -> String {
    EventKind::stat_kinds()
        .filter_map(|kind| {
            let count = counts.get(&(player.to_string(), kind)).copied().unwrap_or(0);
            let code = kind.code()?;
            (count > 0).then(|| format!("{code}:{count}"))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
