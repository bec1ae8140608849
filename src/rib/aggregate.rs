//! The aggregation engine (§4.E): merge adjacent, attribute-identical
//! entries into a shorter prefix, to a fixed point.

use super::RouteEntry;

/// Run one full aggregation pass to the fixed point. Mutates `entries` in
/// place. Must be called after every RIB mutation (update, withdraw,
/// disaggregate) so no two entries are left simultaneously adjacent and
/// attribute-identical.
pub fn aggregate(entries: &mut Vec<RouteEntry>) {
    loop {
        entries.sort_by(|a, b| {
            (a.prefix.network.0, a.prefix.length).cmp(&(b.prefix.network.0, b.prefix.length))
        });

        let mut merged_any = false;
        let mut i = 0;
        while i + 1 < entries.len() {
            if let Some(merged) = try_merge(&entries[i], &entries[i + 1]) {
                entries.splice(i..=i + 1, std::iter::once(merged));
                merged_any = true;
                // Re-check the freshly merged entry against its new neighbor
                // rather than advancing, since merges cascade across
                // lengths.
            } else {
                i += 1;
            }
        }

        if !merged_any {
            break;
        }
    }
}

/// Are `r1` and `r2` the two halves of the same, one-bit-shorter
/// super-prefix, with identical attributes? Assumes `r1.network <=
/// r2.network` (the caller keeps `entries` sorted).
///
/// A matching `2^(32-L)` delta alone isn't sufficient: `192.168.1.0/24` and
/// `192.168.2.0/24` are also that far apart but aren't siblings under any
/// common `/23`. `r1` must additionally be the *aligned* (lower) half, i.e.
/// its `L`th bit (counting from the top) must be clear.
fn mergeable(r1: &RouteEntry, r2: &RouteEntry) -> bool {
    let length = r1.prefix.length;
    if length == 0 || length != r2.prefix.length {
        return false;
    }
    if !r1.same_attributes(r2) {
        return false;
    }
    let sibling_delta = 1u32.checked_shl(32 - u32::from(length));
    match sibling_delta {
        Some(delta) => {
            r2.prefix.network.0.wrapping_sub(r1.prefix.network.0) == delta
                && r1.prefix.network.0 & delta == 0
        }
        None => false,
    }
}

fn try_merge(r1: &RouteEntry, r2: &RouteEntry) -> Option<RouteEntry> {
    if !mergeable(r1, r2) {
        return None;
    }
    let sibling_bit = 1u32 << (32 - u32::from(r1.prefix.length));
    let mut merged = r1.clone();
    merged.prefix.length -= 1;
    merged.prefix.network.0 &= !sibling_bit;
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::{to_int, Addr, Prefix};
    use crate::rib::Origin;

    fn entry(network: &str, length: u8, next_hop: u32) -> RouteEntry {
        RouteEntry {
            prefix: Prefix::new(Addr(to_int(network).unwrap()), length),
            next_hop: Addr(next_hop),
            local_pref: 100,
            as_path: vec![1],
            self_origin: false,
            origin: Origin::Igp,
        }
    }

    #[test]
    fn test_merges_adjacent_halves() {
        let mut entries = vec![
            entry("192.168.0.0", 24, 1),
            entry("192.168.1.0", 24, 1),
        ];
        aggregate(&mut entries);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prefix.length, 23);
        assert_eq!(entries[0].prefix.network, Addr(to_int("192.168.0.0").unwrap()));
    }

    #[test]
    fn test_does_not_merge_different_attributes() {
        let mut entries = vec![
            entry("192.168.0.0", 24, 1),
            entry("192.168.1.0", 24, 2),
        ];
        aggregate(&mut entries);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_does_not_merge_non_adjacent() {
        let mut entries = vec![
            entry("192.168.0.0", 24, 1),
            entry("192.168.2.0", 24, 1),
        ];
        aggregate(&mut entries);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_does_not_merge_unaligned_pair() {
        // .1 and .2 are the right distance apart for a /23 but are not the
        // two halves of the same one: /23 siblings are (.0,.1) and (.2,.3).
        let mut entries = vec![
            entry("192.168.1.0", 24, 1),
            entry("192.168.2.0", 24, 1),
        ];
        aggregate(&mut entries);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_cascading_merge_to_shorter_prefix() {
        let mut entries = vec![
            entry("192.168.0.0", 24, 1),
            entry("192.168.1.0", 24, 1),
            entry("192.168.2.0", 24, 1),
            entry("192.168.3.0", 24, 1),
        ];
        aggregate(&mut entries);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prefix.length, 22);
    }

    #[test]
    fn test_no_merge_at_length_zero() {
        let mut entries = vec![entry("0.0.0.0", 0, 1), entry("128.0.0.0", 0, 1)];
        aggregate(&mut entries);
        assert_eq!(entries.len(), 2);
    }
}
