//! The best-path selector (§4.F): longest-prefix match, tie-broken by the
//! BGP decision ladder.
//!
//! The ladder is expressed as a comparator over candidates already
//! restricted to the winning match length, the same shape as a BGP
//! decision-process chain (compare one criterion, fall through to the next
//! only on a tie).

use std::cmp::Ordering;

use crate::addr::Addr;

use super::RouteEntry;

/// Compare two equal-length-match candidates per the decision ladder.
/// `Greater` means `a` wins over `b`.
fn decision_cmp(a: &RouteEntry, b: &RouteEntry) -> Ordering {
    a.local_pref
        .cmp(&b.local_pref)
        .then_with(|| a.self_origin.cmp(&b.self_origin))
        .then_with(|| b.as_path.len().cmp(&a.as_path.len())) // shorter wins
        .then_with(|| a.origin.cmp(&b.origin))
        .then_with(|| b.next_hop.cmp(&a.next_hop)) // lower next_hop wins
}

/// Select the best route for `dest`, per §4.F.
///
/// Two distinct RIB entries can never compare equal under the full ladder
/// (including `next_hop`): that would mean they are attribute-identical,
/// which the aggregation fixed point (§4.E) rules out. When `decision_cmp`
/// alone does report a tie (same attributes, different next_hop is
/// impossible by construction; same attributes *and* next_hop means the
/// aggregation invariant was violated upstream), either candidate is an
/// equally valid answer — this is logged, not treated as an error.
pub fn best_path(entries: &[RouteEntry], dest: Addr) -> Option<&RouteEntry> {
    let best_length = entries
        .iter()
        .filter(|e| e.prefix.matches(dest))
        .map(|e| e.prefix.length)
        .max()?;

    let mut candidates = entries
        .iter()
        .filter(|e| e.prefix.length == best_length && e.prefix.matches(dest));

    let mut best = candidates.next()?;
    for candidate in candidates {
        match decision_cmp(candidate, best) {
            Ordering::Greater => best = candidate,
            Ordering::Equal => {
                log::trace!(
                    "best-path tie between indistinguishable entries for {}; aggregation should have merged these",
                    dest,
                );
            }
            Ordering::Less => {}
        }
    }
    Some(best)
}
