//! The history log (§4.C): an append-only, verbatim record of every
//! accepted announcement and withdrawal, used as the source of truth for
//! disaggregation.

use crate::addr::Addr;
use crate::wire::{UpdateAnnounce, WithdrawEntry};

/// Two append-only sequences, kept in arrival order and never mutated.
#[derive(Debug, Default)]
pub struct History {
    announcements: Vec<(UpdateAnnounce, Addr)>,
    withdrawals: Vec<(Vec<WithdrawEntry>, Addr)>,
}

impl History {
    pub fn push_announce(&mut self, announce: UpdateAnnounce, next_hop: Addr) {
        self.announcements.push((announce, next_hop));
    }

    pub fn push_withdraw(&mut self, withdrawn: Vec<WithdrawEntry>, src_neighbor: Addr) {
        self.withdrawals.push((withdrawn, src_neighbor));
    }

    pub fn announcements(&self) -> impl Iterator<Item = &(UpdateAnnounce, Addr)> {
        self.announcements.iter()
    }

    pub fn withdrawals(&self) -> impl Iterator<Item = &(Vec<WithdrawEntry>, Addr)> {
        self.withdrawals.iter()
    }
}
