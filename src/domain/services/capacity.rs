use crate::domain::entities::DutySlot;
use std::cmp::Ordering;

/// Point-in-time occupancy of one duty slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCapacity {
    pub slot: DutySlot,
    pub occupied: u32,
}

impl SlotCapacity {
    pub fn new(slot: DutySlot, occupied: u32) -> Self {
        Self { slot, occupied }
    }

    pub fn effective_capacity(&self) -> u32 {
        self.slot.effective_capacity()
    }

    pub fn remaining(&self) -> u32 {
        self.effective_capacity().saturating_sub(self.occupied)
    }

    pub fn has_room(&self) -> bool {
        self.remaining() > 0
    }

    /// Compares `occupied / effective_capacity` exactly.
    /// A closed slot (capacity 0) ranks above every open one.
    pub fn cmp_fill_ratio(&self, other: &Self) -> Ordering {
        let (a_occ, a_cap) = (self.occupied as u64, self.effective_capacity() as u64);
        let (b_occ, b_cap) = (other.occupied as u64, other.effective_capacity() as u64);

        match (a_cap, b_cap) {
            (0, 0) => Ordering::Equal,
            (0, _) => Ordering::Greater,
            (_, 0) => Ordering::Less,
            _ => (a_occ * b_cap).cmp(&(b_occ * a_cap)),
        }
    }

    /// Assignment preference: lowest fill ratio, then declared duty order, then slot id
    pub fn cmp_preference(&self, other: &Self) -> Ordering {
        self.cmp_fill_ratio(other)
            .then_with(|| self.slot.sort_order.cmp(&other.slot.sort_order))
            .then_with(|| self.slot.id.cmp(&other.slot.id))
    }
}

/// Sorts candidates most-preferred first
pub fn rank_candidates(candidates: &mut [SlotCapacity]) {
    candidates.sort_by(|a, b| a.cmp_preference(b));
}

/// Most-preferred slot that still has room
pub fn pick_open_slot(ranked: &[SlotCapacity]) -> Option<&SlotCapacity> {
    ranked.iter().find(|c| c.has_room())
}
