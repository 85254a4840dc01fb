pub mod hash_ring;
pub mod intrusive_list;
pub mod slot_arena;

pub use hash_ring::{HashRing, RingHash, default_hash};
pub use intrusive_list::IntrusiveList;
pub use slot_arena::{SlotArena, SlotId};
