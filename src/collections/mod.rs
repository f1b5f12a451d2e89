mod bitset;
mod slotmap;

pub use bitset::BitSet;
pub use slotmap::{Handle, SlotMap};
