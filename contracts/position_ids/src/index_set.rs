//! 256-bit index sets.
//!
//! Slot `i` lives in bit `i % 8` of byte `31 - i / 8` (big-endian), so the
//! set `{0}` encodes as `0x00..01` and `{1}` as `0x00..02`.

use soroban_sdk::{BytesN, Env};

pub type IndexSet = [u8; 32];

pub const EMPTY: IndexSet = [0u8; 32];

pub fn to_bytes(env: &Env, set: &IndexSet) -> BytesN<32> {
    BytesN::from_array(env, set)
}

/// The set covering every slot of a condition with `slot_count` outcomes.
pub fn full(slot_count: u32) -> IndexSet {
    let mut set = EMPTY;
    for slot in 0..slot_count.min(256) {
        insert(&mut set, slot);
    }
    set
}

pub fn from_slots(slots: &[u32]) -> IndexSet {
    let mut set = EMPTY;
    for slot in slots {
        insert(&mut set, *slot);
    }
    set
}

pub fn insert(set: &mut IndexSet, slot: u32) {
    if slot < 256 {
        set[31 - (slot / 8) as usize] |= 1 << (slot % 8);
    }
}

pub fn contains(set: &IndexSet, slot: u32) -> bool {
    slot < 256 && set[31 - (slot / 8) as usize] & (1 << (slot % 8)) != 0
}

pub fn is_empty(set: &IndexSet) -> bool {
    set.iter().all(|byte| *byte == 0)
}

pub fn intersects(a: &IndexSet, b: &IndexSet) -> bool {
    a.iter().zip(b.iter()).any(|(x, y)| x & y != 0)
}

pub fn is_subset(set: &IndexSet, of: &IndexSet) -> bool {
    set.iter().zip(of.iter()).all(|(x, y)| x & !y == 0)
}

pub fn union(a: &IndexSet, b: &IndexSet) -> IndexSet {
    let mut out = EMPTY;
    for i in 0..32 {
        out[i] = a[i] | b[i];
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slot_layout_is_big_endian() {
        let set = from_slots(&[0, 9, 255]);
        assert_eq!(set[31], 0b0000_0001);
        assert_eq!(set[30], 0b0000_0010);
        assert_eq!(set[0], 0b1000_0000);
        assert!(contains(&set, 9));
        assert!(!contains(&set, 8));
    }

    #[test]
    fn test_full_set() {
        let binary = full(2);
        assert_eq!(binary[31], 0b11);
        assert!(is_empty(&{
            let mut rest = binary;
            rest[31] = 0;
            rest
        }));

        let max = full(256);
        assert!(max.iter().all(|byte| *byte == 0xff));
    }

    #[test]
    fn test_set_relations() {
        let a = from_slots(&[0, 1]);
        let b = from_slots(&[2]);
        let c = from_slots(&[1, 2]);

        assert!(!intersects(&a, &b));
        assert!(intersects(&a, &c));
        assert_eq!(union(&a, &b), full(3));
        assert!(is_subset(&a, &full(3)));
        assert!(!is_subset(&full(3), &a));
        assert!(is_empty(&EMPTY));
    }
}
