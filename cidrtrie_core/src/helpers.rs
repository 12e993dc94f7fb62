//! Bit helpers for left-aligned 128-bit keys
//!
//! Every key is stored with its most significant address bit in bit 127,
//! so an IPv4 address occupies the top 32 bits and bit `i` of the trie path
//! is always `get_bit(key, i)` regardless of family.

#[inline]
pub fn v4_key(addr: u32) -> u128 {
    (addr as u128) << 96
}

#[inline]
pub fn v4_addr(key: u128) -> u32 {
    (key >> 96) as u32
}

#[inline]
pub fn get_bit(key: u128, index: u8) -> u8 {
    debug_assert!(index <= 127);
    ((key >> (127 - index)) & 1) as u8
}

#[inline]
pub fn set_bit(key: u128, index: u8, bit: u8) -> u128 {
    debug_assert!(index <= 127);
    let m = 1u128 << (127 - index);
    if bit == 0 {
        key & !m
    } else {
        key | m
    }
}

#[inline]
pub fn mask(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else if prefix_len >= 128 {
        !0u128
    } else {
        !(!0u128 >> prefix_len)
    }
}

// Canonicalise a key: zero host bits beyond `plen`.
#[inline(always)]
pub fn canonical(key: u128, plen: u8) -> u128 {
    key & mask(plen)
}
