//! Constants and configuration for the prefix trie

/// Bit width of an IPv4 key.
pub const V4_BITS: u8 = 32;
/// Bit width of an IPv6 key; also the width of the internal key word.
pub const V6_BITS: u8 = 128;

/// Arena slots reserved up front by `PrefixTrie::new`.
pub const DEFAULT_CAPACITY: usize = 1_024;
