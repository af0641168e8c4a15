//! Bit-packed array for storing fixed-width palette indices in a compact `Vec<u64>`.
//!
//! Each element occupies exactly `bits` bits (0, 2, 4, 8, or 16). Every width
//! divides 64, so an element never straddles a word boundary and a word holds
//! `64 / bits` elements, lowest bits first.

/// A compact array where each element is stored using a fixed number of bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitPackedArray {
    /// Raw storage. Elements are packed into 64-bit words.
    data: Vec<u64>,
    /// Bits per element (0, 2, 4, 8, or 16).
    bits: u8,
    /// Total number of logical elements.
    len: usize,
}

impl BitPackedArray {
    /// Creates a new array with `len` elements, all initialized to zero.
    ///
    /// `bits` must be one of 0, 2, 4, 8, or 16.
    pub fn new(bits: u8, len: usize) -> Self {
        debug_assert!(
            Self::is_valid_width(bits),
            "bits must be 0, 2, 4, 8, or 16"
        );
        let word_count = if bits == 0 {
            0
        } else {
            len.div_ceil(Self::per_word(bits))
        };
        Self {
            data: vec![0u64; word_count],
            bits,
            len,
        }
    }

    /// Returns `true` if `bits` is a supported element width.
    pub fn is_valid_width(bits: u8) -> bool {
        matches!(bits, 0 | 2 | 4 | 8 | 16)
    }

    fn per_word(bits: u8) -> usize {
        64 / bits as usize
    }

    fn mask(&self) -> u64 {
        (1u64 << self.bits) - 1
    }

    /// Returns the value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len` in debug builds.
    pub fn get(&self, index: usize) -> u32 {
        debug_assert!(index < self.len, "index out of bounds");
        if self.bits == 0 {
            return 0;
        }
        let per_word = Self::per_word(self.bits);
        let word = index / per_word;
        let offset = (index % per_word) as u32 * u32::from(self.bits);
        ((self.data[word] >> offset) & self.mask()) as u32
    }

    /// Sets the value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len` in debug builds, or if `value` exceeds
    /// the maximum for the current bit width.
    pub fn set(&mut self, index: usize, value: u32) {
        debug_assert!(index < self.len, "index out of bounds");
        if self.bits == 0 {
            return;
        }
        debug_assert!(
            u64::from(value) <= self.mask(),
            "value {value} exceeds {}-bit capacity",
            self.bits
        );
        let per_word = Self::per_word(self.bits);
        let word = index / per_word;
        let offset = (index % per_word) as u32 * u32::from(self.bits);
        let mask = self.mask();
        self.data[word] &= !(mask << offset);
        self.data[word] |= (u64::from(value) & mask) << offset;
    }

    /// Unpacks every element into `out[..len]`.
    ///
    /// Walks the backing words once, which is much cheaper per element than
    /// repeated [`get`](Self::get) calls.
    pub fn unpack_all(&self, out: &mut [u32]) {
        if self.len == 0 {
            return;
        }
        self.unpack_range(out, 0, self.len - 1);
    }

    /// Unpacks at least the elements `start..=end` into the same positions of `out`.
    ///
    /// Whole words are decoded, so a few elements on either side of the range
    /// may also be written. Positions outside the touched words are left as-is.
    pub fn unpack_range(&self, out: &mut [u32], start: usize, end: usize) {
        debug_assert!(start <= end && end < self.len, "range out of bounds");
        debug_assert!(out.len() >= self.len, "output buffer too small");
        if self.bits == 0 {
            out[start..=end].fill(0);
            return;
        }

        let per_word = Self::per_word(self.bits);
        let mask = self.mask();
        let first_word = start / per_word;
        let last_word = end / per_word;

        for (word_index, &word) in self.data[first_word..=last_word].iter().enumerate() {
            let base = (first_word + word_index) * per_word;
            let count = per_word.min(self.len - base);
            let mut packed = word;
            for slot in &mut out[base..base + count] {
                *slot = (packed & mask) as u32;
                packed >>= self.bits;
            }
        }
    }

    /// Returns the number of bits per element.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Returns the number of logical elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the size of the backing storage in bytes (not counting struct overhead).
    pub fn storage_bytes(&self) -> usize {
        self.data.len() * 8
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;

    fn random_array(bits: u8, len: usize, seed: u64) -> BitPackedArray {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let mut arr = BitPackedArray::new(bits, len);
        let max = (1u32 << bits) - 1;
        for i in 0..len {
            arr.set(i, rng.gen_range(0..=max));
        }
        arr
    }

    #[test]
    fn test_zero_bit_array() {
        let arr = BitPackedArray::new(0, 100);
        assert_eq!(arr.get(0), 0);
        assert_eq!(arr.get(99), 0);
        assert_eq!(arr.storage_bytes(), 0);
    }

    #[test]
    fn test_set_does_not_disturb_neighbors() {
        let mut arr = BitPackedArray::new(4, 64);
        arr.set(10, 0xF);
        arr.set(11, 0x3);
        arr.set(10, 0x1);
        assert_eq!(arr.get(9), 0);
        assert_eq!(arr.get(10), 0x1);
        assert_eq!(arr.get(11), 0x3);
    }

    #[test]
    fn test_sixteen_bit_values() {
        let mut arr = BitPackedArray::new(16, 100);
        for i in 0..100 {
            arr.set(i, i as u32 * 600);
        }
        assert_eq!(arr.get(0), 0);
        assert_eq!(arr.get(99), 59_400);
    }

    #[test]
    fn test_unpack_all_matches_get() {
        for (bits, seed) in [(2u8, 1u64), (4, 2), (8, 3), (16, 4)] {
            let arr = random_array(bits, 4096, seed);
            let mut out = vec![u32::MAX; 4096];
            arr.unpack_all(&mut out);
            for (i, &value) in out.iter().enumerate() {
                assert_eq!(value, arr.get(i), "bits={bits} index={i}");
            }
        }
    }

    #[test]
    fn test_unpack_range_covers_requested_span() {
        let arr = random_array(4, 4096, 7);
        let mut out = vec![u32::MAX; 4096];
        arr.unpack_range(&mut out, 1000, 1500);
        for i in 1000..=1500 {
            assert_eq!(out[i], arr.get(i));
        }
        // Words entirely before the range are untouched.
        assert_eq!(out[0], u32::MAX);
        assert_eq!(out[4095], u32::MAX);
    }

    #[test]
    fn test_unpack_range_on_uneven_length() {
        // 8-bit width, 8 per word; 13 elements leaves a partial last word.
        let arr = random_array(8, 13, 11);
        let mut out = vec![0u32; 13];
        arr.unpack_range(&mut out, 9, 12);
        for i in 8..13 {
            assert_eq!(out[i], arr.get(i));
        }
    }

    #[test]
    fn test_storage_sizes() {
        // 4096 voxels at 2 bits = 1024 bytes
        assert_eq!(BitPackedArray::new(2, 4096).storage_bytes(), 1024);
        // 4096 voxels at 4 bits = 2048 bytes
        assert_eq!(BitPackedArray::new(4, 4096).storage_bytes(), 2048);
        // 4096 voxels at 16 bits = 8192 bytes
        assert_eq!(BitPackedArray::new(16, 4096).storage_bytes(), 8192);
    }
}
