//! Big-endian metadata packing.
//!
//! Auxiliary per-record data that has no named field in the canonical model
//! travels as an opaque [`MetaData`] byte buffer. Inside the crate the data
//! is always handled in typed form ([`CameraAuxData`], [`DenseVisibility`]);
//! bytes are produced only when a record is built, and can be decoded back
//! with the matching `unpack` function.
//!
//! # Layouts
//!
//! All values are network byte order.
//!
//! | Record | Layout | Length |
//! |---|---|---|
//! | Camera | `f32 s1, f32 s2` | 8 |
//! | DensePoint | `f32 ncc, i32 n_seen, i32[n_seen], i32 n_not_seen, i32[n_not_seen]` | 12 + 4·(n_seen + n_not_seen) |
//!
//! Sparse points carry an empty buffer.

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

const WORD: usize = 4;

/// Opaque, big-endian packed auxiliary payload of a record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    pub charbuff: Vec<u8>,
}

impl MetaData {
    /// Wraps an already packed buffer.
    pub fn new(charbuff: Vec<u8>) -> Self {
        Self { charbuff }
    }

    /// An empty buffer, used by records without auxiliary data.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.charbuff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charbuff.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.charbuff
    }
}

/// The two trailing scalars of an NVM camera line.
///
/// Their meaning (usually a radial distortion term followed by a zero) is
/// not interpreted here; they are only carried through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraAuxData {
    pub s1: f32,
    pub s2: f32,
}

impl CameraAuxData {
    /// Packed size in bytes.
    pub const PACKED_LEN: usize = 2 * WORD;

    pub fn new(s1: f32, s2: f32) -> Self {
        Self { s1, s2 }
    }

    /// Decodes a camera metadata buffer.
    ///
    /// # Errors
    /// Returns [`BridgeError::MetaData`] unless the buffer is exactly
    /// [`Self::PACKED_LEN`] bytes long.
    pub fn unpack(meta: &MetaData) -> Result<Self, BridgeError> {
        let bytes = meta.as_bytes();
        if bytes.len() != Self::PACKED_LEN {
            return Err(BridgeError::MetaData {
                message: format!(
                    "camera metadata must be {} bytes, found {}",
                    Self::PACKED_LEN,
                    bytes.len()
                ),
            });
        }

        Ok(Self {
            s1: BigEndian::read_f32(&bytes[0..WORD]),
            s2: BigEndian::read_f32(&bytes[WORD..2 * WORD]),
        })
    }
}

impl From<&CameraAuxData> for MetaData {
    fn from(aux: &CameraAuxData) -> Self {
        let mut charbuff = vec![0u8; CameraAuxData::PACKED_LEN];
        BigEndian::write_f32(&mut charbuff[0..WORD], aux.s1);
        BigEndian::write_f32(&mut charbuff[WORD..2 * WORD], aux.s2);
        MetaData::new(charbuff)
    }
}

/// Photometric score and camera visibility lists of a PMVS patch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DenseVisibility {
    /// Normalized cross-correlation score of the patch.
    pub ncc: f32,
    /// Cameras in which the patch was actually observed.
    pub seen: Vec<i32>,
    /// Cameras that should have observed the patch but did not.
    pub not_seen: Vec<i32>,
}

impl DenseVisibility {
    pub fn new(ncc: f32, seen: Vec<i32>, not_seen: Vec<i32>) -> Self {
        Self {
            ncc,
            seen,
            not_seen,
        }
    }

    /// Size of the packed form in bytes.
    pub fn packed_len(&self) -> usize {
        WORD * (3 + self.seen.len() + self.not_seen.len())
    }

    /// Decodes a dense point metadata buffer.
    ///
    /// # Errors
    /// Returns [`BridgeError::MetaData`] if a declared count runs past the
    /// end of the buffer, a count is negative, or bytes are left over.
    pub fn unpack(meta: &MetaData) -> Result<Self, BridgeError> {
        let mut cursor = WordCursor::new(meta.as_bytes());

        let ncc = f32::from_bits(cursor.next_word("ncc")? as u32);
        let num_seen = cursor.next_count("num_seen")?;
        let seen = cursor.next_words(num_seen, "seen indices")?;
        let num_not_seen = cursor.next_count("num_not_seen")?;
        let not_seen = cursor.next_words(num_not_seen, "not-seen indices")?;
        cursor.finish()?;

        Ok(Self {
            ncc,
            seen,
            not_seen,
        })
    }
}

impl From<&DenseVisibility> for MetaData {
    fn from(vis: &DenseVisibility) -> Self {
        let mut charbuff = vec![0u8; vis.packed_len()];
        let seen_end = 2 * WORD + WORD * vis.seen.len();

        BigEndian::write_f32(&mut charbuff[0..WORD], vis.ncc);
        BigEndian::write_i32(&mut charbuff[WORD..2 * WORD], vis.seen.len() as i32);
        BigEndian::write_i32_into(&vis.seen, &mut charbuff[2 * WORD..seen_end]);
        BigEndian::write_i32(
            &mut charbuff[seen_end..seen_end + WORD],
            vis.not_seen.len() as i32,
        );
        BigEndian::write_i32_into(&vis.not_seen, &mut charbuff[seen_end + WORD..]);

        MetaData::new(charbuff)
    }
}

/// Sequential reader over 4-byte big-endian words.
struct WordCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> WordCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], BridgeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| BridgeError::MetaData {
                message: format!(
                    "buffer of {} bytes ends before {} at offset {}",
                    self.bytes.len(),
                    what,
                    self.offset
                ),
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn next_word(&mut self, what: &str) -> Result<i32, BridgeError> {
        Ok(BigEndian::read_i32(self.take(WORD, what)?))
    }

    fn next_count(&mut self, what: &str) -> Result<usize, BridgeError> {
        let count = self.next_word(what)?;
        usize::try_from(count).map_err(|_| BridgeError::MetaData {
            message: format!("{what} is negative ({count})"),
        })
    }

    fn next_words(&mut self, count: usize, what: &str) -> Result<Vec<i32>, BridgeError> {
        let len = count.checked_mul(WORD).ok_or_else(|| BridgeError::MetaData {
            message: format!("{what} count {count} overflows"),
        })?;
        let raw = self.take(len, what)?;
        let mut words = vec![0i32; count];
        BigEndian::read_i32_into(raw, &mut words);
        Ok(words)
    }

    fn finish(self) -> Result<(), BridgeError> {
        let trailing = self.bytes.len() - self.offset;
        if trailing != 0 {
            return Err(BridgeError::MetaData {
                message: format!("{trailing} trailing byte(s) after visibility lists"),
            });
        }
        Ok(())
    }
}
