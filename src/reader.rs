//! Bounds-checked little-endian reads over an in-memory buffer.

use byteorder::{ByteOrder, LittleEndian};
use fxhash::FxHashMap;

use crate::error::{Error, Result};

/// String keyed attribute table, as stored in MagicaVoxel `DICT` fields.
pub type Dict = FxHashMap<String, String>;

/// A read position into an immutable byte buffer.
///
/// Every read checks the remaining length first. A failed read leaves the
/// position where it was.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Returns the next `len` bytes and advances past them.
    pub fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::TruncatedInput {
                context,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        let mut tag = [0; 4];
        tag.copy_from_slice(self.read_bytes(4, "tag")?);
        Ok(tag)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4, "u32").map(LittleEndian::read_u32)
    }

    /// Reads four bytes and reinterprets them as an IEEE-754 float.
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_bytes(4, "f32").map(LittleEndian::read_f32)
    }

    /// Reads a u32 length followed by that many bytes.
    ///
    /// Strings are not required to be valid UTF-8; invalid sequences are
    /// replaced. An overrunning length is an error rather than an empty
    /// string.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.offset;
        let len = self.read_u32()? as usize;
        match self.read_bytes(len, "string") {
            Ok(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            Err(e) => {
                self.offset = start;
                Err(e)
            }
        }
    }

    /// Reads a u32 pair count followed by that many key/value strings into
    /// `dict`. Later duplicate keys overwrite earlier ones.
    pub fn read_dict_into(&mut self, dict: &mut Dict) -> Result<()> {
        let count = self.read_u32()?;
        for _ in 0..count {
            let key = self.read_string()?;
            let value = self.read_string()?;
            dict.insert(key, value);
        }
        Ok(())
    }

    pub fn read_dict(&mut self) -> Result<Dict> {
        let mut dict = Dict::default();
        self.read_dict_into(&mut dict)?;
        Ok(dict)
    }
}
