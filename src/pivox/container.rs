use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::pivox::area::AreaEntry;
use crate::reader::ByteCursor;
use crate::{AbortFlag, Color, Extent3D};

pub const MAGIC: [u8; 4] = *b"PiVx";

/// Display name and colour of one block id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockDefinition {
    pub name: String,
    pub color: Color,
}

impl BlockDefinition {
    fn from_json(value: &Value) -> Self {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let color = value
            .get("color")
            .and_then(Value::as_str)
            .and_then(Color::from_hex)
            .unwrap_or(Color::BLACK);
        Self { name, color }
    }
}

/// The JSON root of a container, read once with a default for every field.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    pub width: u64,
    pub height: u64,
    pub depth: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub blocks: Vec<BlockDefinition>,
    pub areas: Vec<AreaEntry>,
}

pub(crate) fn uint_member(object: &Map<String, Value>, member: &str) -> Option<u64> {
    object.get(member).and_then(Value::as_u64)
}

fn string_member(object: &Map<String, Value>, member: &str) -> Option<String> {
    object.get(member).and_then(Value::as_str).map(str::to_string)
}

impl Metadata {
    pub fn from_root(root: &Map<String, Value>) -> Self {
        let blocks = root
            .get("blocks")
            .and_then(Value::as_array)
            .map(|blocks| blocks.iter().map(BlockDefinition::from_json).collect())
            .unwrap_or_default();
        let areas = root
            .get("areas")
            .and_then(Value::as_array)
            .map(|areas| {
                areas
                    .iter()
                    .enumerate()
                    .map(|(index, area)| AreaEntry::from_json(index, area))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            width: uint_member(root, "width").unwrap_or(1),
            height: uint_member(root, "height").unwrap_or(1),
            depth: uint_member(root, "depth").unwrap_or(1),
            name: string_member(root, "name"),
            description: string_member(root, "description"),
            author: string_member(root, "author"),
            author_email: string_member(root, "author_email"),
            blocks,
            areas,
        }
    }
}

/// A decoded `.pivox` file.
#[derive(Clone, Debug, PartialEq)]
pub struct PivoxContainer {
    root: Map<String, Value>,
    metadata: Metadata,
    data_blocks: Vec<Vec<u8>>,
}

impl PivoxContainer {
    pub fn new(root: Map<String, Value>, data_blocks: Vec<Vec<u8>>) -> Self {
        let metadata = Metadata::from_root(&root);
        Self {
            root,
            metadata,
            data_blocks,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with_abort(bytes, None)
    }

    pub fn decode_with_abort(bytes: &[u8], abort: Option<&AbortFlag>) -> Result<Self> {
        let mut cursor = ByteCursor::new(bytes);

        match cursor.read_tag() {
            Ok(magic) if magic == MAGIC => {}
            _ => return Err(Error::NotAPivoxFile),
        }

        let mut root = None;
        let mut data_blocks = Vec::new();
        let mut block_count = 0;
        while !cursor.is_at_end() {
            AbortFlag::check(abort)?;

            let block_length = cursor.read_u32()? as usize;
            // Terminate on zero length block
            if block_length == 0 {
                break;
            }

            if block_length > cursor.remaining() {
                return Err(Error::TruncatedBlock {
                    index: block_count,
                    needed: block_length,
                    available: cursor.remaining(),
                });
            }
            let block = cursor.read_bytes(block_length, "block")?;

            if block_count == 0 {
                root = Some(parse_root(block)?);
            } else {
                data_blocks.push(block.to_vec());
            }
            block_count += 1;
        }

        if !cursor.is_at_end() {
            log::debug!("Ignoring {} octets after Pivox map file", cursor.remaining());
        }

        let root = root.ok_or(Error::EmptyContainer)?;
        log::debug!("Decoded Pivox map with {} data blocks", data_blocks.len());

        Ok(Self::new(root, data_blocks))
    }

    /// Serializes to the on-disk layout. The JSON root is pretty printed.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        // A zero length block would read back as the terminator.
        if let Some(index) = self.data_blocks.iter().position(Vec::is_empty) {
            return Err(Error::EmptyDataBlock(index));
        }
        let json = serde_json::to_vec_pretty(&self.root)
            .map_err(|e| Error::InvalidMetadataBlock(e.to_string()))?;

        writer.write_all(&MAGIC)?;
        write_block(&mut writer, &json)?;
        for block in &self.data_blocks {
            write_block(&mut writer, block)?;
        }
        writer.write_u32::<LittleEndian>(0)?;
        Ok(())
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn data_blocks(&self) -> &[Vec<u8>] {
        &self.data_blocks
    }

    pub fn data_block(&self, index: usize) -> Option<&[u8]> {
        self.data_blocks.get(index).map(Vec::as_slice)
    }

    pub fn width(&self) -> u64 {
        self.metadata.width
    }

    pub fn height(&self) -> u64 {
        self.metadata.height
    }

    pub fn depth(&self) -> u64 {
        self.metadata.depth
    }

    pub fn extent(&self) -> Extent3D {
        Extent3D::new(self.width(), self.height(), self.depth())
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.description.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.metadata.author.as_deref()
    }

    pub fn author_email(&self) -> Option<&str> {
        self.metadata.author_email.as_deref()
    }

    pub fn block_count(&self) -> usize {
        self.metadata.blocks.len()
    }

    pub fn block(&self, block: u16) -> Option<&BlockDefinition> {
        self.metadata.blocks.get(block as usize)
    }

    pub fn block_name(&self, block: u16) -> Option<&str> {
        self.block(block).map(|b| b.name.as_str())
    }

    pub fn block_color(&self, block: u16) -> Option<Color> {
        self.block(block).map(|b| b.color)
    }

    pub fn areas(&self) -> &[AreaEntry] {
        &self.metadata.areas
    }
}

fn parse_root(block: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(block) {
        Ok(Value::Object(root)) => Ok(root),
        Ok(_) => Err(Error::InvalidMetadataBlock(
            "root is not an object".to_string(),
        )),
        Err(e) => Err(Error::InvalidMetadataBlock(e.to_string())),
    }
}

fn write_block<W: Write>(writer: &mut W, block: &[u8]) -> Result<()> {
    let length = u32::try_from(block.len()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "block larger than 4 GiB")
    })?;
    writer.write_u32::<LittleEndian>(length)?;
    writer.write_all(block)?;
    Ok(())
}
