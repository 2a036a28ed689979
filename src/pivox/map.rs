//! Building Pivox maps in memory.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::pivox::PivoxContainer;
use crate::{Color, RegionRange};

#[derive(Clone, Debug, Serialize)]
struct BlockRecord {
    name: String,
    color: String,
}

#[derive(Clone, Debug, Serialize)]
struct AreaRecord {
    x: u64,
    y: u64,
    z: u64,
    width: u64,
    height: u64,
    depth: u64,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    block: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<usize>,
}

impl AreaRecord {
    fn new(region: &RegionRange, kind: &'static str) -> Self {
        Self {
            x: region.offset.x,
            y: region.offset.y,
            z: region.offset.z,
            width: region.extent.x,
            height: region.extent.y,
            depth: region.extent.z,
            kind,
            block: None,
            data: None,
        }
    }
}

#[derive(Serialize)]
struct MapRecord<'a> {
    width: u64,
    height: u64,
    depth: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_email: Option<&'a str>,
    blocks: &'a [BlockRecord],
    areas: &'a [AreaRecord],
}

/// An editable map that serializes to a [`PivoxContainer`].
#[derive(Clone, Debug)]
pub struct PivoxMap {
    width: u64,
    height: u64,
    depth: u64,
    name: Option<String>,
    description: Option<String>,
    author: Option<String>,
    author_email: Option<String>,
    blocks: Vec<BlockRecord>,
    areas: Vec<AreaRecord>,
    data_blocks: Vec<Vec<u8>>,
}

impl Default for PivoxMap {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            depth: 1,
            name: None,
            description: None,
            author: None,
            author_email: None,
            blocks: Vec::new(),
            areas: Vec::new(),
            data_blocks: Vec::new(),
        }
    }
}

impl PivoxMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_width(&mut self, width: u64) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: u64) {
        self.height = height;
    }

    pub fn set_depth(&mut self, depth: u64) {
        self.depth = depth;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = Some(author.into());
    }

    pub fn set_author_email(&mut self, author_email: impl Into<String>) {
        self.author_email = Some(author_email.into());
    }

    /// Appends a block type and returns its id.
    pub fn add_block(&mut self, name: &str, red: u8, green: u8, blue: u8) -> u16 {
        let id = self.blocks.len() as u16;
        self.blocks.push(BlockRecord {
            name: name.to_string(),
            color: Color::rgb(red, green, blue).to_hex(),
        });
        id
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn add_area_fill(&mut self, region: &RegionRange, block: u16) {
        let mut area = AreaRecord::new(region, "fill");
        area.block = Some(block);
        self.areas.push(area);
    }

    /// Adds a dense area. `blocks` holds one id per cell, x fastest, then
    /// y, then z, and must cover the whole region.
    pub fn add_area_raster8(&mut self, region: &RegionRange, blocks: &[u8]) -> Result<()> {
        let volume = region.extent.checked_volume().unwrap_or(usize::MAX);
        if blocks.len() < volume {
            return Err(Error::DataBlockTooShort {
                area: self.areas.len(),
                data: self.data_blocks.len(),
                needed: volume,
                available: blocks.len(),
            });
        }
        if volume == 0 {
            return Ok(());
        }
        let mut area = AreaRecord::new(region, "raster8");
        area.data = Some(self.push_data(blocks[..volume].to_vec()));
        self.areas.push(area);
        Ok(())
    }

    /// Adds a sparse area from `(x, y, z, block)` quads relative to the
    /// region's origin.
    pub fn add_area_coord88(&mut self, region: &RegionRange, voxels: &[[u8; 4]]) {
        if voxels.is_empty() {
            return;
        }
        let mut area = AreaRecord::new(region, "coord8.8");
        area.data = Some(self.push_data(voxels.concat()));
        self.areas.push(area);
    }

    fn push_data(&mut self, block: Vec<u8>) -> usize {
        self.data_blocks.push(block);
        self.data_blocks.len() - 1
    }

    pub fn to_container(&self) -> Result<PivoxContainer> {
        let record = MapRecord {
            width: self.width,
            height: self.height,
            depth: self.depth,
            name: self.name.as_deref(),
            description: self.description.as_deref(),
            author: self.author.as_deref(),
            author_email: self.author_email.as_deref(),
            blocks: &self.blocks,
            areas: &self.areas,
        };
        match serde_json::to_value(&record) {
            Ok(serde_json::Value::Object(root)) => {
                Ok(PivoxContainer::new(root, self.data_blocks.clone()))
            }
            Ok(_) => Err(Error::InvalidMetadataBlock("root is not an object".to_string())),
            Err(e) => Err(Error::InvalidMetadataBlock(e.to_string())),
        }
    }
}

/// The map shown when no file is given: a 16³ block of rock, dirt and
/// grass with air above.
pub fn default_map() -> Result<PivoxContainer> {
    const SIZE: u64 = 16;

    let mut map = PivoxMap::new();
    map.set_width(SIZE);
    map.set_height(SIZE);
    map.set_depth(SIZE);
    map.set_name("Default Map");
    map.set_description("Default generated map");

    let air = map.add_block("Air", 0, 0, 0);
    let rock = map.add_block("Rock", 136, 138, 133);
    let dirt = map.add_block("Dirt", 233, 185, 110);
    let grass = map.add_block("Grass", 138, 226, 52);

    let mut blocks = Vec::with_capacity((SIZE * SIZE * SIZE) as usize);
    for z in 0..SIZE {
        let block = match z {
            0..=3 => rock,
            4..=6 => dirt,
            7 => grass,
            _ => air,
        };
        blocks.extend(std::iter::repeat(block as u8).take((SIZE * SIZE) as usize));
    }

    map.add_area_raster8(&RegionRange::new(0, 0, 0, SIZE, SIZE, SIZE), &blocks)?;
    map.to_container()
}
