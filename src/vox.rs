//! MagicaVoxel `.vox` decoding.
//!
//! A file is an 8 byte header (`VOX ` and a version) followed by a tree of
//! chunks. Each chunk carries a 4 byte tag, the length of its own content
//! and the length of the child chunks that follow the content.

pub mod chunk;
pub mod material;
pub mod scene;

use crate::error::{Error, Result, Warning};
use crate::reader::ByteCursor;
use crate::{AbortFlag, BlockGrid, Color, Extent3D, RegionRange};

use chunk::{Chunk, Tag};
pub use material::{MaterialType, MattProperties, VoxMaterial, DEFAULT_PALETTE};
use scene::{GroupNode, Layer, ShapeNode, TransformNode};
pub use scene::VoxScene;

pub const MAGIC: [u8; 4] = *b"VOX ";
pub const VERSION: u32 = 150;
pub const PALETTE_SIZE: usize = 256;

const PALETTE_CHUNK_LENGTH: usize = PALETTE_SIZE * 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VoxParseConfig {
    /// Decode files whose version is not 150 instead of rejecting them.
    pub accept_any_version: bool,
    /// Deepest chunk nesting accepted before decoding fails.
    pub max_depth: usize,
}

impl Default for VoxParseConfig {
    fn default() -> Self {
        Self {
            accept_any_version: false,
            max_depth: 64,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Voxel {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    /// Palette index; 0 is empty.
    pub color_index: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoxModel {
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    voxels: Option<Vec<Voxel>>,
}

impl VoxModel {
    pub fn size(&self) -> Extent3D {
        Extent3D::new(self.size_x as u64, self.size_y as u64, self.size_z as u64)
    }

    pub fn voxels(&self) -> &[Voxel] {
        self.voxels.as_deref().unwrap_or_default()
    }

    pub fn voxel_count(&self) -> usize {
        self.voxels().len()
    }

    pub fn voxel(&self, index: usize) -> Option<Voxel> {
        self.voxels().get(index).copied()
    }

    /// Writes the voxels lying inside `region` into `grid`, which must have
    /// the region's extent.
    pub(crate) fn blit_into(&self, region: &RegionRange, grid: &mut BlockGrid) {
        let origin = region.offset;
        for v in self.voxels() {
            let (x, y, z) = (v.x as u64, v.y as u64, v.z as u64);
            if region.contains(x, y, z) {
                grid.set(x - origin.x, y - origin.y, z - origin.z, v.color_index as u16);
            }
        }
    }

    /// Lays the voxel list out as a dense grid of colour indices.
    pub fn to_grid(&self) -> Result<BlockGrid> {
        let size = self.size();
        let mut grid = BlockGrid::new(size)?;
        for v in self.voxels() {
            let (x, y, z) = (v.x as u64, v.y as u64, v.z as u64);
            if !grid.set(x, y, z, v.color_index as u16) {
                log::warn!(
                    "Ignoring voxel ({}, {}, {}) outside {}x{}x{} model",
                    x,
                    y,
                    z,
                    size.x,
                    size.y,
                    size.z
                );
                grid.warn(Warning::VoxelOutOfBounds { x, y, z });
            }
        }
        Ok(grid)
    }
}

/// A decoded `.vox` file.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxFile {
    version: u32,
    declared_model_count: Option<u32>,
    models: Vec<VoxModel>,
    materials: Vec<VoxMaterial>,
    scene: VoxScene,
    warnings: Vec<Warning>,
}

impl VoxFile {
    fn new(version: u32) -> Self {
        Self {
            version,
            declared_model_count: None,
            models: Vec::new(),
            materials: material::default_materials(),
            scene: VoxScene::default(),
            warnings: Vec::new(),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with(bytes, &VoxParseConfig::default(), None)
    }

    pub fn decode_with(
        bytes: &[u8],
        config: &VoxParseConfig,
        abort: Option<&AbortFlag>,
    ) -> Result<Self> {
        let mut cursor = ByteCursor::new(bytes);
        let version = match (cursor.read_tag(), cursor.read_u32()) {
            (Ok(magic), Ok(version)) if magic == MAGIC => version,
            _ => return Err(Error::NotAVoxFile),
        };
        if version != VERSION {
            if !config.accept_any_version {
                return Err(Error::UnsupportedVersion(version));
            }
            log::info!("Decoding MagicaVoxel file with unknown version {}", version);
        }

        let mut file = Self::new(version);
        let body = &bytes[cursor.position()..];
        chunk::walk(
            body,
            config.max_depth,
            || AbortFlag::check(abort),
            |chunk| file.decode_chunk(chunk),
        )?;

        log::debug!(
            "Decoded MagicaVoxel file version {} with {} models",
            file.version,
            file.models.len()
        );
        Ok(file)
    }

    /// Decodes one chunk's content. Returns `false` for unknown tags, whose
    /// children are skipped along with them.
    fn decode_chunk(&mut self, chunk: Chunk) -> Result<bool> {
        let tag = chunk.header.tag;
        let mut cursor = ByteCursor::new(chunk.content);

        let known = self
            .decode_content(tag, &mut cursor)
            .map_err(|e| Error::Chunk {
                tag,
                source: Box::new(e),
            })?;

        if !known {
            log::debug!(
                "Ignoring unknown MagicaVoxel chunk {} with {} octets data and {} octets children",
                tag,
                chunk.content.len(),
                chunk.header.children_length
            );
            self.warnings.push(Warning::UnknownChunk(tag));
        } else if !cursor.is_at_end() {
            log::debug!("Ignoring {} octets after {} chunk", cursor.remaining(), tag);
        }
        Ok(known)
    }

    /// Returns `false` for tags this decoder does not know.
    fn decode_content(&mut self, tag: Tag, cursor: &mut ByteCursor) -> Result<bool> {
        match tag {
            // Contains no data
            Tag::MAIN => {}
            Tag::PACK => self.declared_model_count = Some(cursor.read_u32()?),
            Tag::SIZE => {
                let size_x = cursor.read_u32()?;
                let size_y = cursor.read_u32()?;
                let size_z = cursor.read_u32()?;
                self.models.push(VoxModel {
                    size_x,
                    size_y,
                    size_z,
                    voxels: None,
                });
            }
            Tag::XYZI => self.decode_voxels(cursor)?,
            Tag::RGBA => self.decode_palette(cursor)?,
            Tag::MATT => {
                let id = cursor.read_u32()?;
                let mut scratch = VoxMaterial::default();
                self.material_slot(id).unwrap_or(&mut scratch).apply_matt(cursor)?;
            }
            Tag::MATL => {
                let id = cursor.read_u32()?;
                let mut scratch = VoxMaterial::default();
                let material = self.material_slot(id).unwrap_or(&mut scratch);
                cursor.read_dict_into(&mut material.properties)?;
            }
            Tag::NTRN => self.scene.transforms.push(TransformNode::read(cursor)?),
            Tag::NGRP => self.scene.groups.push(GroupNode::read(cursor)?),
            Tag::NSHP => self.scene.shapes.push(ShapeNode::read(cursor)?),
            Tag::LAYR => self.scene.layers.push(Layer::read(cursor)?),
            Tag::ROBJ => self.scene.objects.push(cursor.read_dict()?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn decode_voxels(&mut self, cursor: &mut ByteCursor) -> Result<()> {
        let count = cursor.read_u32()? as usize;
        let length = count.checked_mul(4).ok_or(Error::TruncatedInput {
            context: "voxels",
            needed: usize::MAX,
            available: cursor.remaining(),
        })?;
        let data = cursor.read_bytes(length, "voxels")?;

        let model_index = self.models.len().checked_sub(1);
        let Some(model) = self.models.last_mut() else {
            log::warn!("Ignoring XYZI block without preceding SIZE block");
            self.warnings.push(Warning::OrphanVoxels);
            return Ok(());
        };
        if model.voxels.is_some() {
            log::warn!("Ignoring duplicate XYZI block");
            self.warnings.push(Warning::DuplicateVoxels {
                model: model_index.unwrap_or_default(),
            });
            return Ok(());
        }

        model.voxels = Some(
            data.chunks_exact(4)
                .map(|v| Voxel {
                    x: v[0],
                    y: v[1],
                    z: v[2],
                    color_index: v[3],
                })
                .collect(),
        );
        Ok(())
    }

    fn decode_palette(&mut self, cursor: &mut ByteCursor) -> Result<()> {
        if cursor.len() != PALETTE_CHUNK_LENGTH {
            return Err(Error::InvalidPalette(cursor.len()));
        }
        let data = cursor.read_bytes(PALETTE_CHUNK_LENGTH, "palette")?;
        // Chunk entry i is palette index i + 1; the last entry is unused.
        for (material, rgba) in self.materials[1..].iter_mut().zip(data.chunks_exact(4)) {
            material.color = Color::rgba(rgba[0], rgba[1], rgba[2], rgba[3]);
        }
        Ok(())
    }

    /// The material for `id`. Ids past the palette are still read, into a
    /// value that is thrown away.
    fn material_slot(&mut self, id: u32) -> Option<&mut VoxMaterial> {
        let slot = self.materials.get_mut(id as usize);
        if slot.is_none() {
            log::debug!("Ignoring material {} outside the palette", id);
        }
        slot
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Model count from the `PACK` chunk, if there was one.
    pub fn declared_model_count(&self) -> Option<u32> {
        self.declared_model_count
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn model(&self, index: usize) -> Option<&VoxModel> {
        self.models.get(index)
    }

    pub fn models(&self) -> &[VoxModel] {
        &self.models
    }

    pub fn size(&self, model: usize) -> Option<Extent3D> {
        self.model(model).map(VoxModel::size)
    }

    /// Number of voxels in `model`, 0 if there is no such model.
    pub fn voxel_count(&self, model: usize) -> usize {
        self.model(model).map_or(0, VoxModel::voxel_count)
    }

    pub fn get_voxel(&self, model: usize, voxel: usize) -> Option<Voxel> {
        self.model(model)?.voxel(voxel)
    }

    pub fn material(&self, index: u8) -> &VoxMaterial {
        &self.materials[index as usize]
    }

    pub fn materials(&self) -> &[VoxMaterial] {
        &self.materials
    }

    pub fn color(&self, index: u8) -> Color {
        self.material(index).color
    }

    pub fn palette(&self) -> [Color; PALETTE_SIZE] {
        let mut palette = [Color::TRANSPARENT; PALETTE_SIZE];
        for (color, material) in palette.iter_mut().zip(self.materials()) {
            *color = material.color;
        }
        palette
    }

    pub fn scene(&self) -> &VoxScene {
        &self.scene
    }

    /// Chunks that were skipped while decoding.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}
