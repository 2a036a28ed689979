use crate::*;

/// A file format with a fixed name, extension and leading magic.
pub trait NamedAdapter {
    fn name() -> &'static str;

    fn extension() -> &'static str;

    fn magic() -> [u8; 4];

    fn matches(bytes: &[u8]) -> bool {
        bytes.len() >= 4 && bytes[..4] == Self::magic()
    }
}

/// Decodes a whole in-memory file.
pub trait ParseAdapter: NamedAdapter {
    type Configuration: Default;
    type Output;

    fn parse(
        bytes: &[u8],
        config: &Self::Configuration,
        abort: Option<&AbortFlag>,
    ) -> Result<Self::Output>;
}

/// What renderers need from a decoded file: a size, a colour per block id
/// and a way to copy out a dense grid of ids.
pub trait BlockSource {
    fn extent(&self) -> Extent3D;

    fn block_count(&self) -> usize;

    fn block_color(&self, block: u16) -> Option<Color>;

    fn blit_region(&self, region: &RegionRange) -> Result<BlockGrid>;
}

pub struct Pivox;

impl NamedAdapter for Pivox {
    fn name() -> &'static str {
        "pivox"
    }

    fn extension() -> &'static str {
        "pivox"
    }

    fn magic() -> [u8; 4] {
        *b"PiVx"
    }
}

impl ParseAdapter for Pivox {
    type Configuration = ();
    type Output = PivoxContainer;

    fn parse(bytes: &[u8], _config: &(), abort: Option<&AbortFlag>) -> Result<PivoxContainer> {
        PivoxContainer::decode_with_abort(bytes, abort)
    }
}

pub struct MagicaVoxel;

impl NamedAdapter for MagicaVoxel {
    fn name() -> &'static str {
        "magicavoxel"
    }

    fn extension() -> &'static str {
        "vox"
    }

    fn magic() -> [u8; 4] {
        *b"VOX "
    }
}

impl ParseAdapter for MagicaVoxel {
    type Configuration = VoxParseConfig;
    type Output = VoxFile;

    fn parse(bytes: &[u8], config: &VoxParseConfig, abort: Option<&AbortFlag>) -> Result<VoxFile> {
        VoxFile::decode_with(bytes, config, abort)
    }
}

/// How `raster8` areas treat a data block shorter than the area's volume.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Raster8Mode {
    /// Fail with [`Error::DataBlockTooShort`].
    #[default]
    Strict,
    /// Read missing trailing cells as block 0. Some older maps drop
    /// trailing runs of air.
    ZeroFill,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterializeConfig {
    pub raster8: Raster8Mode,
}

impl BlockSource for PivoxContainer {
    fn extent(&self) -> Extent3D {
        PivoxContainer::extent(self)
    }

    fn block_count(&self) -> usize {
        PivoxContainer::block_count(self)
    }

    fn block_color(&self, block: u16) -> Option<Color> {
        PivoxContainer::block_color(self, block)
    }

    fn blit_region(&self, region: &RegionRange) -> Result<BlockGrid> {
        self.materialize(region)
    }
}

/// Exposes the first model, with colour indices as block ids.
impl BlockSource for VoxFile {
    fn extent(&self) -> Extent3D {
        self.size(0).unwrap_or_default()
    }

    fn block_count(&self) -> usize {
        vox::PALETTE_SIZE
    }

    fn block_color(&self, block: u16) -> Option<Color> {
        self.materials().get(block as usize).map(|m| m.color)
    }

    fn blit_region(&self, region: &RegionRange) -> Result<BlockGrid> {
        let mut grid = BlockGrid::new(region.extent)?;
        if let Some(model) = self.model(0) {
            model.blit_into(region, &mut grid);
        }
        Ok(grid)
    }
}
