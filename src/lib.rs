//! Codecs for Pivox voxel maps and MagicaVoxel `.vox` files.
//!
//! Both formats decode into values implementing [`adapters::BlockSource`],
//! which renderers use to pull a dense grid of block ids plus the colours
//! those ids stand for.


pub mod adapters;
pub mod error;
pub mod pivox;
pub mod reader;
pub mod vox;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use adapters::{BlockSource, MaterializeConfig, NamedAdapter, ParseAdapter, Raster8Mode};
pub use error::{Error, ErrorType, Result, Warning};
pub use pivox::PivoxContainer;
pub use vox::{VoxFile, VoxParseConfig};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset3D {
    pub x: u64,
    pub y: u64,
    pub z: u64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Extent3D {
    pub x: u64,
    pub y: u64,
    pub z: u64,
}

impl Extent3D {
    pub fn new(x: u64, y: u64, z: u64) -> Self {
        Self { x, y, z }
    }

    /// Number of cells, saturating on overflow.
    pub fn volume(&self) -> u64 {
        self.x.saturating_mul(self.y).saturating_mul(self.z)
    }

    /// Number of cells, or `None` if it does not fit in `usize`.
    pub fn checked_volume(&self) -> Option<usize> {
        let volume = self.x.checked_mul(self.y)?.checked_mul(self.z)?;
        usize::try_from(volume).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.volume() == 0
    }
}

/// An axis aligned box of cells, `[offset, offset + extent)` on each axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RegionRange {
    pub offset: Offset3D,
    pub extent: Extent3D,
}

impl RegionRange {
    pub fn new(x: u64, y: u64, z: u64, width: u64, height: u64, depth: u64) -> Self {
        Self {
            offset: Offset3D { x, y, z },
            extent: Extent3D {
                x: width,
                y: height,
                z: depth,
            },
        }
    }

    pub fn min(&self) -> Offset3D {
        self.offset
    }

    /// Exclusive upper corner.
    pub fn max(&self) -> Offset3D {
        Offset3D {
            x: self.offset.x.saturating_add(self.extent.x),
            y: self.offset.y.saturating_add(self.extent.y),
            z: self.offset.z.saturating_add(self.extent.z),
        }
    }

    pub fn contains(&self, x: u64, y: u64, z: u64) -> bool {
        let max = self.max();
        (self.offset.x..max.x).contains(&x)
            && (self.offset.y..max.y).contains(&y)
            && (self.offset.z..max.z).contains(&z)
    }

    /// The overlapping box, or `None` when the two share no cell.
    pub fn intersect(&self, other: &RegionRange) -> Option<RegionRange> {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        let x0 = a_min.x.max(b_min.x);
        let y0 = a_min.y.max(b_min.y);
        let z0 = a_min.z.max(b_min.z);
        let x1 = a_max.x.min(b_max.x);
        let y1 = a_max.y.min(b_max.y);
        let z1 = a_max.z.min(b_max.z);
        if x0 >= x1 || y0 >= y1 || z0 >= z1 {
            return None;
        }
        Some(RegionRange::new(x0, y0, z0, x1 - x0, y1 - y0, z1 - z0))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#RRGGBB`. Hex digits are case-insensitive.
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Unpacks a colour stored as little-endian `r, g, b, a` bytes.
    pub const fn from_rgba_u32(value: u32) -> Self {
        let [r, g, b, a] = value.to_le_bytes();
        Self { r, g, b, a }
    }
}

/// A dense grid of block ids, x fastest, then y, then z.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockGrid {
    extent: Extent3D,
    blocks: Vec<u16>,
    warnings: Vec<Warning>,
}

impl BlockGrid {
    /// An all-air grid. Fails with [`Error::GridTooLarge`] rather than
    /// aborting when the cells cannot be allocated.
    pub fn new(extent: Extent3D) -> Result<Self> {
        Ok(Self {
            extent,
            blocks: Self::alloc_cells(extent)?,
            warnings: Vec::new(),
        })
    }

    pub(crate) fn alloc_cells(extent: Extent3D) -> Result<Vec<u16>> {
        let too_large = || Error::GridTooLarge {
            x: extent.x,
            y: extent.y,
            z: extent.z,
        };
        let len = extent.checked_volume().ok_or_else(too_large)?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| too_large())?;
        cells.resize(len, 0);
        Ok(cells)
    }

    pub(crate) fn from_parts(extent: Extent3D, blocks: Vec<u16>, warnings: Vec<Warning>) -> Self {
        debug_assert_eq!(blocks.len() as u64, extent.volume());
        Self {
            extent,
            blocks,
            warnings,
        }
    }

    pub fn extent(&self) -> Extent3D {
        self.extent
    }

    pub fn index(&self, x: u64, y: u64, z: u64) -> Option<usize> {
        if x >= self.extent.x || y >= self.extent.y || z >= self.extent.z {
            return None;
        }
        Some(((z * self.extent.y + y) * self.extent.x + x) as usize)
    }

    pub fn get(&self, x: u64, y: u64, z: u64) -> Option<u16> {
        self.index(x, y, z).map(|i| self.blocks[i])
    }

    /// Writes one cell. Returns `false` if the cell is outside the grid.
    pub fn set(&mut self, x: u64, y: u64, z: u64, block: u16) -> bool {
        match self.index(x, y, z) {
            Some(i) => {
                self.blocks[i] = block;
                true
            }
            None => false,
        }
    }

    pub fn blocks(&self) -> &[u16] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<u16> {
        self.blocks
    }

    /// Units that were skipped while filling this grid.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}

/// Cancels a decode in progress. Decoders poll it between blocks and
/// chunks and fail with [`Error::Aborted`] once it is set.
#[derive(Clone, Debug, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(abort: Option<&AbortFlag>) -> Result<()> {
        match abort {
            Some(flag) if flag.is_aborted() => Err(Error::Aborted),
            _ => Ok(()),
        }
    }
}

/// A decoded file of either supported format.
#[derive(Debug)]
pub enum Scene {
    Pivox(PivoxContainer),
    MagicaVoxel(VoxFile),
}

impl Scene {
    pub fn as_block_source(&self) -> &dyn BlockSource {
        match self {
            Scene::Pivox(container) => container,
            Scene::MagicaVoxel(vox) => vox,
        }
    }
}

/// Holds decode settings and an optional abort flag shared by every call.
#[derive(Clone, Debug, Default)]
pub struct Context {
    abort: Option<AbortFlag>,
    vox_config: VoxParseConfig,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_abort_flag(mut self, abort: AbortFlag) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn with_vox_config(mut self, config: VoxParseConfig) -> Self {
        self.vox_config = config;
        self
    }

    pub fn abort_flag(&self) -> Option<&AbortFlag> {
        self.abort.as_ref()
    }

    pub fn vox_config(&self) -> &VoxParseConfig {
        &self.vox_config
    }

    pub fn parse<A: ParseAdapter>(
        &self,
        bytes: &[u8],
        config: &A::Configuration,
    ) -> Result<A::Output> {
        A::parse(bytes, config, self.abort.as_ref())
    }

    /// Decodes `bytes`, picking the format from the leading magic.
    pub fn parse_any(&self, bytes: &[u8]) -> Result<Scene> {
        if adapters::Pivox::matches(bytes) {
            let container = self.parse::<adapters::Pivox>(bytes, &())?;
            Ok(Scene::Pivox(container))
        } else if adapters::MagicaVoxel::matches(bytes) {
            let vox = self.parse::<adapters::MagicaVoxel>(bytes, &self.vox_config)?;
            Ok(Scene::MagicaVoxel(vox))
        } else {
            Err(Error::UnrecognizedFormat)
        }
    }

    /// Reads the whole file at `path` and decodes it.
    pub fn load(&self, path: &Path) -> Result<Scene> {
        AbortFlag::check(self.abort.as_ref())?;
        let bytes = std::fs::read(path)?;
        log::debug!("Loaded {} octets from {}", bytes.len(), path.display());
        self.parse_any(&bytes)
    }

    pub fn save(&self, container: &PivoxContainer, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        container.write_to(&mut writer)?;
        std::io::Write::flush(&mut writer)?;
        Ok(())
    }
}

/// Copies `region` out of `source` as a dense block id grid.
pub fn blit_region(source: &dyn BlockSource, region: &RegionRange) -> Result<BlockGrid> {
    source.blit_region(region)
}
