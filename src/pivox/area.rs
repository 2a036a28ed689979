//! Areas are the rules in a map's JSON `areas` array. Each one fills a box
//! of the block grid, either with one block or from a data block.

use serde_json::{Map, Value};

use crate::adapters::{MaterializeConfig, Raster8Mode};
use crate::error::{Error, Result, Warning};
use crate::pivox::container::{uint_member, PivoxContainer};
use crate::{BlockGrid, RegionRange};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AreaKind {
    /// Every cell gets `block`.
    Fill { block: u64 },
    /// One byte per cell from data block `data`, x fastest, then y, then z,
    /// over the area's own size.
    Raster8 { data: usize },
    /// `(x, y, z, block)` byte quads from data block `data`, relative to
    /// the area's origin.
    Coord88 { data: usize },
    Unknown(String),
}

impl AreaKind {
    pub fn type_name(&self) -> &str {
        match self {
            AreaKind::Fill { .. } => "fill",
            AreaKind::Raster8 { .. } => "raster8",
            AreaKind::Coord88 { .. } => "coord8.8",
            AreaKind::Unknown(name) => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Area {
    pub bounds: RegionRange,
    pub kind: AreaKind,
}

/// One entry of the `areas` array. Malformed entries are kept so that
/// materializing can report them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AreaEntry {
    Valid(Area),
    Invalid { index: usize, reason: String },
}

fn bound(
    object: &Map<String, Value>,
    member: &'static str,
    default: u64,
) -> std::result::Result<u64, String> {
    match object.get(member) {
        None => Ok(default),
        Some(value) => value
            .as_u64()
            .ok_or_else(|| format!("{member} is not a non-negative integer")),
    }
}

fn data_index(object: &Map<String, Value>) -> std::result::Result<usize, String> {
    uint_member(object, "data")
        .map(|data| data as usize)
        .ok_or_else(|| "missing data block index".to_string())
}

impl AreaEntry {
    pub fn from_json(index: usize, value: &Value) -> Self {
        match Self::parse(value) {
            Ok(area) => AreaEntry::Valid(area),
            Err(reason) => AreaEntry::Invalid { index, reason },
        }
    }

    fn parse(value: &Value) -> std::result::Result<Area, String> {
        let object = value.as_object().ok_or("area is not an object")?;
        let bounds = RegionRange::new(
            bound(object, "x", 0)?,
            bound(object, "y", 0)?,
            bound(object, "z", 0)?,
            bound(object, "width", 1)?,
            bound(object, "height", 1)?,
            bound(object, "depth", 1)?,
        );

        let kind = match object.get("type").and_then(Value::as_str) {
            Some("fill") => AreaKind::Fill {
                block: uint_member(object, "block").ok_or("missing block id")?,
            },
            Some("raster8") => AreaKind::Raster8 {
                data: data_index(object)?,
            },
            Some("coord8.8") => AreaKind::Coord88 {
                data: data_index(object)?,
            },
            Some(other) => AreaKind::Unknown(other.to_string()),
            None => return Err("missing type".to_string()),
        };

        Ok(Area { bounds, kind })
    }

    pub fn area(&self) -> Option<&Area> {
        match self {
            AreaEntry::Valid(area) => Some(area),
            AreaEntry::Invalid { .. } => None,
        }
    }
}

/// Index of absolute cell `(x, y, z)` in the x-fastest layout of `bounds`,
/// or `None` if it does not fit in `usize`.
fn cell_index(bounds: &RegionRange, x: u64, y: u64, z: u64) -> Option<usize> {
    let origin = bounds.offset;
    let index = (z - origin.z)
        .checked_mul(bounds.extent.y)?
        .checked_add(y - origin.y)?
        .checked_mul(bounds.extent.x)?
        .checked_add(x - origin.x)?;
    usize::try_from(index).ok()
}

/// Calls `f` with every cell of `overlap`, in grid order, passing the
/// cell's absolute coordinates and its index in `grid`.
fn for_each_cell(
    region: &RegionRange,
    overlap: &RegionRange,
    mut f: impl FnMut(u64, u64, u64, usize),
) {
    let (min, max) = (overlap.min(), overlap.max());
    let origin = region.offset;
    let (width, height) = (region.extent.x, region.extent.y);
    for z in min.z..max.z {
        for y in min.y..max.y {
            let row = ((z - origin.z) * height + (y - origin.y)) * width;
            for x in min.x..max.x {
                f(x, y, z, (row + x - origin.x) as usize);
            }
        }
    }
}

impl PivoxContainer {
    /// Builds the block id grid for `region` with strict data block checks.
    pub fn materialize(&self, region: &RegionRange) -> Result<BlockGrid> {
        self.materialize_with(region, &MaterializeConfig::default())
    }

    pub fn materialize_with(
        &self,
        region: &RegionRange,
        config: &MaterializeConfig,
    ) -> Result<BlockGrid> {
        let mut cells = BlockGrid::alloc_cells(region.extent)?;
        let mut warnings = Vec::new();

        for (index, entry) in self.areas().iter().enumerate() {
            let area = match entry {
                AreaEntry::Valid(area) => area,
                AreaEntry::Invalid { index, reason } => {
                    log::warn!("Skipping invalid area {}: {}", index, reason);
                    warnings.push(Warning::InvalidArea {
                        area: *index,
                        reason: reason.clone(),
                    });
                    continue;
                }
            };

            if let AreaKind::Unknown(kind) = &area.kind {
                log::warn!("Skipping area {} with unknown type {}", index, kind);
                warnings.push(Warning::UnknownAreaType {
                    area: index,
                    kind: kind.clone(),
                });
                continue;
            }

            let Some(overlap) = area.bounds.intersect(region) else {
                continue;
            };

            match area.kind {
                AreaKind::Fill { block } => {
                    let block = u16::try_from(block)
                        .map_err(|_| Error::BlockIdOutOfRange { area: index, block })?;
                    for_each_cell(region, &overlap, |_, _, _, i| cells[i] = block);
                }
                AreaKind::Raster8 { data } => {
                    let source = self.area_data(index, data)?;
                    let volume = area.bounds.extent.checked_volume().unwrap_or(usize::MAX);
                    if config.raster8 == Raster8Mode::Strict && source.len() < volume {
                        return Err(Error::DataBlockTooShort {
                            area: index,
                            data,
                            needed: volume,
                            available: source.len(),
                        });
                    }
                    // Cells past the end of the data, or past usize, read as 0.
                    for_each_cell(region, &overlap, |x, y, z, i| {
                        let src = cell_index(&area.bounds, x, y, z).and_then(|s| source.get(s));
                        cells[i] = src.copied().unwrap_or(0) as u16;
                    });
                }
                AreaKind::Coord88 { data } => {
                    let source = self.area_data(index, data)?;
                    if source.len() % 4 != 0 {
                        return Err(Error::DataBlockTooShort {
                            area: index,
                            data,
                            needed: source.len() + 4 - source.len() % 4,
                            available: source.len(),
                        });
                    }
                    let origin = area.bounds.offset;
                    for quad in source.chunks_exact(4) {
                        // u64::MAX lies outside every range, so saturated coordinates
                        // are reported as out of bounds.
                        let x = origin.x.saturating_add(quad[0] as u64);
                        let y = origin.y.saturating_add(quad[1] as u64);
                        let z = origin.z.saturating_add(quad[2] as u64);
                        if !area.bounds.contains(x, y, z) {
                            warnings.push(Warning::VoxelOutOfBounds { x, y, z });
                            continue;
                        }
                        if overlap.contains(x, y, z) {
                            if let Some(i) = cell_index(region, x, y, z) {
                                cells[i] = quad[3] as u16;
                            }
                        }
                    }
                }
                AreaKind::Unknown(_) => {}
            }
        }

        Ok(BlockGrid::from_parts(region.extent, cells, warnings))
    }

    fn area_data(&self, area: usize, data: usize) -> Result<&[u8]> {
        self.data_block(data)
            .ok_or(Error::MissingDataBlock { area, data })
    }
}
