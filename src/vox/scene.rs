//! Scene graph chunks from MagicaVoxel 0.99 and later.
//!
//! Transform nodes position a single child, group nodes list children and
//! shape nodes point at models. Layers and render objects are flat
//! attribute records.

use crate::error::Result;
use crate::reader::{ByteCursor, Dict};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformNode {
    pub id: u32,
    pub attributes: Dict,
    pub child_id: u32,
    pub reserved_id: u32,
    pub layer_id: u32,
    /// One attribute table per animation frame (`_r`, `_t`, `_f`).
    pub frames: Vec<Dict>,
}

impl TransformNode {
    pub(crate) fn read(cursor: &mut ByteCursor) -> Result<Self> {
        let id = cursor.read_u32()?;
        let attributes = cursor.read_dict()?;
        let child_id = cursor.read_u32()?;
        let reserved_id = cursor.read_u32()?;
        let layer_id = cursor.read_u32()?;
        let frame_count = cursor.read_u32()?;
        let mut frames = Vec::new();
        for _ in 0..frame_count {
            frames.push(cursor.read_dict()?);
        }
        Ok(Self {
            id,
            attributes,
            child_id,
            reserved_id,
            layer_id,
            frames,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("_name").map(String::as_str)
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes.get("_hidden").map_or(false, |v| v == "1")
    }

    /// Translation of the first frame, parsed from its `_t` attribute.
    pub fn translation(&self) -> Option<[i32; 3]> {
        let text = self.frames.first()?.get("_t")?;
        let mut values = text.split_whitespace().map(str::parse::<i32>);
        let t = [values.next()?.ok()?, values.next()?.ok()?, values.next()?.ok()?];
        match values.next() {
            None => Some(t),
            Some(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupNode {
    pub id: u32,
    pub attributes: Dict,
    pub children: Vec<u32>,
}

impl GroupNode {
    pub(crate) fn read(cursor: &mut ByteCursor) -> Result<Self> {
        let id = cursor.read_u32()?;
        let attributes = cursor.read_dict()?;
        let count = cursor.read_u32()?;
        let mut children = Vec::new();
        for _ in 0..count {
            children.push(cursor.read_u32()?);
        }
        Ok(Self {
            id,
            attributes,
            children,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeModel {
    pub model_id: u32,
    pub attributes: Dict,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeNode {
    pub id: u32,
    pub attributes: Dict,
    pub models: Vec<ShapeModel>,
}

impl ShapeNode {
    pub(crate) fn read(cursor: &mut ByteCursor) -> Result<Self> {
        let id = cursor.read_u32()?;
        let attributes = cursor.read_dict()?;
        let count = cursor.read_u32()?;
        let mut models = Vec::new();
        for _ in 0..count {
            let model_id = cursor.read_u32()?;
            let attributes = cursor.read_dict()?;
            models.push(ShapeModel {
                model_id,
                attributes,
            });
        }
        Ok(Self {
            id,
            attributes,
            models,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layer {
    pub id: u32,
    pub attributes: Dict,
    pub reserved_id: u32,
}

impl Layer {
    pub(crate) fn read(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            id: cursor.read_u32()?,
            attributes: cursor.read_dict()?,
            reserved_id: cursor.read_u32()?,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("_name").map(String::as_str)
    }
}

/// Every scene graph record in a file, in decode order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoxScene {
    pub transforms: Vec<TransformNode>,
    pub groups: Vec<GroupNode>,
    pub shapes: Vec<ShapeNode>,
    pub layers: Vec<Layer>,
    /// `rOBJ` render settings, keyed by their `_type` attribute.
    pub objects: Vec<Dict>,
}

impl VoxScene {
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.groups.is_empty()
            && self.shapes.is_empty()
            && self.layers.is_empty()
            && self.objects.is_empty()
    }

    pub fn transform(&self, id: u32) -> Option<&TransformNode> {
        self.transforms.iter().find(|node| node.id == id)
    }

    pub fn group(&self, id: u32) -> Option<&GroupNode> {
        self.groups.iter().find(|node| node.id == id)
    }

    pub fn shape(&self, id: u32) -> Option<&ShapeNode> {
        self.shapes.iter().find(|node| node.id == id)
    }
}
