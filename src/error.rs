use thiserror::Error;

use crate::vox::chunk::Tag;

/// Flat classification of [`Error`], for callers that only need to branch
/// on the kind of failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorType {
    TruncatedInput,
    BadMagic,
    InvalidMetadataBlock,
    EmptyContainer,
    UnsupportedVersion,
    MalformedChunkLength,
    InvalidContent,
    Aborted,
    Io,
}

/// Errors that abort a decode, encode or materialize call.
#[derive(Error, Debug)]
pub enum Error {
    /// A fixed-size field or declared payload runs past the end of its buffer.
    #[error("not enough data for {context}: {needed} octets required, {available} available")]
    TruncatedInput {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("not a Pivox map file")]
    NotAPivoxFile,

    #[error("not a MagicaVoxel file")]
    NotAVoxFile,

    #[error("unrecognized voxel file format")]
    UnrecognizedFormat,

    /// Block 0 of a Pivox container must hold a JSON object.
    #[error("block 0 does not contain a JSON object: {0}")]
    InvalidMetadataBlock(String),

    #[error("Pivox container contains no blocks")]
    EmptyContainer,

    /// Data blocks cannot be empty; a zero length marks the end of the file.
    #[error("data block {0} is empty")]
    EmptyDataBlock(usize),

    /// A Pivox block declares more octets than the file holds.
    #[error("not enough space for block {index}: {needed} octets required, {available} available")]
    TruncatedBlock {
        index: usize,
        needed: usize,
        available: usize,
    },

    #[error("unknown MagicaVoxel file version {0}")]
    UnsupportedVersion(u32),

    /// A chunk's header, content and children exceed the enclosing region.
    #[error("chunk {tag} requires {needed} octets, but only {available} available")]
    MalformedChunkLength {
        tag: Tag,
        needed: usize,
        available: usize,
    },

    /// Wraps a failure inside a chunk's content with the chunk's tag.
    #[error("failed to decode {tag} chunk: {source}")]
    Chunk {
        tag: Tag,
        #[source]
        source: Box<Error>,
    },

    #[error("chunk nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("expected 1024 octets for palette, got {0}")]
    InvalidPalette(usize),

    /// A grid whose cell count does not fit in memory.
    #[error("cannot allocate a {x}x{y}x{z} block grid")]
    GridTooLarge { x: u64, y: u64, z: u64 },

    #[error("area {area} uses block id {block} which does not fit in 16 bits")]
    BlockIdOutOfRange { area: usize, block: u64 },

    #[error("area {area} references data block {data} which does not exist")]
    MissingDataBlock { area: usize, data: usize },

    #[error("area {area} needs {needed} octets from data block {data}, which holds {available}")]
    DataBlockTooShort {
        area: usize,
        data: usize,
        needed: usize,
        available: usize,
    },

    #[error("decode aborted")]
    Aborted,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn error_type(&self) -> ErrorType {
        match self {
            Error::TruncatedInput { .. } | Error::TruncatedBlock { .. } => {
                ErrorType::TruncatedInput
            }
            Error::NotAPivoxFile | Error::NotAVoxFile | Error::UnrecognizedFormat => {
                ErrorType::BadMagic
            }
            Error::InvalidMetadataBlock(_) => ErrorType::InvalidMetadataBlock,
            Error::EmptyContainer | Error::EmptyDataBlock(_) => ErrorType::EmptyContainer,
            Error::UnsupportedVersion(_) => ErrorType::UnsupportedVersion,
            Error::MalformedChunkLength { .. } => ErrorType::MalformedChunkLength,
            Error::Chunk { source, .. } => source.error_type(),
            Error::NestingTooDeep(_)
            | Error::InvalidPalette(_)
            | Error::GridTooLarge { .. }
            | Error::BlockIdOutOfRange { .. }
            | Error::MissingDataBlock { .. }
            | Error::DataBlockTooShort { .. } => ErrorType::InvalidContent,
            Error::Aborted => ErrorType::Aborted,
            Error::Io(_) => ErrorType::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable oddities. The affected unit is skipped and decoding continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// An XYZI chunk with no preceding SIZE chunk.
    OrphanVoxels,
    /// A second XYZI chunk for the same model.
    DuplicateVoxels { model: usize },
    UnknownChunk(Tag),
    UnknownAreaType { area: usize, kind: String },
    InvalidArea { area: usize, reason: String },
    /// A voxel lying outside its model (or the requested region).
    VoxelOutOfBounds { x: u64, y: u64, z: u64 },
}
