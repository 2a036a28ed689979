use std::fmt;

use crate::error::{Error, Result};
use crate::reader::ByteCursor;

/// A four byte chunk identifier such as `MAIN` or `XYZI`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const MAIN: Tag = Tag(*b"MAIN");
    pub const PACK: Tag = Tag(*b"PACK");
    pub const SIZE: Tag = Tag(*b"SIZE");
    pub const XYZI: Tag = Tag(*b"XYZI");
    pub const RGBA: Tag = Tag(*b"RGBA");
    pub const MATT: Tag = Tag(*b"MATT");
    pub const MATL: Tag = Tag(*b"MATL");
    pub const NTRN: Tag = Tag(*b"nTRN");
    pub const NGRP: Tag = Tag(*b"nGRP");
    pub const NSHP: Tag = Tag(*b"nSHP");
    pub const LAYR: Tag = Tag(*b"LAYR");
    pub const ROBJ: Tag = Tag(*b"rOBJ");
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

pub const HEADER_LENGTH: usize = 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub tag: Tag,
    pub content_length: usize,
    pub children_length: usize,
}

/// A chunk located inside the file buffer.
#[derive(Copy, Clone, Debug)]
pub struct Chunk<'a> {
    pub header: ChunkHeader,
    pub content: &'a [u8],
    pub depth: usize,
}

/// Reads the chunk starting at the cursor, checking that its header,
/// content and children fit in what remains.
fn read_chunk<'a>(cursor: &mut ByteCursor<'a>, depth: usize) -> Result<(Chunk<'a>, &'a [u8])> {
    if cursor.remaining() < HEADER_LENGTH {
        return Err(Error::TruncatedInput {
            context: "chunk header",
            needed: HEADER_LENGTH,
            available: cursor.remaining(),
        });
    }
    let tag = Tag(cursor.read_tag()?);
    let content_length = cursor.read_u32()? as usize;
    let children_length = cursor.read_u32()? as usize;
    let header = ChunkHeader {
        tag,
        content_length,
        children_length,
    };

    let available = cursor.remaining() + HEADER_LENGTH;
    if content_length.saturating_add(children_length) > cursor.remaining() {
        return Err(Error::MalformedChunkLength {
            tag,
            needed: HEADER_LENGTH
                .saturating_add(content_length)
                .saturating_add(children_length),
            available,
        });
    }

    let content = cursor.read_bytes(content_length, "chunk content")?;
    let children = cursor.read_bytes(children_length, "child chunks")?;
    Ok((
        Chunk {
            header,
            content,
            depth,
        },
        children,
    ))
}

/// Walks a chunk region in file order, parents before their children,
/// calling `visit` for every chunk.
///
/// `visit` returns whether to descend into the chunk's children; when it
/// returns `false` the whole children region is skipped unread. Nested
/// regions are kept on an explicit stack, so a deeply nested file cannot
/// exhaust the call stack. `poll` runs before each chunk.
pub fn walk<'a>(
    region: &'a [u8],
    max_depth: usize,
    mut poll: impl FnMut() -> Result<()>,
    mut visit: impl FnMut(Chunk<'a>) -> Result<bool>,
) -> Result<()> {
    let mut stack = vec![(ByteCursor::new(region), None::<Tag>)];

    loop {
        let depth = stack.len();
        let Some((cursor, parent)) = stack.last_mut() else {
            break;
        };
        if cursor.is_at_end() {
            stack.pop();
            continue;
        }
        let parent = *parent;
        poll()?;

        let (chunk, children) = read_chunk(cursor, depth - 1).map_err(|e| match parent {
            Some(tag) => Error::Chunk {
                tag,
                source: Box::new(e),
            },
            None => e,
        })?;
        let tag = chunk.header.tag;

        let descend = visit(chunk)?;

        if descend && !children.is_empty() {
            if depth > max_depth {
                return Err(Error::NestingTooDeep(max_depth));
            }
            stack.push((ByteCursor::new(children), Some(tag)));
        }
    }

    Ok(())
}
