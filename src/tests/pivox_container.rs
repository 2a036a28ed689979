use serde_json::{json, Map, Value};

use crate::pivox::PivoxContainer;
use crate::*;

fn root(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

fn framed(blocks: &[&[u8]]) -> Vec<u8> {
    let mut out = b"PiVx".to_vec();
    for block in blocks {
        out.extend_from_slice(&(block.len() as u32).to_le_bytes());
        out.extend_from_slice(block);
    }
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}

#[test]
fn decode_minimal_map() {
    super::init_logging();
    let json = br#"{"width":2,"height":2,"depth":1,"name":"t"}"#;
    let bytes = framed(&[json]);
    assert_eq!(&bytes[4..8], &(json.len() as u32).to_le_bytes());

    let container = PivoxContainer::decode(&bytes).unwrap();
    assert_eq!(container.width(), 2);
    assert_eq!(container.height(), 2);
    assert_eq!(container.depth(), 1);
    assert_eq!(container.name(), Some("t"));
    assert_eq!(container.description(), None);
    assert_eq!(container.block_count(), 0);
    assert!(container.areas().is_empty());
    assert!(container.data_blocks().is_empty());
}

#[test]
fn missing_dimensions_default_to_one() {
    let container = PivoxContainer::decode(&framed(&[b"{}"])).unwrap();
    assert_eq!(container.extent(), Extent3D::new(1, 1, 1));
    assert_eq!(container.name(), None);

    // Wrong JSON types read as absent.
    let container = PivoxContainer::decode(&framed(&[br#"{"width":-3,"name":7}"#])).unwrap();
    assert_eq!(container.width(), 1);
    assert_eq!(container.name(), None);
}

#[test]
fn round_trip_data_blocks() {
    for n in 0..=3usize {
        let data_blocks: Vec<Vec<u8>> = (0..n)
            .map(|i| (0..(i * 7 + 1)).map(|b| (b * 31 + i) as u8).collect())
            .collect();
        let container = PivoxContainer::new(
            root(json!({
                "width": 3,
                "height": 4,
                "depth": 5,
                "name": "Round trip",
                "description": "Data blocks",
                "author": "Test",
                "author_email": "test@example.com"
            })),
            data_blocks.clone(),
        );

        let bytes = container.encode().unwrap();
        let decoded = PivoxContainer::decode(&bytes).unwrap();
        assert_eq!(decoded.data_blocks(), data_blocks.as_slice());
        assert_eq!(decoded.extent(), Extent3D::new(3, 4, 5));
        assert_eq!(decoded.name(), Some("Round trip"));
        assert_eq!(decoded.description(), Some("Data blocks"));
        assert_eq!(decoded.author(), Some("Test"));
        assert_eq!(decoded.author_email(), Some("test@example.com"));
        assert_eq!(decoded, container);
    }
}

#[test]
fn encoded_layout() {
    let container = PivoxContainer::new(root(json!({})), vec![vec![9, 8, 7]]);
    let bytes = container.encode().unwrap();
    assert_eq!(&bytes[..4], b"PiVx");

    let json_len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let rest = &bytes[8 + json_len..];
    assert_eq!(rest, &[3u8, 0, 0, 0, 9, 8, 7, 0, 0, 0, 0]);
}

#[test]
fn empty_data_block_cannot_be_encoded() {
    let container = PivoxContainer::new(root(json!({})), vec![vec![1], Vec::new()]);
    let res = container.encode();
    assert!(matches!(res, Err(Error::EmptyDataBlock(1))));
}

#[test]
fn bad_magic() {
    for magic in [b"PIVX", b"pivx", b"VOX ", b"\0\0\0\0"] {
        let mut bytes = framed(&[b"{}"]);
        bytes[..4].copy_from_slice(magic);
        let res = PivoxContainer::decode(&bytes).map_err(|e| e.error_type());
        assert!(matches!(res, Err(ErrorType::BadMagic)));
    }

    let res = PivoxContainer::decode(b"PiV").map_err(|e| e.error_type());
    assert!(matches!(res, Err(ErrorType::BadMagic)));
}

#[test]
fn zero_length_block_terminates() {
    let res = PivoxContainer::decode(b"PiVx\0\0\0\0").map_err(|e| e.error_type());
    assert!(matches!(res, Err(ErrorType::EmptyContainer)));

    let res = PivoxContainer::decode(b"PiVx").map_err(|e| e.error_type());
    assert!(matches!(res, Err(ErrorType::EmptyContainer)));

    // Anything after the terminator is ignored.
    let mut bytes = framed(&[b"{}", &[1, 2]]);
    bytes.extend_from_slice(b"trailing garbage");
    let container = PivoxContainer::decode(&bytes).unwrap();
    assert_eq!(container.data_blocks(), &[vec![1u8, 2]]);
}

#[test]
fn missing_terminator_is_accepted() {
    let mut bytes = framed(&[b"{}", &[5]]);
    bytes.truncate(bytes.len() - 4);
    let container = PivoxContainer::decode(&bytes).unwrap();
    assert_eq!(container.data_block(0), Some(&[5u8][..]));
}

#[test]
fn truncated_blocks() {
    let mut bytes = b"PiVx".to_vec();
    bytes.extend_from_slice(&100u32.to_le_bytes());
    bytes.extend_from_slice(b"{}");
    let res = PivoxContainer::decode(&bytes);
    assert!(matches!(
        res,
        Err(Error::TruncatedBlock {
            index: 0,
            needed: 100,
            available: 2
        })
    ));

    // A length field cut short.
    let mut bytes = framed(&[b"{}"]);
    bytes.truncate(bytes.len() - 2);
    let res = PivoxContainer::decode(&bytes).map_err(|e| e.error_type());
    assert!(matches!(res, Err(ErrorType::TruncatedInput)));
}

#[test]
fn invalid_metadata_block() {
    for json in ["not json", "[1, 2, 3]", "\"map\"", "{\"width\": "] {
        let res = PivoxContainer::decode(&framed(&[json.as_bytes()])).map_err(|e| e.error_type());
        assert!(matches!(res, Err(ErrorType::InvalidMetadataBlock)));
    }
}

#[test]
fn block_definitions() {
    let container = PivoxContainer::new(
        root(json!({
            "blocks": [
                { "name": "Air", "color": "#000000" },
                { "name": "Water", "color": "#3465A4" },
                { "color": "blue" }
            ]
        })),
        Vec::new(),
    );
    assert_eq!(container.block_count(), 3);
    assert_eq!(container.block_name(1), Some("Water"));
    assert_eq!(container.block_color(1), Some(Color::rgb(0x34, 0x65, 0xa4)));
    assert_eq!(container.block_name(2), Some(""));
    assert_eq!(container.block_color(2), Some(Color::BLACK));
    assert_eq!(container.block(3), None);
}
