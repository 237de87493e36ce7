//! Canonical-tree Huffman coding over UTF-8 code points.
//!
//! Frame: `[numSkipBits: u8][pre-order tree, root omitted][payload bits]`.
//! The tree is walked with an iterative stack (push right, then left, so
//! left pops first); each non-root node contributes one bit (`0`
//! internal, `1` leaf followed by the leaf's code point) to its own
//! byte-aligned bit stream, which is concatenated ahead of the payload's.

use bitio::{BitReader, BitWriter};
use codec_core::CodecError;
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Serialize)]
pub struct HuffmanCode {
    pub value: String,
    pub frequency: u64,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HuffmanDetails {
    pub codes: Vec<HuffmanCode>,
    pub compression_ratio: f32,
    pub size: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(char),
    Internal(Box<Node>, Box<Node>),
}

impl Node {
    fn min_leaf(&self) -> char {
        match self {
            Node::Leaf(c) => *c,
            Node::Internal(l, r) => l.min_leaf().min(r.min_leaf()),
        }
    }

    fn height(&self) -> u32 {
        match self {
            Node::Leaf(_) => 0,
            Node::Internal(l, r) => 1 + l.height().max(r.height()),
        }
    }
}

/// Heap entry ordered by ascending priority, then by the deterministic
/// tie-break noted in `DESIGN.md`: smallest leaf code point, then
/// subtree height.
struct HeapEntry {
    priority: u64,
    min_leaf: char,
    height: u32,
    node: Node,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
            && self.min_leaf == other.min_leaf
            && self.height == other.height
    }
}
impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the smallest priority first.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.min_leaf.cmp(&self.min_leaf))
            .then_with(|| other.height.cmp(&self.height))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn frequency_table(text: &str) -> IndexMap<char, u64> {
    let mut table = IndexMap::new();
    for ch in text.chars() {
        *table.entry(ch).or_insert(0) += 1;
    }
    table
}

fn build_tree(frequency_table: &IndexMap<char, u64>) -> Node {
    let mut heap: BinaryHeap<HeapEntry> = frequency_table
        .iter()
        .map(|(&ch, &freq)| HeapEntry {
            priority: freq,
            min_leaf: ch,
            height: 0,
            node: Node::Leaf(ch),
        })
        .collect();

    while heap.len() > 1 {
        let left = heap.pop().expect("heap has at least 2 entries");
        let right = heap.pop().expect("heap has at least 2 entries");
        let priority = left.priority + right.priority;
        let min_leaf = left.min_leaf.min(right.min_leaf);
        let height = left.height.max(right.height) + 1;
        let node = Node::Internal(Box::new(left.node), Box::new(right.node));
        heap.push(HeapEntry {
            priority,
            min_leaf,
            height,
            node,
        });
    }

    let root = heap.pop().expect("non-empty frequency table").node;
    match root {
        // A single distinct code point cannot carry a 1-bit code under a
        // tree-serialization format that omits the root; synthesize a
        // sibling so the real symbol gets a code of at least one bit.
        Node::Leaf(ch) => Node::Internal(Box::new(Node::Leaf(ch)), Box::new(Node::Leaf('\0'))),
        internal => internal,
    }
}

fn assign_codes(root: &Node) -> IndexMap<char, String> {
    let mut codes = IndexMap::new();
    let mut stack: Vec<(&Node, String)> = vec![(root, String::new())];
    while let Some((node, way)) = stack.pop() {
        match node {
            Node::Leaf(ch) => {
                codes.insert(*ch, way);
            }
            Node::Internal(left, right) => {
                stack.push((right, format!("{way}1")));
                stack.push((left, format!("{way}0")));
            }
        }
    }
    codes
}

fn serialize_tree(root: &Node) -> Vec<u8> {
    let mut writer = BitWriter::new();
    let mut stack: Vec<&Node> = vec![root];
    let mut is_first = true;
    while let Some(node) = stack.pop() {
        if is_first {
            is_first = false;
        } else {
            match node {
                Node::Leaf(ch) => {
                    writer.write_bit(1);
                    writer.write_rune(*ch);
                }
                Node::Internal(..) => writer.write_bit(0),
            }
        }
        if let Node::Internal(left, right) = node {
            stack.push(right);
            stack.push(left);
        }
    }
    writer.into_bytes()
}

#[derive(Default)]
struct PartialNode {
    left: Option<usize>,
    right: Option<usize>,
    leaf: Option<char>,
}

impl PartialNode {
    fn is_full(&self) -> bool {
        self.leaf.is_some() || (self.left.is_some() && self.right.is_some())
    }
}

/// Rebuilds the tree from an arena of partially-filled nodes: node `0` is
/// the root, and a stack of indices tracks which ancestors still have an
/// empty child, mirroring the Go `restoreTree` algorithm without raw
/// pointers into a self-referential structure.
fn restore_tree(reader: &mut BitReader) -> Result<Node, CodecError> {
    let mut arena: Vec<PartialNode> = vec![PartialNode::default()];
    let mut stack: Vec<usize> = vec![0];

    while !stack.iter().all(|&i| arena[i].is_full()) {
        if reader.is_empty() {
            return Err(CodecError::InvalidData(
                "truncated Huffman tree".to_string(),
            ));
        }
        let bit = reader.read_bit();
        let leaf = if bit == 1 {
            Some(reader.read_rune())
        } else {
            None
        };
        let new_index = arena.len();
        arena.push(PartialNode {
            left: None,
            right: None,
            leaf,
        });

        loop {
            let top = *stack.last().expect("stack non-empty while rebuilding tree");
            if arena[top].left.is_none() {
                arena[top].left = Some(new_index);
                break;
            } else if arena[top].right.is_none() {
                arena[top].right = Some(new_index);
                break;
            } else {
                stack.pop();
            }
        }

        if bit == 0 {
            stack.push(new_index);
        }
    }

    reader.finish_byte();
    Ok(arena_to_node(&arena, 0))
}

fn arena_to_node(arena: &[PartialNode], index: usize) -> Node {
    let node = &arena[index];
    match node.leaf {
        Some(ch) => Node::Leaf(ch),
        None => Node::Internal(
            Box::new(arena_to_node(arena, node.left.expect("full internal node has a left child"))),
            Box::new(arena_to_node(arena, node.right.expect("full internal node has a right child"))),
        ),
    }
}

fn encode_payload(text: &str, codes: &IndexMap<char, String>) -> (Vec<u8>, u8) {
    let mut writer = BitWriter::new();
    for ch in text.chars() {
        let code = &codes[&ch];
        for bit_ch in code.chars() {
            writer.write_bit(if bit_ch == '1' { 1 } else { 0 });
        }
    }
    let mut num_skip_bits = writer.bits_left_to_byte();
    if num_skip_bits == 8 {
        num_skip_bits = 0;
    }
    (writer.into_bytes(), num_skip_bits)
}

fn decode_payload(root: &Node, payload: &[u8], num_skip_bits: u8) -> Result<String, CodecError> {
    let mut reader = BitReader::new(payload);
    let mut num_last_bits = 8 - num_skip_bits;
    let mut out = String::new();
    let mut node = root;

    while !reader.is_last_byte() || (reader.is_last_byte() && num_last_bits > 0) {
        if reader.is_empty() {
            return Err(CodecError::InvalidData(
                "truncated Huffman payload mid-code".to_string(),
            ));
        }
        if reader.is_last_byte() {
            num_last_bits -= 1;
        }
        let bit = reader.read_bit();
        node = match (node, bit) {
            (Node::Internal(_, right), 1) => right,
            (Node::Internal(left, _), _) => left,
            (leaf @ Node::Leaf(_), _) => leaf,
        };
        if let Node::Leaf(ch) = node {
            out.push(*ch);
            node = root;
        }
    }

    Ok(out)
}

fn codes_list(frequency_table: &IndexMap<char, u64>, codes: &IndexMap<char, String>) -> Vec<HuffmanCode> {
    codes
        .iter()
        .map(|(ch, code)| HuffmanCode {
            value: ch.to_string(),
            frequency: *frequency_table.get(ch).unwrap_or(&0),
            code: code.clone(),
        })
        .collect()
}

struct Compressed {
    frame: Vec<u8>,
    frequency_table: IndexMap<char, u64>,
    codes: IndexMap<char, String>,
}

fn compress_data(data: &[u8]) -> Result<Compressed, CodecError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| CodecError::InvalidData(format!("input is not valid UTF-8: {e}")))?;
    let frequency_table = frequency_table(text);
    let root = build_tree(&frequency_table);
    let codes = assign_codes(&root);

    let (payload, num_skip_bits) = encode_payload(text, &codes);
    let tree_bytes = serialize_tree(&root);

    let mut frame = Vec::with_capacity(1 + tree_bytes.len() + payload.len());
    frame.push(num_skip_bits);
    frame.extend(tree_bytes);
    frame.extend(payload);

    Ok(Compressed {
        frame,
        frequency_table,
        codes,
    })
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    Ok(compress_data(data)?.frame)
}

pub fn compress_with_details(data: &[u8]) -> Result<(Vec<u8>, HuffmanDetails), CodecError> {
    let compressed = compress_data(data)?;
    let details = HuffmanDetails {
        codes: codes_list(&compressed.frequency_table, &compressed.codes),
        compression_ratio: codec_core::ratio(data.len(), compressed.frame.len()),
        size: compressed.frame.len(),
    };
    Ok((compressed.frame, details))
}

struct Decompressed {
    data: Vec<u8>,
    frequency_table: IndexMap<char, u64>,
    codes: IndexMap<char, String>,
}

fn decompress_data(compressed: &[u8]) -> Result<Decompressed, CodecError> {
    if compressed.is_empty() {
        return Err(CodecError::InvalidData(
            "empty Huffman frame".to_string(),
        ));
    }
    let mut reader = BitReader::new(compressed);
    let num_skip_bits = reader.read_byte();
    let root = restore_tree(&mut reader)?;
    let payload = &compressed[reader.num_read_byte()..];

    let text = decode_payload(&root, payload, num_skip_bits)?;
    let frequency_table = frequency_table(&text);
    let codes = assign_codes(&root);

    Ok(Decompressed {
        data: text.into_bytes(),
        frequency_table,
        codes,
    })
}

pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
    Ok(decompress_data(compressed)?.data)
}

pub fn decompress_with_details(
    compressed: &[u8],
) -> Result<(Vec<u8>, HuffmanDetails), CodecError> {
    let decompressed = decompress_data(compressed)?;
    let details = HuffmanDetails {
        codes: codes_list(&decompressed.frequency_table, &decompressed.codes),
        compression_ratio: codec_core::ratio(compressed.len(), decompressed.data.len()),
        size: decompressed.data.len(),
    };
    Ok((decompressed.data, details))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mixed_text() {
        let text = "mississippi";
        let (compressed, details) = compress_with_details(text.as_bytes()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, text.as_bytes());

        let mut values: Vec<&str> = details.codes.iter().map(|c| c.value.as_str()).collect();
        values.sort();
        assert_eq!(values, vec!["i", "m", "p", "s"]);
    }

    #[test]
    fn shortest_code_goes_to_most_frequent_letter() {
        let (_, details) = compress_with_details(b"mississippi").unwrap();
        let by_value: IndexMap<&str, &HuffmanCode> =
            details.codes.iter().map(|c| (c.value.as_str(), c)).collect();
        let i_len = by_value["i"].code.len();
        let m_len = by_value["m"].code.len();
        assert!(i_len <= m_len);
    }

    #[test]
    fn round_trips_single_repeated_code_point() {
        let text = "aaaaaaa";
        let compressed = compress(text.as_bytes()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, text.as_bytes());
    }

    #[test]
    fn round_trips_all_256_byte_values_as_latin1_chars() {
        let text: String = (0u32..256).filter_map(char::from_u32).collect();
        let compressed = compress(text.as_bytes()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, text.as_bytes());
    }

    #[test]
    fn round_trips_non_ascii_multibyte_text() {
        let text = "Какой-то очень секретный текст.";
        let compressed = compress(text.as_bytes()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, text.as_bytes());
    }

    #[test]
    fn rejects_non_utf8_input() {
        let invalid = [0xFFu8, 0xFE, 0xFD];
        assert!(compress(&invalid).is_err());
    }

    #[test]
    fn rejects_truncated_frame() {
        let compressed = compress(b"mississippi").unwrap();
        let truncated = &compressed[..compressed.len() - 2];
        assert!(decompress(truncated).is_err());
    }

    #[test]
    fn no_code_is_a_prefix_of_another() {
        let (_, details) = compress_with_details(b"mississippi river").unwrap();
        for a in &details.codes {
            for b in &details.codes {
                if a.value != b.value {
                    assert!(!b.code.starts_with(&a.code));
                }
            }
        }
    }
}
