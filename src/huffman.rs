//! Canonical-by-construction Huffman coder used to post-process the LZ77
//! token stream.
//!
//! Table construction is the classic two-smallest-nodes merge; code
//! emission walks the tree with an explicit stack rather than recursion so
//! that a pathological (near-linear) tree cannot blow the call stack.

use crate::tools::bitstream::{BitWriter,BitReader};
use crate::error::{Error,Result};

enum Node {
    Leaf{ symbol: u8 },
    Internal{ left: Box<Node>, right: Box<Node> },
}

struct QueueEntry {
    freq: u64,
    seq: u64,
    node: Node,
}

/// byte -> code, stored as a bit vector rather than a fixed-width integer
/// since a skewed frequency distribution over 256 symbols can produce codes
/// deeper than any fixed integer width.
pub struct CodeTable {
    codes: Vec<Option<Vec<bool>>>,
}

impl CodeTable {
    fn build(freqs: &[u64;256]) -> Self {
        let mut heap: Vec<QueueEntry> = Vec::new();
        let mut seq = 0u64;
        for (symbol,&freq) in freqs.iter().enumerate() {
            if freq > 0 {
                heap.push(QueueEntry{ freq, seq, node: Node::Leaf{ symbol: symbol as u8 } });
                seq += 1;
            }
        }
        if heap.is_empty() {
            return Self{ codes: vec![None;256] };
        }
        if heap.len() == 1 {
            let only = heap.pop().unwrap();
            let mut codes = vec![None;256];
            if let Node::Leaf{ symbol } = only.node {
                codes[symbol as usize] = Some(vec![false]);
            }
            return Self{ codes };
        }
        // stable priority queue: smallest freq first, ties broken by insertion order
        while heap.len() > 1 {
            heap.sort_by(|a,b| a.freq.cmp(&b.freq).then(a.seq.cmp(&b.seq)));
            let left = heap.remove(0);
            let right = heap.remove(0);
            let merged = QueueEntry{
                freq: left.freq + right.freq,
                seq,
                node: Node::Internal{ left: Box::new(left.node), right: Box::new(right.node) },
            };
            seq += 1;
            heap.push(merged);
        }
        let root = heap.pop().unwrap().node;
        let mut codes = vec![None;256];
        // explicit stack traversal: (node, bits accumulated so far)
        let mut stack: Vec<(Node,Vec<bool>)> = vec![(root,Vec::new())];
        while let Some((node,bits)) = stack.pop() {
            match node {
                Node::Leaf{ symbol } => {
                    codes[symbol as usize] = Some(if bits.is_empty() { vec![false] } else { bits });
                }
                Node::Internal{ left, right } => {
                    let mut left_bits = bits.clone();
                    left_bits.push(false);
                    let mut right_bits = bits;
                    right_bits.push(true);
                    stack.push((*left,left_bits));
                    stack.push((*right,right_bits));
                }
            }
        }
        Self{ codes }
    }

    fn code_for(&self,byte: u8) -> &[bool] {
        self.codes[byte as usize].as_deref().expect("every input byte has a code")
    }

    fn count(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.count() as u16).to_le_bytes());
        for (symbol,entry) in self.codes.iter().enumerate() {
            if let Some(bits) = entry {
                out.push(symbol as u8);
                out.push(bits.len() as u8);
                for &bit in bits {
                    out.push(if bit { b'1' } else { b'0' });
                }
            }
        }
        out
    }

    pub fn deserialize(data: &[u8]) -> Result<(Self,usize)> {
        if data.len() < 2 {
            return Err(Error::TruncatedPayload);
        }
        let count = u16::from_le_bytes([data[0],data[1]]) as usize;
        let mut pos = 2;
        let mut codes = vec![None;256];
        for _ in 0..count {
            if pos + 2 > data.len() {
                return Err(Error::TruncatedPayload);
            }
            let symbol = data[pos];
            let len = data[pos+1] as usize;
            pos += 2;
            if pos + len > data.len() {
                return Err(Error::TruncatedPayload);
            }
            let bits: Vec<bool> = data[pos..pos+len].iter().map(|&c| c == b'1').collect();
            pos += len;
            codes[symbol as usize] = Some(bits);
        }
        Ok((Self{ codes },pos))
    }
}

/// Decode-side lookup: accumulate a prefix and match it against the table.
struct Decoder {
    map: std::collections::HashMap<Vec<bool>,u8>,
    max_len: usize,
}

impl Decoder {
    fn from_table(table: &CodeTable) -> Self {
        let mut map = std::collections::HashMap::new();
        let mut max_len = 0;
        for (symbol,entry) in table.codes.iter().enumerate() {
            if let Some(bits) = entry {
                map.insert(bits.clone(),symbol as u8);
                max_len = max_len.max(bits.len());
            }
        }
        Self{ map, max_len }
    }

    fn decode_one(&self,reader: &mut BitReader) -> Option<u8> {
        let mut code: Vec<bool> = Vec::new();
        loop {
            let bit = reader.next_bit()?;
            code.push(bit);
            if let Some(&symbol) = self.map.get(&code) {
                return Some(symbol);
            }
            if code.len() >= self.max_len {
                return None;
            }
        }
    }
}

/// Build a table over `data` and bit-pack `data` against it.
pub fn encode(data: &[u8]) -> (CodeTable,Vec<u8>) {
    let mut freqs = [0u64;256];
    for &b in data {
        freqs[b as usize] += 1;
    }
    let table = CodeTable::build(&freqs);
    let mut writer = BitWriter::new();
    for &b in data {
        for &bit in table.code_for(b) {
            writer.push_bit(bit);
        }
    }
    (table,writer.into_bytes())
}

/// Inverse of [`encode`]: rebuild the symbol map and walk the payload bits.
/// Trailing bits that never complete a code are padding and are discarded.
pub fn decode(table: &CodeTable,payload: &[u8]) -> Vec<u8> {
    if table.count() == 0 {
        return Vec::new();
    }
    let decoder = Decoder::from_table(table);
    let mut reader = BitReader::new(payload);
    let mut out = Vec::new();
    while let Some(symbol) = decoder.decode_one(&mut reader) {
        out.push(symbol);
    }
    out
}

/// Bundle a Huffman table and payload the way they are stored inside a
/// container entry: `u32` table-size, table bytes, `u32` payload-size, payload bytes.
pub fn compress_with_huffman(data: &[u8]) -> Vec<u8> {
    let (table,payload) = encode(data);
    let table_bytes = table.serialize();
    let mut out = Vec::new();
    out.extend_from_slice(&(table_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&table_bytes);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

/// Inverse of [`compress_with_huffman`].
pub fn decompress_with_huffman(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 4 {
        return Err(Error::TruncatedPayload);
    }
    let table_size = u32::from_le_bytes([data[0],data[1],data[2],data[3]]) as usize;
    let mut pos = 4;
    if pos + table_size > data.len() {
        return Err(Error::TruncatedPayload);
    }
    let (table,_) = CodeTable::deserialize(&data[pos..pos+table_size])?;
    pos += table_size;
    if pos + 4 > data.len() {
        return Err(Error::TruncatedPayload);
    }
    let payload_size = u32::from_le_bytes([data[pos],data[pos+1],data[pos+2],data[pos+3]]) as usize;
    pos += 4;
    if pos + payload_size > data.len() {
        return Err(Error::TruncatedPayload);
    }
    Ok(decode(&table,&data[pos..pos+payload_size]))
}
