//! LZ77 match finder and token stream.
//!
//! This produces the byte-exact token list consumed by the Huffman stage.
//! The match finder is a hash-chain index over 3-byte prefixes; the parser
//! is greedy (no lazy matching).

use std::collections::HashMap;
use crate::error::{Error,Result};

pub const MIN_MATCH: usize = 3;
pub const MAX_MATCH: usize = 258;
pub const WINDOW_SIZE: usize = 32768;

const HASH_BITS: u32 = 16;
const HASH_SIZE: u32 = 1 << HASH_BITS;

/// One emission of the LZ77 parser: a literal byte or a back-reference.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Token {
    Literal(u8),
    Match{ length: u16, distance: u16 },
}

fn hash3(data: &[u8],pos: usize) -> u32 {
    let b0 = data[pos] as u32;
    let b1 = if pos + 1 < data.len() { data[pos+1] as u32 } else { 0 };
    let b2 = if pos + 2 < data.len() { data[pos+2] as u32 } else { 0 };
    (((b0.wrapping_mul(65599)).wrapping_add(b1)).wrapping_mul(65599).wrapping_add(b2)) & (HASH_SIZE - 1)
}

/// Hash-chain index over 3-byte prefixes of a single fixed input buffer.
struct MatchFinder<'a> {
    data: &'a [u8],
    chains: HashMap<u32,Vec<usize>>,
}

impl<'a> MatchFinder<'a> {
    fn new(data: &'a [u8]) -> Self {
        let mut chains: HashMap<u32,Vec<usize>> = HashMap::new();
        if data.len() >= 3 {
            for pos in 0..data.len()-2 {
                let h = hash3(data,pos);
                chains.entry(h).or_default().push(pos);
            }
        }
        Self{ data, chains }
    }

    /// Best match at `pos` within `[window_start, pos)`, or `None`.
    fn find_best_match(&self,pos: usize,window_start: usize) -> Option<(usize,usize)> {
        if pos + MIN_MATCH > self.data.len() {
            return None;
        }
        let h = hash3(self.data,pos);
        let candidates = match self.chains.get(&h) {
            Some(c) => c,
            None => return None,
        };
        let mut best_length = MIN_MATCH - 1;
        let mut best_distance = 0;
        let max_possible = MAX_MATCH.min(self.data.len() - pos);
        for &candidate in candidates.iter().rev() {
            if candidate >= pos || candidate < window_start {
                continue;
            }
            let mut length = 0;
            while length < max_possible && self.data[candidate+length] == self.data[pos+length] {
                length += 1;
            }
            if length > best_length {
                best_length = length;
                best_distance = pos - candidate;
                if best_length >= MAX_MATCH {
                    break;
                }
            }
        }
        if best_length >= MIN_MATCH {
            Some((best_length,best_distance))
        } else {
            None
        }
    }
}

/// Parse `data` into a token stream using a greedy hash-chain match finder.
pub fn compress(data: &[u8]) -> Vec<Token> {
    if data.is_empty() {
        return Vec::new();
    }
    let finder = MatchFinder::new(data);
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let window_start = pos.saturating_sub(WINDOW_SIZE);
        match finder.find_best_match(pos,window_start) {
            Some((length,distance)) => {
                tokens.push(Token::Match{ length: length as u16, distance: distance as u16 });
                pos += length;
            }
            None => {
                tokens.push(Token::Literal(data[pos]));
                pos += 1;
            }
        }
    }
    tokens
}

/// Replay a token stream into its original byte sequence.
///
/// Back-references may read bytes written earlier in the same call
/// (run-length expansion when `distance < length`).
pub fn decompress(tokens: &[Token]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for token in tokens {
        match *token {
            Token::Literal(b) => out.push(b),
            Token::Match{ length, distance } => {
                let distance = distance as usize;
                if distance == 0 || distance > out.len() {
                    return Err(Error::InvalidBackReference(distance as u64));
                }
                let mut src = out.len() - distance;
                for _ in 0..length {
                    let b = out[src];
                    out.push(b);
                    src += 1;
                }
            }
        }
    }
    Ok(out)
}

/// Serialize a token stream: one tag byte per token, `0x00` for a literal
/// (followed by the literal byte) or `0x01` for a match (followed by
/// `length - MIN_MATCH` as `u8` and `distance` as little-endian `u16`).
pub fn encode_tokens(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for token in tokens {
        match *token {
            Token::Literal(b) => {
                out.push(0x00);
                out.push(b);
            }
            Token::Match{ length, distance } => {
                out.push(0x01);
                out.push((length as usize - MIN_MATCH) as u8);
                out.extend_from_slice(&distance.to_le_bytes());
            }
        }
    }
    out
}

/// Inverse of [`encode_tokens`]. A tag byte without its full operand set is
/// a truncated stream and is reported as an error.
pub fn decode_tokens(data: &[u8]) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let tag = data[pos];
        pos += 1;
        match tag {
            0x00 => {
                if pos >= data.len() {
                    return Err(Error::TruncatedPayload);
                }
                tokens.push(Token::Literal(data[pos]));
                pos += 1;
            }
            0x01 => {
                if pos + 3 > data.len() {
                    return Err(Error::TruncatedPayload);
                }
                let encoded_length = data[pos];
                let distance = u16::from_le_bytes([data[pos+1],data[pos+2]]);
                pos += 3;
                tokens.push(Token::Match{ length: encoded_length as u16 + MIN_MATCH as u16, distance });
            }
            _ => return Err(Error::TruncatedPayload),
        }
    }
    Ok(tokens)
}
