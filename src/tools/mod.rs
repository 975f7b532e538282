//! Small reusable pieces shared by the Huffman and LZ77 stages.

pub mod bitstream;
