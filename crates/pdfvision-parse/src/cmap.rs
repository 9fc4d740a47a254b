//! ToUnicode CMap parser.
//!
//! Reads the `beginbfchar`/`endbfchar` and `beginbfrange`/`endbfrange`
//! sections of a `/ToUnicode` stream. Destination strings are UTF-16BE and
//! may hold surrogate pairs or several characters (ligatures).

use std::collections::HashMap;

use crate::error::BackendError;
use crate::tokenizer::{Operand, tokenize};

/// Upper bound on codes expanded from one `bfrange` entry.
const MAX_RANGE_SPAN: u32 = 0xFFFF;

/// Character code to Unicode mapping from a ToUnicode CMap.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeCMap {
    mappings: HashMap<u32, String>,
}

impl ToUnicodeCMap {
    /// Parse CMap stream content.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Font`] when the CMap is not tokenizable.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let ops = tokenize(data).map_err(|e| BackendError::Font(format!("bad ToUnicode CMap: {e}")))?;
        let mut mappings = HashMap::new();

        // Section entries are the operands of the closing keyword.
        for op in ops {
            match op.name.as_str() {
                "endbfchar" => {
                    for pair in op.operands.chunks_exact(2) {
                        if let (Some(src), Some(dst)) = (pair[0].as_bytes(), pair[1].as_bytes()) {
                            mappings.insert(code_from_bytes(src), decode_utf16be(dst));
                        }
                    }
                }
                "endbfrange" => {
                    for triple in op.operands.chunks_exact(3) {
                        insert_range(&mut mappings, &triple[0], &triple[1], &triple[2]);
                    }
                }
                _ => {}
            }
        }
        Ok(Self { mappings })
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// Lowest code that maps to `text`.
    pub fn code_for(&self, text: &str) -> Option<u32> {
        self.mappings
            .iter()
            .filter(|(_, mapped)| mapped.as_str() == text)
            .map(|(code, _)| *code)
            .min()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn insert_range(mappings: &mut HashMap<u32, String>, lo: &Operand, hi: &Operand, dst: &Operand) {
    let (Some(lo), Some(hi)) = (lo.as_bytes(), hi.as_bytes()) else {
        return;
    };
    let lo = code_from_bytes(lo);
    let hi = code_from_bytes(hi);
    if hi < lo || hi - lo > MAX_RANGE_SPAN {
        return;
    }
    match dst {
        // <lo> <hi> <dst>: the last UTF-16 unit increments across the range
        Operand::String(bytes) => {
            let mut units = utf16_units(bytes);
            let Some(&last) = units.last() else {
                return;
            };
            for offset in 0..=(hi - lo) {
                let Some(unit) = u16::try_from(u32::from(last) + offset).ok() else {
                    break;
                };
                if let Some(slot) = units.last_mut() {
                    *slot = unit;
                }
                mappings.insert(lo + offset, String::from_utf16_lossy(&units));
            }
        }
        // <lo> <hi> [<d0> <d1> ...]: one destination per code
        Operand::Array(items) => {
            for (code, item) in (lo..=hi).zip(items) {
                if let Some(bytes) = item.as_bytes() {
                    mappings.insert(code, decode_utf16be(bytes));
                }
            }
        }
        _ => {}
    }
}

/// Big-endian code value of a source string.
fn code_from_bytes(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect()
}

/// Decode UTF-16BE, replacing unpaired surrogates with U+FFFD.
pub fn decode_utf16be(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}
