use std::collections::HashMap;

use crate::common::MAX_DICTIONARY_SIZE;
use crate::errors::GIFWriterError;

/// Dictionary code
pub type Code = u16;

/// Trie edge label: a palette index, or a reserved pseudo-index for clear/end codes
pub type Symbol = u16;

pub const LITERAL_COUNT: usize = 256;

const ROOT: usize = 0;

/// Trie node, a node without a code is an intermediate prefix only
#[derive(Debug, Default)]
struct Node {
    code: Option<Code>,
    children: HashMap<Symbol, usize>,
}

/// Handle to a dictionary entry that has a code assigned.
///
/// Handles are only valid until the next `reset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entry {
    node: usize,
    pub code: Code,
}

/// Prefix tree mapping symbol sequences to LZW codes.
///
/// Codes are handed out sequentially, so the code of a new entry always equals
/// the size of the dictionary before it was inserted.
#[derive(Debug)]
pub struct SymbolDictionary {
    nodes: Vec<Node>,
    size: usize,
}

impl SymbolDictionary {

    pub fn new() -> Self {
        let mut dictionary = SymbolDictionary {
            nodes: Vec::with_capacity(MAX_DICTIONARY_SIZE + 1),
            size: 0,
        };
        dictionary.reset();
        dictionary
    }

    /// Drops every entry and re-inserts the 256 single-symbol literals.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::default());
        self.size = 0;

        for symbol in 0..LITERAL_COUNT {
            self.push_child(ROOT, symbol as Symbol);
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_full(&self) -> bool {
        self.size >= MAX_DICTIONARY_SIZE
    }

    /// Appends `sequence` with the next free code. The caller guarantees the
    /// sequence is not present yet.
    pub fn insert(&mut self, sequence: &[Symbol]) -> Result<Code, GIFWriterError> {
        self.ensure_capacity()?;

        let mut node = ROOT;
        for symbol in sequence {
            node = match self.nodes[node].children.get(symbol) {
                Some(child) => *child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(*symbol, child);
                    child
                }
            };
        }

        let code = self.size as Code;
        self.nodes[node].code = Some(code);
        self.size += 1;

        Ok(code)
    }

    pub fn contains(&self, sequence: &[Symbol]) -> bool {
        self.lookup(sequence).is_some()
    }

    pub fn lookup(&self, sequence: &[Symbol]) -> Option<Code> {
        let mut node = ROOT;
        for symbol in sequence {
            node = *self.nodes[node].children.get(symbol)?;
        }

        if node == ROOT {
            None
        } else {
            self.nodes[node].code
        }
    }

    /// Entry for a one-symbol sequence. Literals are the first nodes created
    /// after the root on every reset, so their position is fixed.
    pub fn literal(&self, index: u8) -> Entry {
        Entry {
            node: index as usize + 1,
            code: index as Code,
        }
    }

    /// Entry for `entry`'s sequence extended by `symbol`, if present.
    pub fn child(&self, entry: Entry, symbol: Symbol) -> Option<Entry> {
        self.find_child(entry.node, symbol)
    }

    /// Appends `entry`'s sequence extended by `symbol` with the next free code.
    pub fn insert_child(&mut self, entry: Entry, symbol: Symbol) -> Result<Entry, GIFWriterError> {
        self.ensure_capacity()?;

        Ok(self.push_child(entry.node, symbol))
    }

    fn find_child(&self, node: usize, symbol: Symbol) -> Option<Entry> {
        let child = *self.nodes[node].children.get(&symbol)?;

        self.nodes[child].code.map(|code| Entry {
            node: child,
            code,
        })
    }

    fn push_child(&mut self, parent: usize, symbol: Symbol) -> Entry {
        let code = self.size as Code;
        let node = match self.nodes[parent].children.get(&symbol) {
            Some(child) => *child,
            None => {
                let child = self.nodes.len();
                self.nodes.push(Node::default());
                self.nodes[parent].children.insert(symbol, child);
                child
            }
        };

        self.nodes[node].code = Some(code);
        self.size += 1;

        Entry {
            node,
            code,
        }
    }

    fn ensure_capacity(&self) -> Result<(), GIFWriterError> {
        if self.is_full() {
            return Err(GIFWriterError::DictionaryOverflow {
                size: self.size,
            });
        }

        Ok(())
    }
}

impl Default for SymbolDictionary {

    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::common::{CLEAR_CODE, END_CODE};

    use super::*;

    #[test]
    fn test_reset_contains_literals() {
        let dictionary = SymbolDictionary::new();

        assert_eq!(dictionary.size(), LITERAL_COUNT);
        for symbol in 0..LITERAL_COUNT as Symbol {
            assert_eq!(dictionary.lookup(&[symbol]), Some(symbol));
        }
        assert!(!dictionary.contains(&[]));
        assert!(!dictionary.contains(&[CLEAR_CODE]));
        assert!(!dictionary.contains(&[1, 2]));
    }

    #[test]
    fn test_reserved_codes_follow_literals() {
        let mut dictionary = SymbolDictionary::new();

        assert_eq!(dictionary.insert(&[CLEAR_CODE]).expect("failed to insert clear code"), CLEAR_CODE);
        assert_eq!(dictionary.insert(&[END_CODE]).expect("failed to insert end code"), END_CODE);
        assert_eq!(dictionary.size(), 258);
    }

    #[test]
    fn test_codes_are_strictly_increasing() {
        let mut dictionary = SymbolDictionary::new();
        dictionary.insert(&[CLEAR_CODE]).expect("failed to insert clear code");
        dictionary.insert(&[END_CODE]).expect("failed to insert end code");

        let mut previous_size = dictionary.size();
        let mut previous_code = END_CODE;
        for first in 0..20 {
            for second in 0..20 {
                let code = dictionary.insert(&[first, second, first])
                    .expect("failed to insert sequence");

                assert_eq!(code as usize, previous_size);
                assert!(code > previous_code);
                assert!(dictionary.size() > previous_size);

                previous_code = code;
                previous_size = dictionary.size();
            }
        }

        assert_eq!(dictionary.lookup(&[0, 0, 0]), Some(258));
        // [0, 0] was only created as an intermediate node
        assert!(!dictionary.contains(&[0, 0]));
    }

    #[test]
    fn test_cursor_extends_previous_match() {
        let mut dictionary = SymbolDictionary::new();
        dictionary.insert(&[CLEAR_CODE]).expect("failed to insert clear code");
        dictionary.insert(&[END_CODE]).expect("failed to insert end code");

        let first = dictionary.literal(7);
        assert_eq!(first.code, 7);
        assert!(dictionary.child(first, 9).is_none());

        let pair = dictionary.insert_child(first, 9).expect("failed to insert pair");
        assert_eq!(pair.code, 258);
        assert_eq!(dictionary.child(first, 9), Some(pair));
        assert_eq!(dictionary.lookup(&[7, 9]), Some(258));

        let triple = dictionary.insert_child(pair, 7).expect("failed to insert triple");
        assert_eq!(triple.code, 259);
        assert!(dictionary.contains(&[7, 9, 7]));
    }

    #[test]
    fn test_literal_matches_lookup() {
        let mut dictionary = SymbolDictionary::new();
        dictionary.insert(&[4, 5]).expect("failed to insert sequence");

        for index in [0u8, 4, 128, 255].iter() {
            let literal = dictionary.literal(*index);
            assert_eq!(Some(literal.code), dictionary.lookup(&[*index as Symbol]));
        }
        assert_eq!(dictionary.child(dictionary.literal(4), 5).map(|v| v.code), Some(256));
    }

    #[test]
    fn test_reset_forgets_entries() {
        let mut dictionary = SymbolDictionary::new();
        dictionary.insert(&[1, 2, 3]).expect("failed to insert sequence");
        assert!(dictionary.contains(&[1, 2, 3]));

        dictionary.reset();

        assert_eq!(dictionary.size(), LITERAL_COUNT);
        assert!(!dictionary.contains(&[1, 2, 3]));
        assert_eq!(dictionary.lookup(&[3]), Some(3));
    }

    #[test]
    fn test_insert_past_capacity_fails() {
        let mut dictionary = SymbolDictionary::new();
        let mut entry = dictionary.literal(0);
        while !dictionary.is_full() {
            entry = dictionary.insert_child(entry, 1).expect("failed to insert while not full");
        }

        assert_eq!(dictionary.size(), MAX_DICTIONARY_SIZE);
        assert!(matches!(
            dictionary.insert_child(entry, 1),
            Err(GIFWriterError::DictionaryOverflow { size: MAX_DICTIONARY_SIZE })
        ));
        assert!(dictionary.insert(&[2, 2]).is_err());
    }
}
