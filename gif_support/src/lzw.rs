use crate::common::{CLEAR_CODE, END_CODE, MIN_CODE_SIZE, should_increase_code_size};
use crate::dictionary::{Code, Symbol, SymbolDictionary};
use crate::errors::GIFWriterError;

/// A code together with the number of bits it is packed with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CodeStreamEntry {
    pub code: Code,
    pub width: u8,
}

impl CodeStreamEntry {

    pub fn new(code: Code, width: u8) -> Self {
        CodeStreamEntry {
            code,
            width,
        }
    }
}

pub struct LZWEncoder {
    dictionary: SymbolDictionary,
    code_size: u8,
    resets: usize,
}

impl LZWEncoder {

    pub fn new() -> Self {
        LZWEncoder {
            dictionary: SymbolDictionary::new(),
            code_size: MIN_CODE_SIZE + 1,
            resets: 0,
        }
    }

    /// Compresses palette indexes into a sequence of variable width codes,
    /// starting with a clear code and finishing with an end code.
    pub fn encode(&mut self, indexes: &[u8]) -> Result<Vec<CodeStreamEntry>, GIFWriterError> {
        let (first, rest) = indexes.split_first().ok_or(GIFWriterError::EmptyInput)?;

        self.reset_dictionary()?;
        self.code_size = MIN_CODE_SIZE + 1;
        self.resets = 0;

        let mut output = vec![CodeStreamEntry::new(CLEAR_CODE, self.code_size)];
        let mut prev = self.dictionary.literal(*first);
        let mut last = *first;

        for &next in rest {
            if self.dictionary.is_full() {
                trace!("dictionary is full after {} codes, emitting clear code", output.len());
                self.reset_dictionary()?;
                output.push(CodeStreamEntry::new(CLEAR_CODE, self.code_size));
                self.code_size = MIN_CODE_SIZE + 1;
                self.resets += 1;

                // the dictionary only fills up right after an insert, so the
                // pending match is the single last symbol
                prev = self.dictionary.literal(last);
            }

            match self.dictionary.child(prev, next as Symbol) {
                Some(comb) => prev = comb,
                None => {
                    output.push(CodeStreamEntry::new(prev.code, self.code_size));

                    if should_increase_code_size(self.dictionary.size(), self.code_size) {
                        self.code_size += 1;
                    }

                    self.dictionary.insert_child(prev, next as Symbol)?;
                    prev = self.dictionary.literal(next);
                }
            }

            last = next;
        }

        output.push(CodeStreamEntry::new(prev.code, self.code_size));
        output.push(CodeStreamEntry::new(END_CODE, self.code_size));

        debug!(
            "lzw encoded {} indexes into {} codes, {} dictionary resets",
            indexes.len(),
            output.len(),
            self.resets
        );

        Ok(output)
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    fn reset_dictionary(&mut self) -> Result<(), GIFWriterError> {
        self.dictionary.reset();
        self.dictionary.insert(&[CLEAR_CODE])?;
        self.dictionary.insert(&[END_CODE])?;

        Ok(())
    }
}

impl Default for LZWEncoder {

    fn default() -> Self {
        Self::new()
    }
}
