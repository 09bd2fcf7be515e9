use crate::error::AttributeError;

/// Sequential reader over the integer fields of an attribute blob.
///
/// Each `next_*` call returns `Ok(None)` once the blob is exhausted and an
/// error naming the failing field index otherwise.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    tokens: Vec<&'a str>,
    index: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(blob: &'a str) -> Self {
        Self {
            tokens: blob.split_whitespace().collect(),
            index: 0,
        }
    }

    /// Index of the next field to be read.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.index)
    }

    pub fn next_int(&mut self) -> Result<Option<i64>, AttributeError> {
        let Some(token) = self.tokens.get(self.index) else {
            return Ok(None);
        };
        let field = self.index;
        self.index += 1;

        token
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AttributeError::Unparseable {
                field,
                value: token.to_string(),
            })
    }

    /// A bitmask that may only use bits from `allowed`.
    pub fn next_bitmask(&mut self, allowed: i64) -> Result<Option<i64>, AttributeError> {
        let field = self.index;
        match self.next_int()? {
            Some(bits) if bits < 0 || bits & !allowed != 0 => {
                Err(AttributeError::UnknownBits { field, bits })
            }
            other => Ok(other),
        }
    }

    /// A 0/1 flag.
    pub fn next_flag(&mut self) -> Result<Option<bool>, AttributeError> {
        let field = self.index;
        match self.next_int()? {
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            Some(value) => Err(AttributeError::Range { field, value }),
            None => Ok(None),
        }
    }

    pub fn next_in_range<T: TryFrom<i64>>(&mut self) -> Result<Option<T>, AttributeError> {
        let field = self.index;
        match self.next_int()? {
            Some(value) => T::try_from(value)
                .map(Some)
                .map_err(|_| AttributeError::Range { field, value }),
            None => Ok(None),
        }
    }
}
