use crate::error::{Error, Result};
use crate::reader::Reader;


/// Byte source/sink for the binary protocol.
///
/// `read` may return fewer bytes than requested; the protocol treats a short
/// read as the end of the data.
pub trait DataBuffer {
    fn read(&mut self, dest: &mut [u8]) -> Result<usize>;
    fn write(&mut self, src: &[u8]) -> Result<()>;
}

/// Token source/sink for the text protocol. `read_token` returns `None` at
/// the end of the data.
pub trait TextBuffer {
    fn read_token(&mut self) -> Result<Option<String>>;
    fn write_token(&mut self, token: &str) -> Result<()>;
}


impl DataBuffer for Vec<u8> {
    fn read(&mut self, _dest: &mut [u8]) -> Result<usize> {
        Err(Error::Buffer("Vec<u8> is write-only".into()))
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        self.extend_from_slice(src);
        Ok(())
    }
}

impl<'buf> DataBuffer for Reader<'buf, u8> {
    fn read(&mut self, dest: &mut [u8]) -> Result<usize> {
        Ok(self.read_into(dest))
    }

    fn write(&mut self, _src: &[u8]) -> Result<()> {
        Err(Error::Buffer("slice reader is read-only".into()))
    }
}

impl<B: DataBuffer + ?Sized> DataBuffer for &mut B {
    fn read(&mut self, dest: &mut [u8]) -> Result<usize> {
        (**self).read(dest)
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        (**self).write(src)
    }
}

impl<B: TextBuffer + ?Sized> TextBuffer for &mut B {
    fn read_token(&mut self) -> Result<Option<String>> {
        (**self).read_token()
    }

    fn write_token(&mut self, token: &str) -> Result<()> {
        (**self).write_token(token)
    }
}


/// Growable byte buffer with an independent read cursor, so values can be
/// written and then read back in order.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    data:   Vec<u8>,
    cursor: usize,
}

impl MemoryBuffer {
    pub fn new() -> MemoryBuffer {
        MemoryBuffer::default()
    }

    pub fn from_vec(data: Vec<u8>) -> MemoryBuffer {
        MemoryBuffer { data, cursor: 0 }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl DataBuffer for MemoryBuffer {
    fn read(&mut self, dest: &mut [u8]) -> Result<usize> {
        let mut reader = Reader { buffer: &self.data[..], cursor: self.cursor };
        let count = reader.read_into(dest);
        self.cursor = reader.cursor;
        Ok(count)
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        self.data.extend_from_slice(src);
        Ok(())
    }
}


/// Ordered token list with the `;`-joined text form.
///
/// Empty tokens are allowed; there is no null token, so a missing value and
/// an empty string look the same.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTextBuffer {
    tokens: Vec<String>,
    cursor: usize,
}

impl MemoryTextBuffer {
    pub fn new() -> MemoryTextBuffer {
        MemoryTextBuffer::default()
    }

    pub fn from_tokens(tokens: Vec<String>) -> MemoryTextBuffer {
        MemoryTextBuffer { tokens, cursor: 0 }
    }

    pub fn parse(text: &str) -> MemoryTextBuffer {
        MemoryTextBuffer::from_tokens(parse_tokens(text))
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn to_text(&self) -> String {
        join_tokens(&self.tokens)
    }
}

impl TextBuffer for MemoryTextBuffer {
    fn read_token(&mut self) -> Result<Option<String>> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        Ok(token)
    }

    fn write_token(&mut self, token: &str) -> Result<()> {
        self.tokens.push(token.to_string());
        Ok(())
    }
}


pub fn escape_token(token: &str, out: &mut String) {
    for c in token.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';'  => out.push_str("\\;"),
            c    => out.push(c),
        }
    }
}

pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut text = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            text.push(';');
        }
        escape_token(token.as_ref(), &mut text);
    }
    text
}

/// Splits on unescaped `;`. `\\` and `\;` unescape; a backslash before any
/// other character, or at the very end, is kept literally. Empty input has
/// no tokens; a trailing `;` yields a trailing empty token.
pub fn parse_tokens(text: &str) -> Vec<String> {
    let mut tokens = vec![];
    if text.is_empty() {
        return tokens;
    }

    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ';' => {
                tokens.push(std::mem::take(&mut current));
            },
            '\\' => {
                match chars.peek() {
                    Some(&next) if next == '\\' || next == ';' => {
                        current.push(next);
                        chars.next();
                    },
                    _ => current.push('\\'),
                }
            },
            c => current.push(c),
        }
    }
    tokens.push(current);
    tokens
}
