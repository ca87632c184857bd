#[derive(Clone)]
pub struct Reader<'buf, T> {
    pub buffer: &'buf [T],
    pub cursor: usize,
}

impl<'rdr, T> Reader<'rdr, T> {
    pub fn new(buffer: &'rdr [T]) -> Reader<'rdr, T> {
        Reader { buffer, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn has_some(&self) -> bool {
        self.cursor < self.buffer.len()
    }


    pub fn has_n(&self, n: usize) -> bool {
        n <= self.remaining()
    }

    pub fn peek_n(&self, n: usize) -> Option<&'rdr [T]> {
        if self.has_n(n) {
            return Some(&self.buffer[self.cursor .. self.cursor + n]);
        }
        None
    }

    pub fn next_n(&mut self, n: usize) -> Option<&'rdr [T]> {
        self.peek_n(n).map(|result| {
            self.cursor += n;
            result
        })
    }
}


impl<'rdr> Reader<'rdr, u8> {
    /// Copies as many bytes as are available into `dest`.
    pub fn read_into(&mut self, dest: &mut [u8]) -> usize {
        let count = dest.len().min(self.remaining());
        if let Some(bytes) = self.next_n(count) {
            dest[..count].copy_from_slice(bytes);
        }
        count
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_n_stops_at_end() {
        let data = [1u8, 2, 3];
        let mut reader = Reader::new(&data[..]);
        assert_eq!(reader.next_n(2), Some(&[1u8, 2][..]));
        assert_eq!(reader.next_n(2), None);
        assert_eq!(reader.next_n(1), Some(&[3u8][..]));
        assert!(!reader.has_some());
    }

    #[test]
    fn read_into_is_short_at_end() {
        let data = [1u8, 2, 3];
        let mut reader = Reader::new(&data[..]);
        let mut dest = [0u8; 2];
        assert_eq!(reader.read_into(&mut dest), 2);
        assert_eq!(reader.read_into(&mut dest), 1);
        assert_eq!(dest[0], 3);
        assert_eq!(reader.read_into(&mut dest), 0);
    }
}
