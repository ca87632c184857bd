use crate::error::{Error, Result};


/// Upper bounds a decoder applies to lengths and counts read off the wire,
/// checked before anything is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_binary_len:    usize,
    pub max_container_len: usize,
    pub max_depth:         usize,
}

impl Limits {
    pub const DEFAULT: Limits = Limits {
        max_binary_len:    64 * 1024 * 1024,
        max_container_len: 16 * 1024 * 1024,
        max_depth:         128,
    };

    pub fn unlimited() -> Limits {
        Limits { max_binary_len: usize::MAX, max_container_len: usize::MAX, max_depth: usize::MAX }
    }

    pub fn with_max_binary_len(mut self, max: usize) -> Limits {
        self.max_binary_len = max;
        self
    }

    pub fn with_max_container_len(mut self, max: usize) -> Limits {
        self.max_container_len = max;
        self
    }

    /// Nested structs and containers each count one level.
    pub fn with_max_depth(mut self, max: usize) -> Limits {
        self.max_depth = max;
        self
    }

    pub fn check_binary_len(&self, len: u64) -> Result<usize> {
        check("binary length", len, self.max_binary_len)
    }

    pub fn check_container_len(&self, len: u32) -> Result<usize> {
        check("container length", len as u64, self.max_container_len)
    }

    pub fn check_depth(&self, depth: usize) -> Result<usize> {
        check("nesting depth", depth as u64, self.max_depth)
    }
}

impl Default for Limits {
    fn default() -> Limits {
        Limits::DEFAULT
    }
}

fn check(what: &'static str, value: u64, limit: usize) -> Result<usize> {
    match usize::try_from(value) {
        Ok(len) if len <= limit => Ok(len),
        _ => Err(Error::LimitExceeded { what, value, limit: limit as u64 }),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_reject_oversized_lengths() {
        let limits = Limits::default().with_max_binary_len(4).with_max_container_len(2);
        assert_eq!(limits.check_binary_len(4), Ok(4));
        assert_eq!(
            limits.check_binary_len(5),
            Err(Error::LimitExceeded { what: "binary length", value: 5, limit: 4 }));
        assert_eq!(limits.check_container_len(2), Ok(2));
        assert!(limits.check_container_len(3).is_err());
    }

    #[test]
    fn depth_limit() {
        let limits = Limits::default().with_max_depth(2);
        assert_eq!(limits.check_depth(2), Ok(2));
        assert_eq!(
            limits.check_depth(3),
            Err(Error::LimitExceeded { what: "nesting depth", value: 3, limit: 2 }));
        assert_eq!(Limits::default().max_depth, 128);
    }

    #[test]
    fn unlimited_accepts_everything() {
        let limits = Limits::unlimited();
        assert_eq!(limits.check_container_len(u32::MAX), Ok(u32::MAX as usize));
    }
}
