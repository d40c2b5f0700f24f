/// Page keys
use std::fmt;
use std::num::NonZeroU32;

/// 1-indexed page number. Page 1 is the initial and default refresh anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageKey(NonZeroU32);

impl PageKey {
    pub const FIRST: PageKey = PageKey(NonZeroU32::MIN);

    /// Returns `None` for zero
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }

    /// `None` past `u32::MAX`
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    pub fn prev(self) -> Option<Self> {
        Self::new(self.get() - 1)
    }
}

impl Default for PageKey {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PageKey> for u32 {
    fn from(key: PageKey) -> Self {
        key.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_a_key() {
        assert!(PageKey::new(0).is_none());
        assert_eq!(PageKey::new(1), Some(PageKey::FIRST));
    }

    #[test]
    fn test_adjacent_keys() {
        let key = PageKey::new(5).unwrap();
        assert_eq!(key.next().map(PageKey::get), Some(6));
        assert_eq!(key.prev().map(PageKey::get), Some(4));
        assert_eq!(PageKey::FIRST.prev(), None);
    }

    #[test]
    fn test_no_key_after_max() {
        let last = PageKey::new(u32::MAX).unwrap();
        assert_eq!(last.next(), None);
    }
}
