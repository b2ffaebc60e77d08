/// Watermark of the highest item identifier already processed.
///
/// Starts unset and only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor(Option<u64>);

impl Cursor {
    pub fn unset() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<u64> {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Move the watermark to `id` if it is ahead. Returns whether it moved.
    pub fn advance(&mut self, id: u64) -> bool {
        match self.0 {
            Some(current) if current >= id => false,
            _ => {
                self.0 = Some(id);
                true
            }
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => write!(f, "unset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cursor_is_unset() {
        let cursor = Cursor::unset();
        assert!(!cursor.is_set());
        assert_eq!(cursor.get(), None);
        assert_eq!(cursor.to_string(), "unset");
    }

    #[test]
    fn test_advance_never_moves_backwards() {
        let mut cursor = Cursor::unset();
        assert!(cursor.advance(7));
        assert!(!cursor.advance(3));
        assert!(!cursor.advance(7));
        assert_eq!(cursor.get(), Some(7));
        assert!(cursor.advance(9));
        assert_eq!(cursor.get(), Some(9));
    }
}
