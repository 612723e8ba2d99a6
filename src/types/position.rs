//! Cursor positions carried by position events.

use serde::{Deserialize, Serialize};

/// Zero-based cursor location inside a scope.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 9) < Position::new(2, 0));
        assert!(Position::new(2, 0) < Position::new(2, 1));
    }

    #[test]
    fn test_position_matches_lsp_shape() {
        let pos: Position = serde_json::from_str(r#"{"line":4,"character":2}"#).unwrap();
        assert_eq!(pos, Position::new(4, 2));
        assert_eq!(pos.to_string(), "4:2");
    }
}
