//! Copy labels shared by every comparison component

use std::fmt;

/// Identifies one of the two scratch copies under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CopyLabel {
    #[default]
    A,
    B,
}

impl CopyLabel {
    /// Both labels in slot order
    pub const ALL: [CopyLabel; 2] = [CopyLabel::A, CopyLabel::B];

    /// Slot index (A = 0, B = 1) for fixed two-element arrays
    pub fn index(self) -> usize {
        match self {
            CopyLabel::A => 0,
            CopyLabel::B => 1,
        }
    }

    /// The opposite copy
    pub fn other(self) -> Self {
        match self {
            CopyLabel::A => CopyLabel::B,
            CopyLabel::B => CopyLabel::A,
        }
    }

    /// Single-letter name used in file names and status lines
    pub fn as_str(self) -> &'static str {
        match self {
            CopyLabel::A => "A",
            CopyLabel::B => "B",
        }
    }
}

impl fmt::Display for CopyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_and_other() {
        assert_eq!(CopyLabel::A.index(), 0);
        assert_eq!(CopyLabel::B.index(), 1);
        assert_eq!(CopyLabel::A.other(), CopyLabel::B);
        assert_eq!(CopyLabel::B.other().other(), CopyLabel::B);
    }
}
