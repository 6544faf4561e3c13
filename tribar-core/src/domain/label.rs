//! Label and Side — classifier target classes and trade direction.

use serde::{Deserialize, Serialize};

/// Per-bar class label produced by the triple-barrier labeler.
///
/// The discriminants are the class indices fed to training code:
/// Flat = 0, Long = 1, Short = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Flat = 0,
    Long = 1,
    Short = 2,
}

impl Label {
    pub fn class_index(self) -> usize {
        self as usize
    }

    /// Direction of the trade this label corresponds to, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Label::Flat => None,
            Label::Long => Some(Side::Long),
            Label::Short => Some(Side::Short),
        }
    }
}

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for Long, -1 for Short. Used in PnL sign computations.
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_indices_are_stable() {
        assert_eq!(Label::Flat.class_index(), 0);
        assert_eq!(Label::Long.class_index(), 1);
        assert_eq!(Label::Short.class_index(), 2);
    }

    #[test]
    fn label_side_mapping() {
        assert_eq!(Label::Flat.side(), None);
        assert_eq!(Label::Long.side(), Some(Side::Long));
        assert_eq!(Label::Short.side(), Some(Side::Short));
    }

    #[test]
    fn side_signs() {
        assert_eq!(Side::Long.sign(), 1.0);
        assert_eq!(Side::Short.sign(), -1.0);
    }
}
