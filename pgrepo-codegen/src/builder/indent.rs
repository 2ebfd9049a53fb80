//! Indentation of generated source.

/// Indentation unit for one nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    /// Four spaces, as rustfmt emits.
    #[default]
    Spaces4,
    /// Two spaces.
    Spaces2,
    Tab,
}

impl Indent {
    pub const RUST: Self = Self::Spaces4;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spaces4 => "    ",
            Self::Spaces2 => "  ",
            Self::Tab => "\t",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_as_str() {
        assert_eq!(Indent::RUST.as_str(), "    ");
        assert_eq!(Indent::Spaces2.as_str(), "  ");
        assert_eq!(Indent::Tab.as_str(), "\t");
        assert_eq!(Indent::default(), Indent::RUST);
    }
}
