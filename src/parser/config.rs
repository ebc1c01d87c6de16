//! Parser configuration.

/// How the parser treats input outside the grammar it models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Skip unrecognized top-level tokens and accept any token in name and
    /// constant slots.
    #[default]
    Lenient,
    /// Fail on unrecognized top-level statements, non-identifier names and
    /// non-literal constants.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: ParseMode,
    /// Maximum message nesting depth.
    pub max_depth: usize,
}

impl ParseOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    pub fn strict() -> Self {
        ParseOptions {
            mode: ParseMode::Strict,
            ..Default::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.mode == ParseMode::Strict
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            mode: ParseMode::Lenient,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ParseOptions::default();
        assert_eq!(opts.mode, ParseMode::Lenient);
        assert_eq!(opts.max_depth, 64);
        assert!(!opts.is_strict());
    }

    #[test]
    fn test_strict_builder() {
        let opts = ParseOptions::strict().with_max_depth(3);
        assert!(opts.is_strict());
        assert_eq!(opts.max_depth, 3);
    }
}
