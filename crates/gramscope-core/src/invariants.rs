//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::{DEFAULT_MODE, Grammar, LexerMode};

impl Grammar {
    pub(crate) fn ensure_default_mode(&self) -> &LexerMode {
        self.modes
            .iter()
            .find(|m| m.name == DEFAULT_MODE)
            .unwrap_or_else(|| {
                panic!(
                    "Grammar: `{DEFAULT_MODE}` missing from mode table \
                     (Grammar::default and the scanner always insert it)"
                )
            })
    }
}
