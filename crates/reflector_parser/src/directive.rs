//! Conditional-compilation blocks the parser keeps track of.

use bitflags::bitflags;
use reflector_foundation::{Error, Result};

/// A `#if` condition that changes how declarations are recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompilerDirective {
    /// Any condition the parser treats as transparent.
    Insignificant,
    /// `#if WITH_EDITOR`
    WithEditor,
    /// `#if WITH_EDITORONLY_DATA`
    WithEditorOnlyData,
}

bitflags! {
    /// Editor conditions in force for a block, its own and its parents'.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirectiveFlags: u8 {
        /// Inside `#if WITH_EDITOR`.
        const WITH_EDITOR = 1 << 0;
        /// Inside `#if WITH_EDITORONLY_DATA`.
        const WITH_EDITORONLY_DATA = 1 << 1;
    }
}

impl CompilerDirective {
    /// The flag this directive contributes to its block.
    #[must_use]
    pub const fn flags(self) -> DirectiveFlags {
        match self {
            Self::Insignificant => DirectiveFlags::empty(),
            Self::WithEditor => DirectiveFlags::WITH_EDITOR,
            Self::WithEditorOnlyData => DirectiveFlags::WITH_EDITORONLY_DATA,
        }
    }
}

/// Open `#if` blocks, innermost last.
#[derive(Clone, Debug, Default)]
pub struct DirectiveStack {
    open: Vec<CompilerDirective>,
    flags: Vec<DirectiveFlags>,
}

impl DirectiveStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a block. It inherits the conditions of the block around it.
    pub fn push(&mut self, directive: CompilerDirective) {
        let inherited = self.current_flags();
        self.open.push(directive);
        self.flags.push(inherited | directive.flags());
    }

    /// Closes the innermost block.
    ///
    /// # Errors
    /// Fails when no block is open.
    pub fn pop(&mut self) -> Result<CompilerDirective> {
        self.flags.pop();
        self.open
            .pop()
            .ok_or_else(|| Error::syntax("Unmatched '#endif' in class or global scope"))
    }

    /// Conditions in force for the innermost block.
    #[must_use]
    pub fn current_flags(&self) -> DirectiveFlags {
        self.flags.last().copied().unwrap_or_default()
    }

    /// Whether declarations here sit under `WITH_EDITORONLY_DATA`.
    #[must_use]
    pub fn is_editor_only_data(&self) -> bool {
        self.current_flags().contains(DirectiveFlags::WITH_EDITORONLY_DATA)
    }

    /// Whether declarations here sit under `WITH_EDITOR`.
    #[must_use]
    pub fn is_with_editor(&self) -> bool {
        self.current_flags().contains(DirectiveFlags::WITH_EDITOR)
    }

    /// Open blocks, outermost first.
    #[must_use]
    pub fn open(&self) -> &[CompilerDirective] {
        &self.open
    }

    /// Number of open blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    /// Returns true when no block is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_blocks_inherit_editor_only() {
        let mut stack = DirectiveStack::new();
        stack.push(CompilerDirective::WithEditorOnlyData);
        assert!(stack.is_editor_only_data());
        stack.push(CompilerDirective::Insignificant);
        assert!(stack.is_editor_only_data());
        assert!(!stack.is_with_editor());
        assert_eq!(stack.pop().unwrap(), CompilerDirective::Insignificant);
        assert_eq!(stack.pop().unwrap(), CompilerDirective::WithEditorOnlyData);
        assert!(!stack.is_editor_only_data());
    }

    #[test]
    fn conditions_accumulate() {
        let mut stack = DirectiveStack::new();
        stack.push(CompilerDirective::WithEditor);
        stack.push(CompilerDirective::WithEditorOnlyData);
        assert_eq!(
            stack.current_flags(),
            DirectiveFlags::WITH_EDITOR | DirectiveFlags::WITH_EDITORONLY_DATA
        );
        stack.pop().unwrap();
        assert_eq!(stack.current_flags(), DirectiveFlags::WITH_EDITOR);
    }

    #[test]
    fn unmatched_endif() {
        let mut stack = DirectiveStack::new();
        let err = stack.pop().unwrap_err();
        assert_eq!(err.to_string(), "Unmatched '#endif' in class or global scope");
    }

    #[test]
    fn open_blocks_are_outermost_first() {
        let mut stack = DirectiveStack::new();
        stack.push(CompilerDirective::WithEditor);
        stack.push(CompilerDirective::Insignificant);
        assert_eq!(
            stack.open(),
            &[CompilerDirective::WithEditor, CompilerDirective::Insignificant]
        );
        assert_eq!(stack.len(), 2);
    }
}
