//! Declaration context stack.
//!
//! Every brace-delimited region the parser understands pushes a [`Nest`].
//! The top frame decides which declarations may appear next; everything
//! else is rejected with a nesting error before any parsing happens.

use bitflags::bitflags;
use reflector_foundation::{Error, Result};
use reflector_model::{ScopeId, TypeId};

/// Deepest nesting the parser accepts.
pub const MAX_NEST_LEVELS: usize = 16;

bitflags! {
    /// Declaration kinds a frame admits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct AllowFlags: u8 {
        /// `UCLASS`, `UINTERFACE`
        const CLASS = 1 << 0;
        /// `UENUM`, `USTRUCT`
        const TYPE_DECL = 1 << 1;
        /// `UPROPERTY` and parameters
        const VAR_DECL = 1 << 2;
        /// `UFUNCTION`
        const FUNCTION = 1 << 3;
        /// `DECLARE_DYNAMIC_*`
        const IMPLICIT_DELEGATE_DECL = 1 << 4;
    }
}

/// What kind of region a frame represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NestKind {
    /// File scope.
    Global,
    /// `UCLASS` body.
    Class,
    /// `UINTERFACE` body.
    Interface,
    /// The `I<Name>` mixin that follows a `UINTERFACE`.
    NativeInterface,
    /// Parameter list of a function or delegate.
    FunctionDeclaration,
}

impl NestKind {
    /// Name used in nesting errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Class => "Class",
            Self::Interface => "Interface",
            Self::NativeInterface => "NativeInterface",
            Self::FunctionDeclaration => "Function",
        }
    }

    /// Declarations admitted directly inside this kind of frame.
    #[must_use]
    pub const fn allowed(self) -> AllowFlags {
        match self {
            Self::Global => AllowFlags::CLASS
                .union(AllowFlags::TYPE_DECL)
                .union(AllowFlags::IMPLICIT_DELEGATE_DECL),
            Self::Class => AllowFlags::VAR_DECL
                .union(AllowFlags::FUNCTION)
                .union(AllowFlags::IMPLICIT_DELEGATE_DECL),
            Self::Interface => AllowFlags::empty(),
            Self::NativeInterface => AllowFlags::FUNCTION,
            Self::FunctionDeclaration => AllowFlags::VAR_DECL,
        }
    }

    /// Whether closing this frame requires a generated-body marker.
    #[must_use]
    pub const fn requires_generated_body(self) -> bool {
        matches!(self, Self::Class | Self::Interface | Self::NativeInterface)
    }
}

/// One frame of the context stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nest {
    /// Frame kind.
    pub kind: NestKind,
    /// Scope new names are declared in.
    pub scope: ScopeId,
    /// The class or function that opened the frame.
    pub owner: Option<TypeId>,
    /// Declarations admitted next.
    pub allow: AllowFlags,
}

/// Bounded stack of [`Nest`] frames.
#[derive(Clone, Debug, Default)]
pub struct NestStack {
    frames: Vec<Nest>,
}

impl NestStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a frame.
    ///
    /// # Errors
    /// Fails once [`MAX_NEST_LEVELS`] frames are open.
    pub fn push(&mut self, kind: NestKind, scope: ScopeId, owner: Option<TypeId>) -> Result<()> {
        if self.frames.len() >= MAX_NEST_LEVELS {
            return Err(Error::nesting("Maximum nesting limit exceeded"));
        }
        log::trace!(target: "reflector", "push {} nest", kind.name());
        self.frames.push(Nest {
            kind,
            scope,
            owner,
            allow: kind.allowed(),
        });
        Ok(())
    }

    /// Pops a frame of the expected kind. `descr` names the construct being
    /// closed.
    ///
    /// # Errors
    /// Fails on an empty stack or when the top frame is of another kind.
    pub fn pop(&mut self, kind: NestKind, descr: &str) -> Result<Nest> {
        let Some(top) = self.frames.last() else {
            return Err(Error::nesting(format!("Unexpected '{descr}' at global scope")));
        };
        if top.kind != kind {
            return Err(Error::nesting(format!(
                "Unexpected end of {descr} in '{}' block",
                top.kind.name()
            )));
        }
        log::trace!(target: "reflector", "pop {} nest", kind.name());
        self.frames
            .pop()
            .ok_or_else(|| Error::internal("nest stack emptied during pop"))
    }

    /// Requires the top frame to admit every flag in `flags`. `what` names
    /// the declaration, e.g. `'Member variable declaration'`.
    ///
    /// # Errors
    /// Fails when the declaration is not admitted here.
    pub fn check_allowed(&self, what: &str, flags: AllowFlags) -> Result<()> {
        let Some(top) = self.frames.last() else {
            return Err(Error::nesting(format!("{what} is not allowed here")));
        };
        if top.allow.contains(flags) {
            return Ok(());
        }
        if top.kind == NestKind::Global {
            Err(Error::nesting(format!(
                "{what} is not allowed before the Class definition"
            )))
        } else {
            Err(Error::nesting(format!("{what} is not allowed here")))
        }
    }

    /// The innermost frame.
    #[must_use]
    pub fn top(&self) -> Option<&Nest> {
        self.frames.last()
    }

    /// Kind of the innermost frame.
    #[must_use]
    pub fn top_kind(&self) -> Option<NestKind> {
        self.frames.last().map(|n| n.kind)
    }

    /// Number of open frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true when no frame is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> ScopeId {
        ScopeId::from_index(0)
    }

    #[test]
    fn global_admits_types_not_members() {
        let mut nests = NestStack::new();
        nests.push(NestKind::Global, scope(), None).unwrap();
        assert!(nests.check_allowed("'struct'", AllowFlags::TYPE_DECL).is_ok());
        let err = nests
            .check_allowed("'Member variable declaration'", AllowFlags::VAR_DECL)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'Member variable declaration' is not allowed before the Class definition"
        );
    }

    #[test]
    fn interface_admits_nothing() {
        let mut nests = NestStack::new();
        nests.push(NestKind::Global, scope(), None).unwrap();
        nests.push(NestKind::Interface, scope(), None).unwrap();
        let err = nests
            .check_allowed("'Function'", AllowFlags::FUNCTION)
            .unwrap_err();
        assert_eq!(err.to_string(), "'Function' is not allowed here");
    }

    #[test]
    fn depth_is_bounded() {
        let mut nests = NestStack::new();
        for _ in 0..MAX_NEST_LEVELS {
            nests.push(NestKind::Class, scope(), None).unwrap();
        }
        let err = nests.push(NestKind::Class, scope(), None).unwrap_err();
        assert_eq!(err.to_string(), "Maximum nesting limit exceeded");
        assert_eq!(nests.len(), MAX_NEST_LEVELS);
    }

    #[test]
    fn pop_checks_kind() {
        let mut nests = NestStack::new();
        nests.push(NestKind::Global, scope(), None).unwrap();
        nests.push(NestKind::Class, scope(), None).unwrap();
        let err = nests.pop(NestKind::Interface, "'Interface'").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected end of 'Interface' in 'Class' block"
        );
        assert_eq!(nests.pop(NestKind::Class, "'Class'").unwrap().kind, NestKind::Class);
        assert_eq!(nests.top_kind(), Some(NestKind::Global));
    }

    #[test]
    fn pop_on_empty_stack() {
        let mut nests = NestStack::new();
        let err = nests.pop(NestKind::Global, "Global scope").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected 'Global scope' at global scope");
        assert!(nests.is_empty());
    }

    #[test]
    fn generated_body_frames() {
        assert!(NestKind::Class.requires_generated_body());
        assert!(NestKind::NativeInterface.requires_generated_body());
        assert!(!NestKind::FunctionDeclaration.requires_generated_body());
    }
}
