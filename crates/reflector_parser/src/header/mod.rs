//! The per-file declaration parser.
//!
//! A [`HeaderParser`] walks one header statement by statement. Annotation
//! macros (`UCLASS`, `USTRUCT`, `UENUM`, `UFUNCTION`, `UPROPERTY`,
//! `UDELEGATE`, `UINTERFACE`) hand off to the declaration parsers in the
//! submodules; everything else is skipped as plain C++.
//!
//! The parser borrows the [`Session`] mutably for the duration of the file
//! and writes declarations straight into its graph. The first fatal error
//! aborts the file; rule violations that do not abort are recorded as
//! error diagnostics and fail the file once it has been read completely.

mod classes;
mod delegates;
mod enums;
mod functions;
mod preprocessor;
mod skip;
mod specifiers;
mod structs;
mod types;
mod variables;


use std::collections::{BTreeMap, HashMap};

use reflector_foundation::{Diagnostic, Error, MetaData, PendingPair, Result, Severity};
use reflector_model::{AccessSpecifier, ScopeId, TypeId, UnitId};
use reflector_syntax::{Lexer, Token, TokenStream, format_comment_for_tooltip};

use crate::directive::DirectiveStack;
use crate::nest::{AllowFlags, NestKind, NestStack};
use crate::session::Session;

pub(crate) use delegates::signature_name;
pub use specifiers::Specifier;

/// Generated-body bookkeeping for the class currently open.
#[derive(Clone, Copy, Debug, Default)]
struct ClassBodyState {
    /// A class body is open and its closing brace is still expected.
    open: bool,
    /// The open class was introduced by `UCLASS` or `UINTERFACE`.
    saw_annotation: bool,
    generated_body: bool,
    uinterface_body: bool,
    iinterface_body: bool,
}

/// Service request/response pairing across one file.
#[derive(Debug, Default)]
struct RpcTracker {
    /// Id → function that claimed it.
    used: HashMap<u16, String>,
    /// Response id → requesting function, for requests still unanswered.
    pending: BTreeMap<u16, String>,
}

/// Parses one source unit into the session's type graph.
pub struct HeaderParser<'a> {
    session: &'a mut Session,
    unit: UnitId,
    filename: String,
    stream: TokenStream<Lexer<'a>>,
    nests: NestStack,
    directives: DirectiveStack,
    access: AccessSpecifier,
    class_body: ClassBodyState,
    /// Class, interface, or mixin owner whose body is open.
    class: Option<TypeId>,
    /// Leading comment of the statement being parsed.
    comment: Option<String>,
    rpc: RpcTracker,
    delegates_to_fixup: Vec<TypeId>,
}

impl<'a> HeaderParser<'a> {
    /// Prepares a parser for `unit`, whose text is `source`.
    pub fn new(session: &'a mut Session, unit: UnitId, source: &'a str) -> Self {
        let filename = session.unit(unit).filename.clone();
        Self {
            session,
            unit,
            filename,
            stream: TokenStream::new(Lexer::new(source)),
            nests: NestStack::new(),
            directives: DirectiveStack::new(),
            access: AccessSpecifier::Public,
            class_body: ClassBodyState::default(),
            class: None,
            comment: None,
            rpc: RpcTracker::default(),
            delegates_to_fixup: Vec::new(),
        }
    }

    /// Parses the whole unit.
    ///
    /// # Errors
    /// Returns the first fatal error, located at the line it was raised
    /// on, or a summary error if non-fatal errors were recorded.
    pub fn parse(mut self) -> Result<()> {
        let outcome = self.parse_file();
        outcome.map_err(|err| err.located(self.filename.clone(), self.stream.line()))
    }

    fn parse_file(&mut self) -> Result<()> {
        let file_scope = self.file_scope();
        self.nests.push(NestKind::Global, file_scope, None)?;
        self.access = AccessSpecifier::Private;

        let mut empty = true;
        while self.compile_statement()? {
            empty = false;
        }
        self.finish(empty)
    }

    /// Parses one statement. Returns false at end of file.
    fn compile_statement(&mut self) -> Result<bool> {
        let token = self.stream.get_token();
        if token.is_eof() {
            return Ok(false);
        }
        self.comment.clone_from(&token.comment);
        if !self.compile_declaration(token.clone())? {
            return Err(Error::syntax(format!("'{token}': Bad command or expression")));
        }
        Ok(true)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn compile_declaration(&mut self, token: Token) -> Result<bool> {
        if let Some(access) = parse_access_specifier(&token) {
            let context = format!("after {token}");
            self.stream.require_symbol(":", &context)?;
            let top = self.nests.top_kind().map_or(AllowFlags::empty(), NestKind::allowed);
            if !top.intersects(AllowFlags::VAR_DECL | AllowFlags::FUNCTION) {
                return Err(Error::nesting(format!("Access specifier {token} not allowed here.")));
            }
            self.access = access;
            return Ok(true);
        }

        let top = self.nests.top_kind();

        if token.is_identifier("class") && top == Some(NestKind::Global) {
            if self.class_body.open {
                return Err(Error::syntax("Missing } at end of class"));
            }
            self.class_body.open = true;
            self.access = AccessSpecifier::Private;
            return self.try_parse_native_interface(token);
        }

        let generated_body = token.is_identifier("GENERATED_BODY");
        if token.is_identifier("GENERATED_IINTERFACE_BODY")
            || (generated_body && top == Some(NestKind::NativeInterface))
        {
            return self.compile_native_interface_body(&token).map(|()| true);
        }
        if token.is_identifier("GENERATED_UINTERFACE_BODY")
            || (generated_body && top == Some(NestKind::Interface))
        {
            return self.compile_interface_body(&token).map(|()| true);
        }
        if token.is_identifier("GENERATED_UCLASS_BODY") || (generated_body && top == Some(NestKind::Class)) {
            return self.compile_class_body(&token).map(|()| true);
        }

        if token.is_identifier("UCLASS") {
            self.class_body.saw_annotation = true;
            self.class_body.open = true;
            self.compile_class()?;
            return Ok(true);
        }
        if token.is_identifier("UINTERFACE") {
            self.class_body.saw_annotation = true;
            self.class_body.open = true;
            self.compile_interface()?;
            return Ok(true);
        }
        if token.is_identifier("UFUNCTION") {
            self.compile_function()?;
            return Ok(true);
        }
        if token.is_identifier("UDELEGATE") {
            let mut metadata = MetaData::new();
            let specifiers = self.read_specifier_set("Delegate", &mut metadata)?;
            let macro_token = self.stream.get_token();
            let delegate = self.compile_delegate(&macro_token, true, specifiers, metadata)?;
            self.delegates_to_fixup.push(delegate);
            return Ok(true);
        }
        if token.ident().is_some_and(|name| name.starts_with("DECLARE_DYNAMIC_")) {
            let delegate = self.compile_delegate(&token, false, Vec::new(), MetaData::new())?;
            self.delegates_to_fixup.push(delegate);
            return Ok(true);
        }
        if token.is_identifier("UPROPERTY") {
            self.nests.check_allowed("'Member variable declaration'", AllowFlags::VAR_DECL)?;
            let owner = self.current_class()?;
            self.compile_variable(owner)?;
            return Ok(true);
        }
        if token.is_identifier("UENUM") {
            self.compile_enum()?;
            return Ok(true);
        }
        if token.is_identifier("USTRUCT") {
            self.compile_struct()?;
            return Ok(true);
        }
        if token.is_symbol("#") {
            self.compile_directive()?;
            return Ok(true);
        }
        if self.class_body.open && token.is_symbol("}") {
            self.close_class()?;
            return Ok(true);
        }
        if token.is_symbol(";") {
            let next = self.stream.get_token();
            return Err(if next.is_eof() {
                Error::syntax("Extra ';' before end of file")
            } else {
                Error::syntax(format!("Extra ';' before '{next}'"))
            });
        }

        let mut token = token;
        if self.class_body.open && self.in_class() {
            match self.try_constructor(token)? {
                Ok(handled) => return Ok(handled),
                Err(rest) => token = rest,
            }
        }

        if self.skip_unknown_object_macro(&token) {
            return Ok(true);
        }

        if self.class_body.open && self.in_class() && top == Some(NestKind::Class) {
            token = self.detect_serialize(token)?;
        }

        self.skip_declaration(token)
    }

    // =========================================================================
    // End of file
    // =========================================================================

    fn finish(&mut self, empty: bool) -> Result<()> {
        if self.class_body.open {
            return Err(Error::syntax("Missing } at end of class"));
        }
        self.nests.pop(NestKind::Global, "'Global scope'")?;
        if !self.directives.is_empty() {
            return Err(Error::syntax("Missing #endif"));
        }

        let delegates = std::mem::take(&mut self.delegates_to_fixup);
        crate::fixup::fixup_unit(self.session, self.unit, &delegates)?;

        if !self.rpc.pending.is_empty() {
            let pairs = self
                .rpc
                .pending
                .iter()
                .map(|(&id, function)| PendingPair {
                    function: function.clone(),
                    id,
                })
                .collect();
            return Err(Error::unmatched_pairs(pairs));
        }

        self.post_parsing_class_setup()?;
        self.check_generated_include(empty)?;
        crate::doc_policy::check_unit(self.session, self.unit);

        let errors = self.session.diagnostics().error_count_for(&self.filename);
        if errors > 0 {
            return Err(Error::semantic(format!("{errors} error(s) encountered while parsing")));
        }
        Ok(())
    }

    fn check_generated_include(&self, empty: bool) -> Result<()> {
        let unit = self.session.unit(self.unit);
        if empty || unit.saw_generated_include {
            return Ok(());
        }
        let graph = self.session.graph();
        let classes: Vec<_> = unit
            .defined_types
            .iter()
            .filter_map(|&id| graph.node(id).as_class())
            .collect();
        let exported = classes
            .iter()
            .any(|class| !class.flags.contains(reflector_model::ClassFlags::NO_EXPORT));
        if !classes.is_empty() && exported {
            return Err(Error::semantic(format!(
                "Expected an include at the top of the header: '#include \"{}\"'",
                unit.generated_header()
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Root scope of the unit being parsed.
    fn file_scope(&self) -> ScopeId {
        self.session.unit(self.unit).scope
    }

    /// Scope new names are looked up from.
    fn current_scope(&self) -> ScopeId {
        self.nests.top().map_or_else(|| self.file_scope(), |nest| nest.scope)
    }

    fn in_class(&self) -> bool {
        self.class.is_some()
            && matches!(
                self.nests.top_kind(),
                Some(NestKind::Class | NestKind::Interface | NestKind::NativeInterface)
            )
    }

    fn current_class(&self) -> Result<TypeId> {
        self.class
            .ok_or_else(|| Error::internal("member declaration outside of a class body"))
    }

    /// Resolves a type name visible from the current scope, applying the
    /// configured redirects.
    fn lookup_type(&self, name: &str) -> Option<TypeId> {
        let name = self.session.config().redirect_type(name);
        self.session
            .graph()
            .lookup(self.current_scope(), name, true)
            .or_else(|| self.session.graph().find_global(name))
    }

    /// Records an error that fails the file without stopping the parse.
    fn report_error(&mut self, message: impl Into<String>) {
        let diagnostic =
            Diagnostic::new(Severity::Error, "parse", message).at(&self.filename, self.stream.line());
        self.session.diagnostics_mut().push(diagnostic);
    }

    /// Takes the pending leading comment, adding it to `metadata` as the
    /// tooltip unless one was given explicitly.
    fn take_tooltip(&mut self, metadata: &mut MetaData) -> Option<String> {
        let comment = self.comment.take()?;
        add_tooltip(&comment, metadata);
        Some(comment)
    }

    fn editor_only(&self) -> bool {
        self.directives.is_editor_only_data()
    }
}

/// Stores `comment` as `ToolTip` unless the key is already set.
fn add_tooltip(comment: &str, metadata: &mut MetaData) {
    if metadata.contains("ToolTip") {
        return;
    }
    let tooltip = format_comment_for_tooltip(comment);
    if !tooltip.is_empty() {
        metadata.insert("ToolTip", tooltip);
    }
}

/// `public:`-style access keywords. `private_subobject` counts as public.
fn parse_access_specifier(token: &Token) -> Option<AccessSpecifier> {
    if token.is_identifier("private_subobject") {
        return Some(AccessSpecifier::Public);
    }
    token.ident().and_then(AccessSpecifier::from_keyword)
}
