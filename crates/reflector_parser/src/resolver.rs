//! Cross-file ordering.
//!
//! A header can only be parsed once everything it names is in the graph:
//! the headers it includes and the headers declaring its classes'
//! ancestors. [`resolve`] walks those edges depth-first, parsing
//! dependencies before dependents, and [`parse_header`] parses one unit
//! at most once.
//!
//! Inheritance edges are known before any parsing thanks to [`prescan`],
//! which only looks for the `UCLASS() class Name : public Parent` shape.

use reflector_model::{ClassFlags, PrescannedClass, UnitId};
use reflector_syntax::{Lexer, Token, TokenKind, TokenStream};

use crate::header::HeaderParser;
use crate::session::Session;

/// Outcome of parsing a header or a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompilationResult {
    /// Everything parsed.
    Succeeded,
    /// A module parse stopped at a failed header.
    CompilationError,
    /// The header, or one of its dependencies, failed.
    OtherCompilationError,
}

impl CompilationResult {
    /// Returns true for [`CompilationResult::Succeeded`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

// =============================================================================
// Pre-scan
// =============================================================================

/// What [`prescan`] finds in a header without parsing it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prescan {
    /// Quoted `#include` targets in order.
    pub includes: Vec<String>,
    /// `UCLASS` and `UINTERFACE` classes with their parent names.
    pub classes: Vec<PrescannedClass>,
}

/// Collects includes and annotated class declarations from `source`.
#[must_use]
pub fn prescan(source: &str) -> Prescan {
    let mut stream = TokenStream::new(Lexer::new(source));
    let mut scan = Prescan::default();
    loop {
        let token = stream.get_token();
        if token.is_eof() {
            break;
        }
        if token.is_symbol("#") {
            if stream.match_identifier("include") {
                let target = stream.get_token();
                if let TokenKind::Str(path) = target.kind {
                    scan.includes.push(path);
                }
            }
            continue;
        }
        let interface = token.is_identifier("UINTERFACE");
        if interface || token.is_identifier("UCLASS") {
            if let Some(class) = prescan_class(&mut stream, interface) {
                scan.classes.push(class);
            }
        }
    }
    scan
}

fn prescan_class(stream: &mut TokenStream<Lexer<'_>>, interface: bool) -> Option<PrescannedClass> {
    if !stream.match_symbol("(") {
        return None;
    }
    let mut depth = 1usize;
    while depth > 0 {
        let token = stream.get_token();
        if token.is_eof() {
            return None;
        }
        if token.is_symbol("(") {
            depth += 1;
        } else if token.is_symbol(")") {
            depth -= 1;
        }
    }
    if !stream.match_identifier("class") {
        return None;
    }
    let mut name = stream.get_identifier()?;
    if is_api_macro(&name) {
        name = stream.get_identifier()?;
    }
    stream.match_identifier("final");
    let parent = if stream.match_symbol(":") {
        stream.match_identifier("public");
        stream.get_identifier().map(|t| t.text)
    } else {
        None
    };
    Some(PrescannedClass {
        name: name.text,
        parent,
        interface,
    })
}

/// Returns true for `XXX_API` export macros.
pub(crate) fn is_api_macro(token: &Token) -> bool {
    token.is_ident() && token.text.len() > 4 && token.text.ends_with("_API")
}

// =============================================================================
// Ordering
// =============================================================================

/// Parses `unit` after everything it depends on.
///
/// Marks the unit resolved before descending, so include cycles terminate.
pub fn resolve(session: &mut Session, unit: UnitId) -> CompilationResult {
    if session.unit(unit).dependencies_resolved {
        return CompilationResult::Succeeded;
    }
    session.unit_mut(unit).dependencies_resolved = true;

    let required = dependencies_of(session, unit);
    for dependency in required {
        let (scope, dependency_scope) = (session.unit(unit).scope, session.unit(dependency).scope);
        session.graph_mut().include_scope(scope, dependency_scope);
        log::debug!(
            target: "reflector",
            "{} requires {}",
            session.unit(unit).filename,
            session.unit(dependency).filename
        );
        let result = resolve(session, dependency);
        if !result.is_success() {
            return result;
        }
    }
    parse_header(session, unit)
}

/// Units `unit` must see parsed first: its includes, then the declaring
/// units of every unparsed ancestor of its classes.
fn dependencies_of(session: &Session, unit: UnitId) -> Vec<UnitId> {
    let mut required = Vec::new();
    let add = |id: UnitId, required: &mut Vec<UnitId>| {
        if id != unit && !required.contains(&id) {
            required.push(id);
        }
    };

    let bootstrap = session.config().bootstrap_header.as_str();
    for include in &session.unit(unit).includes {
        let bare = include.rsplit(['/', '\\']).next().unwrap_or(include);
        if bare == bootstrap {
            continue;
        }
        if let Some(dependency) = session.find_unit_by_include(include) {
            add(dependency, &mut required);
        }
    }

    for class in &session.unit(unit).prescanned {
        let mut parent = class.parent.clone();
        let mut steps = 0usize;
        while let Some(name) = parent.take() {
            steps += 1;
            if steps > session.units().len() * 64 || is_ready(session, &name) {
                break;
            }
            let Some(declaring) = session.find_unit_declaring_class(&name) else {
                break;
            };
            add(declaring, &mut required);
            parent = session
                .unit(declaring)
                .prescanned
                .iter()
                .find(|c| c.name == name)
                .and_then(|c| c.parent.clone());
        }
    }
    required
}

fn is_ready(session: &Session, class: &str) -> bool {
    session.find_type(class).is_some_and(|id| {
        session
            .graph()
            .node(id)
            .as_class()
            .is_some_and(|c| c.flags.intersects(ClassFlags::PARSED | ClassFlags::INTRINSIC))
    })
}

/// Parses one header. A unit is parsed at most once; a unit that failed
/// before reports [`CompilationResult::OtherCompilationError`] again.
pub fn parse_header(session: &mut Session, unit: UnitId) -> CompilationResult {
    if session.unit(unit).parsed {
        return CompilationResult::Succeeded;
    }
    session.unit_mut(unit).parsed = true;
    if session.is_failed(unit) {
        return CompilationResult::OtherCompilationError;
    }

    let source = session.unit(unit).source.clone();
    log::debug!(target: "reflector", "parsing {}", session.unit(unit).filename);
    let outcome = HeaderParser::new(session, unit, &source).parse();
    match outcome {
        Ok(()) => {
            log::info!(target: "reflector", "parsed {}", session.unit(unit).filename);
            CompilationResult::Succeeded
        }
        Err(err) => {
            log::error!(target: "reflector", "{}", err.report());
            // Children in other headers must see these classes as broken.
            let defined = session.unit(unit).defined_types.clone();
            for id in defined {
                if let Some(class) = session.graph_mut().node_mut(id).as_class_mut() {
                    class.flags.remove(ClassFlags::PARSED);
                }
            }
            session.record_failure(unit, err);
            CompilationResult::OtherCompilationError
        }
    }
}

/// Resolves and parses every unit of a module in order, stopping at the
/// first failure.
pub fn parse_module(session: &mut Session, units: &[UnitId]) -> CompilationResult {
    for &unit in units {
        if resolve(session, unit) != CompilationResult::Succeeded {
            log::error!(
                target: "reflector",
                "module parse stopped at {}",
                session.unit(unit).filename
            );
            return CompilationResult::CompilationError;
        }
    }
    CompilationResult::Succeeded
}
