//! Dynamic delegate signatures declared with `DECLARE_DYNAMIC_*` macros.

use reflector_foundation::{Error, MetaData, Result};
use reflector_model::{FunctionData, FunctionFlags, PropertyFlags, SparseDelegate, TypeId, TypeKind, TypeNode};

use super::HeaderParser;
use super::functions::FunctionSpec;
use super::specifiers::Specifier;
use super::types::{NameScope, VariableCategory};
use crate::nest::{AllowFlags, NestKind};

const CONTEXT: &str = "Delegate Declaration";

/// Parameter-count words, one through nine.
const PARAM_COUNT_WORDS: [&str; 9] = [
    "_OneParam",
    "_TwoParams",
    "_ThreeParams",
    "_FourParams",
    "_FiveParams",
    "_SixParams",
    "_SevenParams",
    "_EightParams",
    "_NineParams",
];

/// Name a delegate's signature is stored under: `FOnHit` becomes
/// `OnHit__DelegateSignature`.
pub(crate) fn signature_name(delegate: &str) -> String {
    format!("{}__DelegateSignature", delegate.strip_prefix('F').unwrap_or(delegate))
}

/// The components of a `DECLARE_DYNAMIC_*` macro name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct DelegateMacro {
    multicast: bool,
    sparse: bool,
    has_return: bool,
    is_const: bool,
    params: usize,
}

impl DelegateMacro {
    /// Splits `text` into components and checks it against the canonical
    /// spelling of those components.
    fn parse(text: &str) -> Result<Self> {
        let upper = text.to_ascii_uppercase();
        let params = PARAM_COUNT_WORDS
            .iter()
            .position(|word| upper.contains(&word.to_ascii_uppercase()))
            .map_or(0, |index| index + 1);
        let parsed = Self {
            multicast: upper.contains("_MULTICAST"),
            sparse: upper.contains("_SPARSE"),
            has_return: upper.contains("_RETVAL"),
            is_const: upper.contains("_CONST"),
            params,
        };
        let expected = parsed.canonical();
        if expected != text {
            return Err(Error::syntax(format!(
                "Unable to parse delegate declaration; expected '{expected}' but found '{text}'."
            )));
        }
        Ok(parsed)
    }

    fn canonical(&self) -> String {
        format!(
            "DECLARE_DYNAMIC{}{}_DELEGATE{}{}{}",
            if self.multicast { "_MULTICAST" } else { "" },
            if self.sparse { "_SPARSE" } else { "" },
            if self.has_return { "_RetVal" } else { "" },
            self.params
                .checked_sub(1)
                .map_or("", |index| PARAM_COUNT_WORDS[index]),
            if self.is_const { "_Const" } else { "" },
        )
    }
}

impl HeaderParser<'_> {
    /// Parses a delegate macro invocation. `annotated` is set when the
    /// macro followed `UDELEGATE(...)`, whose specifiers are passed in.
    pub(super) fn compile_delegate(
        &mut self,
        macro_token: &reflector_syntax::Token,
        annotated: bool,
        specifiers: Vec<Specifier>,
        mut metadata: MetaData,
    ) -> Result<TypeId> {
        let mut spec = FunctionSpec::default();
        if annotated {
            self.process_function_specifiers(&mut spec, &specifiers, &mut metadata)?;
            if !macro_token.ident().is_some_and(|name| name.starts_with("DECLARE_DYNAMIC_")) {
                return Err(Error::syntax(format!(
                    "Unexpected token following UDELEGATE(): {macro_token}"
                )));
            }
            self.nests.check_allowed(CONTEXT, AllowFlags::TYPE_DECL)?;
        } else {
            self.nests.check_allowed(CONTEXT, AllowFlags::IMPLICIT_DELEGATE_DECL)?;
        }

        let form = DelegateMacro::parse(&macro_token.text)?;
        if form.has_return && form.multicast {
            self.report_error("Multi-cast delegates function signatures must not return a value");
        }
        if form.sparse && !form.multicast {
            return Err(Error::syntax("Sparse delegates must be multicast"));
        }

        spec.flags |= FunctionFlags::PUBLIC | FunctionFlags::DELEGATE;
        if form.multicast {
            spec.flags |= FunctionFlags::MULTICAST_DELEGATE;
        }
        if form.is_const {
            spec.flags |= FunctionFlags::CONST;
        }

        let scope = self.current_scope();
        let owner = (scope != self.file_scope()).then_some(self.class).flatten();
        let line = self.stream.line();

        self.stream.require_symbol("(", CONTEXT)?;
        let return_type = if form.has_return {
            let prop = self.parse_var_type(
                VariableCategory::Return,
                PropertyFlags::empty(),
                owner,
                Vec::new(),
                MetaData::new(),
            )?;
            self.stream.require_symbol(",", CONTEXT)?;
            Some(prop)
        } else {
            None
        };

        let Some(declared) = self.stream.get_identifier() else {
            return Err(Error::syntax(format!("Missing name for {CONTEXT}")));
        };
        if !declared.text.starts_with('F') {
            return Err(Error::semantic("Delegate type declarations must start with F"));
        }
        let name = signature_name(&declared.text);
        log::trace!(target: "reflector", "{}({line}): delegate {}", self.filename, declared.text);

        let sparse = if form.sparse {
            self.stream.require_symbol(",", CONTEXT)?;
            let owning_class = self.stream.require_identifier("sparse delegate owning class")?.text;
            self.stream.require_symbol(",", CONTEXT)?;
            let delegate_name = self.stream.require_identifier("sparse delegate name")?.text;
            Some(SparseDelegate {
                owning_class,
                delegate_name,
            })
        } else {
            None
        };

        let node = TypeNode::new(name.as_str(), scope, TypeKind::Delegate(FunctionData::default()))
            .declared_at(self.unit, line);
        let id = self.session.graph_mut().add_node(node);
        self.nests.push(NestKind::FunctionDeclaration, scope, Some(id))?;

        let params = if form.params > 0 {
            self.stream.require_symbol(",", CONTEXT)?;
            let params = self.parse_parameter_list(&name, spec.flags, owner, true, &mut metadata)?;
            if params.len() != form.params {
                return Err(Error::syntax(format!(
                    "Expected {} parameters but found {} parameters",
                    form.params,
                    params.len()
                )));
            }
            params
        } else {
            self.stream.require_symbol(")", CONTEXT)?;
            Vec::new()
        };

        let return_value = match return_type {
            Some(mut prop) => {
                prop.flags |= PropertyFlags::PARM | PropertyFlags::OUT_PARM | PropertyFlags::RETURN_PARM;
                let names = NameScope {
                    owner,
                    function: Some((name.as_str(), params.as_slice())),
                };
                self.parse_var_name_and_dim(&mut prop, VariableCategory::Return, names)?;
                Some(prop)
            }
            None => None,
        };
        self.nests.pop(NestKind::FunctionDeclaration, "'Delegate'")?;

        self.parse_field_metadata(&name, &mut metadata)?;
        let raw_comment = self.take_tooltip(&mut metadata);
        self.stream.match_symbol(";");

        if params.iter().any(|p| p.flags.contains(PropertyFlags::OUT_PARM)) {
            spec.flags |= FunctionFlags::HAS_OUT_PARMS;
        }
        let mut data = spec.into_data(&name, owner);
        data.params = params;
        data.return_value = return_value;
        data.sparse = sparse;

        let graph = self.session.graph_mut();
        if graph.scope(scope).get(&name).is_some() {
            return Err(Error::semantic(format!("Can't override delegate signature function '{name}'")));
        }
        let node = graph.node_mut(id);
        node.metadata = metadata;
        node.raw_comment = raw_comment;
        node.kind = TypeKind::Delegate(data);
        graph.declare(scope, &name, id)?;
        Ok(id)
    }
}
