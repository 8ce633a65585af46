//! Assignment/call checker. Walks statements and asks the subtype relation
//! whether each assigned or passed value fits its declared type.
//!
//! Entry point: [`Checker::check`].
//!
//! Every statement yields exactly one [`Verdict`]. A rejected statement
//! never stops the pass.
//!
//! | Statement          | Verdict                                               |
//! |--------------------|-------------------------------------------------------|
//! | `x: T = e`         | `e <: T`; binds `x: T` whatever the outcome           |
//! | `x: T`             | `OK`; binds `x: T`                                    |
//! | `x = e`            | `e <:` current type of `x`; binds nothing             |
//! | `f(a, ...)`        | `f` callable, arity matches, every `a_i <: p_i`       |
//! | `def f(...) -> R`  | `OK`; binds `f` to its `Callable`                     |
//!
//! A statement whose own annotation fails to normalize is
//! `ERR/invalid-annotation` and binds nothing.

use tracing::{debug, info_span};
use typespec_types::ast::*;
use typespec_types::ErrorCode;

use crate::config::CheckerConfig;
use crate::env::BindingTable;
use crate::normalize::{NormalizeError, Normalizer};
use crate::subtype::SubtypeRelation;
use crate::ty::{Type, Variance};
use crate::verdict::{Reason, Verdict, VerdictReport, VerdictReporter};

// ══════════════════════════════════════════════════════════════════════════════
// Rejection
// ══════════════════════════════════════════════════════════════════════════════

/// Why the current statement fails. Converted to a [`Verdict`] at the
/// statement boundary.
#[derive(Debug)]
struct Rejection {
    reason: Reason,
    code: ErrorCode,
    message: String,
}

impl Rejection {
    fn new(reason: Reason, message: impl Into<String>) -> Self {
        Self {
            reason,
            code: reason.code(),
            message: message.into(),
        }
    }

    fn annotation(ann: &TypeExpr, err: NormalizeError) -> Self {
        Self {
            reason: Reason::InvalidAnnotation,
            code: err.code(),
            message: format!("in annotation '{ann}': {err}"),
        }
    }

    fn unresolved(name: &str) -> Self {
        Self::new(Reason::UnresolvedName, format!("name '{name}' is not defined"))
    }

    fn context(mut self, prefix: impl std::fmt::Display) -> Self {
        self.message = format!("{prefix}: {}", self.message);
        self
    }
}

type Check<T> = Result<T, Rejection>;

/// A call whose callee resolved to a callable of matching arity.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub callee: String,
    pub params: Vec<Type>,
    pub ret: Type,
    /// Inferred argument types, in order.
    pub args: Vec<Type>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Checker
// ══════════════════════════════════════════════════════════════════════════════

pub struct Checker<'c> {
    config: &'c CheckerConfig,
    normalizer: Normalizer<'c>,
    relation: SubtypeRelation<'c>,
    bindings: BindingTable,
}

impl<'c> Checker<'c> {
    pub fn new(config: &'c CheckerConfig) -> Self {
        Self {
            config,
            normalizer: Normalizer::new(config),
            relation: SubtypeRelation::new(config),
            bindings: BindingTable::new(),
        }
    }

    /// Check every statement of `module` in order.
    pub fn check(&mut self, module: &Module) -> VerdictReport {
        let span = info_span!("check", statements = module.statements.len());
        let _guard = span.enter();

        let mut reporter = VerdictReporter::new();
        for (index, stmt) in module.statements.iter().enumerate() {
            let verdict = self.check_statement(index, stmt);
            debug!(
                index,
                line = stmt.span.start_line,
                status = %verdict.status,
                reason = verdict.reason.map(|r| r.as_str()),
                "verdict"
            );
            reporter.record(verdict);
        }
        reporter.report()
    }

    /// Bindings created so far, including shadowed ones.
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    fn check_statement(&mut self, index: usize, stmt: &Statement) -> Verdict {
        let result = match &stmt.kind {
            StmtKind::VarDecl(decl) => self.check_var_decl(index, decl),
            StmtKind::Assign(assign) => self.check_assign(assign),
            StmtKind::Call(call) => self.check_call(call).map(|_| ()),
            StmtKind::FuncDecl(func) => self.check_func_decl(index, func),
        };
        match result {
            Ok(()) => Verdict::ok(index, stmt.span),
            Err(rejection) => Verdict::err(index, stmt.span, rejection.reason, rejection.message)
                .with_code(rejection.code),
        }
    }

    // ── Statements ────────────────────────────────────────────────────────

    fn check_var_decl(&mut self, index: usize, decl: &VarDecl) -> Check<()> {
        let declared = self.annotation(&decl.type_ann)?;
        let outcome = match &decl.init {
            Some(init) => self
                .infer(init)
                .and_then(|found| self.expect_assignable(&found, &declared)),
            None => Ok(()),
        };
        self.bindings
            .bind(&decl.name.name, declared, index, decl.name.span);
        outcome
    }

    fn check_assign(&mut self, assign: &Assign) -> Check<()> {
        let declared = self
            .bindings
            .lookup(&assign.target.name)
            .map(|b| b.ty.clone())
            .ok_or_else(|| Rejection::unresolved(&assign.target.name))?;
        let found = self.infer(&assign.value)?;
        self.expect_assignable(&found, &declared)
    }

    fn check_func_decl(&mut self, index: usize, func: &FuncDecl) -> Check<()> {
        let params = func
            .params
            .iter()
            .map(|p| {
                self.annotation(&p.type_ann)
                    .map_err(|r| r.context(format!("parameter '{}'", p.name.name)))
            })
            .collect::<Check<Vec<_>>>()?;
        let ret = self
            .annotation(&func.ret)
            .map_err(|r| r.context("return type"))?;
        self.bindings.bind(
            &func.name.name,
            Type::callable(params, ret),
            index,
            func.name.span,
        );
        Ok(())
    }

    /// Check a call and return the callee's result type.
    fn check_call(&mut self, call: &CallExpr) -> Check<Type> {
        let name = &call.callee.name;
        let callee = self
            .bindings
            .lookup(name)
            .map(|b| b.ty.clone())
            .ok_or_else(|| Rejection::unresolved(name))?;
        let (params, ret) = match callee {
            Type::Callable { params, ret } => (params, ret),
            other => {
                return Err(Rejection::new(
                    Reason::KindMismatch,
                    format!("'{name}' has type {other}, which is not callable"),
                ));
            }
        };
        if call.args.len() != params.len() {
            return Err(Rejection::new(
                Reason::ArityMismatch,
                format!(
                    "'{name}' takes {} argument{}, got {}",
                    params.len(),
                    if params.len() == 1 { "" } else { "s" },
                    call.args.len()
                ),
            ));
        }
        let args = call
            .args
            .iter()
            .map(|arg| self.infer(arg))
            .collect::<Check<Vec<_>>>()?;
        let site = CallSite {
            callee: name.clone(),
            params,
            ret: *ret,
            args,
        };
        self.check_arguments(&site)?;
        Ok(site.ret)
    }

    fn check_arguments(&self, site: &CallSite) -> Check<()> {
        for (i, (found, param)) in site.args.iter().zip(&site.params).enumerate() {
            self.expect_assignable(found, param).map_err(|r| {
                r.context(format!("argument {} of '{}'", i + 1, site.callee))
            })?;
        }
        Ok(())
    }

    // ── Types ─────────────────────────────────────────────────────────────

    fn annotation(&self, ann: &TypeExpr) -> Check<Type> {
        self.normalizer
            .normalize(ann)
            .map_err(|err| Rejection::annotation(ann, err))
    }

    /// The narrowest type of an expression.
    fn infer(&mut self, expr: &Expr) -> Check<Type> {
        let ty = match &expr.kind {
            ExprKind::Int(v) => Type::literal_int(*v),
            ExprKind::Str(s) => Type::literal_str(s.clone()),
            ExprKind::Bool(b) => Type::literal_bool(*b),
            ExprKind::Float(_) => Type::FLOAT,
            ExprKind::Bytes(_) => Type::BYTES,
            ExprKind::FormattedStr(_) => Type::STR,
            ExprKind::None => Type::NONE,
            ExprKind::List(items) => {
                let elements = items
                    .iter()
                    .map(|item| self.infer(item).map(|t| t.widen()))
                    .collect::<Check<Vec<_>>>()?;
                self.list_of(Type::union(elements))
            }
            ExprKind::Name(name) => self
                .bindings
                .lookup(name)
                .map(|b| b.ty.clone())
                .ok_or_else(|| Rejection::unresolved(name))?,
            ExprKind::Call(call) => self.check_call(call)?,
        };
        Ok(ty)
    }

    /// The type of a list display with the given element type.
    fn list_of(&self, element: Type) -> Type {
        let display = self.config.list_display.as_str();
        match self.config.resolve(display) {
            Some((ctor, spec)) => Type::container(ctor, element, spec.variance),
            None => Type::container(display, element, Variance::Invariant),
        }
    }

    fn expect_assignable(&self, found: &Type, declared: &Type) -> Check<()> {
        if self.relation.is_subtype(found, declared) {
            return Ok(());
        }
        Err(self.mismatch(found, declared))
    }

    /// A literal value missing from a literal set of its own kind is out of
    /// range; anything else is a kind mismatch.
    fn mismatch(&self, found: &Type, declared: &Type) -> Rejection {
        if let Type::Literal(value) = found {
            let kind = value.base_kind();
            if declared.literals().any(|l| l.base_kind() == kind) {
                return Rejection::new(
                    Reason::LiteralOutOfRange,
                    format!("{value} is not one of {declared}"),
                );
            }
        }
        Rejection::new(
            Reason::KindMismatch,
            format!("expected {declared}, found {found}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typespec_lexer::Lexer;
    use typespec_parser::Parser;
    use typespec_types::SourceFile;

    fn module(source: &str) -> Module {
        let sf = SourceFile::new("test.py", source);
        let tokens = Lexer::new(&sf).lex().tokens;
        let result = Parser::new(tokens, &sf).parse();
        assert!(!result.errors.has_errors(), "{:?}", result.errors.errors);
        result.module
    }

    fn check(source: &str) -> VerdictReport {
        let config = CheckerConfig::default();
        Checker::new(&config).check(&module(source))
    }

    /// Reason per statement; `None` means OK.
    fn outcomes(source: &str) -> Vec<Option<Reason>> {
        check(source).verdicts().iter().map(|v| v.reason).collect()
    }

    #[test]
    fn test_literal_widening_into_union() {
        assert_eq!(
            outcomes("i: Union[int, str] = 1\nj: Union[int, str] = \"aa\"\n"),
            vec![None, None]
        );
    }

    #[test]
    fn test_kind_mismatch_message() {
        let report = check("k: Union[list[int], str] = 1\n");
        let v = &report.verdicts()[0];
        assert_eq!(v.reason, Some(Reason::KindMismatch));
        assert_eq!(v.code, Some(ErrorCode::KIND_MISMATCH));
        assert_eq!(
            v.message.as_deref(),
            Some("expected list[int] | str, found Literal[1]")
        );
    }

    #[test]
    fn test_literal_out_of_range() {
        let report = check("w: Literal[1, 2, 3] = 8\nv: Literal[1, 2] = \"a\"\n");
        assert_eq!(report.verdicts()[0].reason, Some(Reason::LiteralOutOfRange));
        assert_eq!(
            report.verdicts()[0].message.as_deref(),
            Some("8 is not one of Literal[1, 2, 3]")
        );
        // A str cannot be "out of range" of an int literal set.
        assert_eq!(report.verdicts()[1].reason, Some(Reason::KindMismatch));
    }

    #[test]
    fn test_list_display_inference() {
        assert_eq!(
            outcomes("a: list[int] = [1, 2]\nb: list[int | str] = [1, \"a\"]\nc: list[str] = []\nd: list[str] = [1]\n"),
            vec![None, None, Some(Reason::KindMismatch), Some(Reason::KindMismatch)]
        );
    }

    #[test]
    fn test_empty_list_into_covariant_container() {
        assert_eq!(outcomes("e: Iterable[str] = []\n"), vec![None]);
    }

    #[test]
    fn test_call_checks() {
        let src = "def f(x: Union[int, str]) -> None:\n    pass\n\
                   f(1)\nf(None)\nf(1, 2)\nh(1)\n";
        assert_eq!(
            outcomes(src),
            vec![
                None,
                None,
                Some(Reason::KindMismatch),
                Some(Reason::ArityMismatch),
                Some(Reason::UnresolvedName),
            ]
        );
    }

    #[test]
    fn test_calling_non_callable() {
        let report = check("x: int = 1\nx(1)\n");
        let v = &report.verdicts()[1];
        assert_eq!(v.reason, Some(Reason::KindMismatch));
        assert!(v.message.as_deref().unwrap().contains("not callable"));
    }

    #[test]
    fn test_argument_message_names_position() {
        let report = check("def f(a: int, b: str) -> None: pass\nf(1, 2)\n");
        assert_eq!(
            report.verdicts()[1].message.as_deref(),
            Some("argument 2 of 'f': expected str, found Literal[2]")
        );
    }

    #[test]
    fn test_callable_assignment_is_contravariant() {
        let src = "def f(x: Union[int, str]) -> None:\n    pass\n\
                   def g(x: int) -> int:\n    return x\n\
                   _: Callable[[Union[int, str]], None] = f\n\
                   _: Callable[[Union[int, str]], None] = g\n";
        assert_eq!(
            outcomes(src),
            vec![None, None, None, Some(Reason::KindMismatch)]
        );
    }

    #[test]
    fn test_call_expression_has_return_type() {
        let src = "def g(x: int) -> int: pass\na: int = g(1)\nb: str = g(1)\nc: int = g(\"x\")\n";
        assert_eq!(
            outcomes(src),
            vec![None, None, Some(Reason::KindMismatch), Some(Reason::KindMismatch)]
        );
    }

    #[test]
    fn test_redeclaration_shadows() {
        let src = "w: Literal[1, 2] = 1\nw: str = \"a\"\nw = \"b\"\nw = 1\n";
        let config = CheckerConfig::default();
        let mut checker = Checker::new(&config);
        let report = checker.check(&module(src));
        let reasons: Vec<_> = report.verdicts().iter().map(|v| v.reason).collect();
        assert_eq!(reasons, vec![None, None, None, Some(Reason::KindMismatch)]);
        assert_eq!(checker.bindings().history("w").count(), 2);
        assert_eq!(checker.bindings().lookup("w").unwrap().position, 1);
    }

    #[test]
    fn test_binding_survives_failed_initializer() {
        let src = "x: int = \"a\"\ny: int = x\n";
        assert_eq!(outcomes(src), vec![Some(Reason::KindMismatch), None]);
    }

    #[test]
    fn test_initializer_cannot_see_own_name() {
        assert_eq!(outcomes("x: int = x\n"), vec![Some(Reason::UnresolvedName)]);
    }

    #[test]
    fn test_assign_without_binding() {
        assert_eq!(outcomes("z = 1\n"), vec![Some(Reason::UnresolvedName)]);
    }

    #[test]
    fn test_invalid_annotation_binds_nothing() {
        let report = check("x: Literal[1, \"a\"] = 1\nx = 1\n");
        let first = &report.verdicts()[0];
        assert_eq!(first.reason, Some(Reason::InvalidAnnotation));
        assert_eq!(first.code, Some(ErrorCode::INVALID_LITERAL_KIND));
        assert_eq!(report.verdicts()[1].reason, Some(Reason::UnresolvedName));
    }

    #[test]
    fn test_invalid_parameter_annotation() {
        let report = check("def f(x: Foo) -> None: pass\nf(1)\n");
        let first = &report.verdicts()[0];
        assert_eq!(first.reason, Some(Reason::InvalidAnnotation));
        assert_eq!(first.code, Some(ErrorCode::UNKNOWN_TYPE));
        assert!(first.message.as_deref().unwrap().starts_with("parameter 'x'"));
        assert_eq!(report.verdicts()[1].reason, Some(Reason::UnresolvedName));
    }

    #[test]
    fn test_declaration_without_initializer() {
        assert_eq!(outcomes("x: Optional[int]\nx = None\nx = \"s\"\n"), vec![
            None,
            None,
            Some(Reason::KindMismatch)
        ]);
    }

    #[test]
    fn test_other_expression_kinds() {
        let src = "a: float = 1.5\nb: bytes = b\"x\"\nc: str = f\"{a}\"\nd: bool = True\ne: int = True\n";
        assert_eq!(
            outcomes(src),
            vec![None, None, None, None, Some(Reason::KindMismatch)]
        );
    }

    #[test]
    fn test_custom_list_display() {
        let config = CheckerConfig::from_json(r#"{ "list_display": "Sequence" }"#).unwrap();
        let report = Checker::new(&config).check(&module("a: list[int] = [1]\nb: Iterable[int] = [1]\n"));
        assert_eq!(report.verdicts()[0].reason, Some(Reason::KindMismatch));
        assert!(report.verdicts()[1].is_ok());
    }
}
