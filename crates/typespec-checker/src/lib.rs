//! typespec checker: union, literal, callable and container subtyping over
//! annotated statements.
//!
//! ```text
//! source → Lexer → Parser → Normalizer → Checker (Subtype Relation) → VerdictReport
//! ```
//!
//! [`check_statements`] is the core entry point for an already parsed
//! [`Module`]. [`check_source`] runs the whole pipeline on source text, and
//! [`run_fixture`] additionally compares verdicts with `# OK` / `# ERR`
//! comments.

pub mod checker;
pub mod config;
pub mod env;
pub mod fixture;
pub mod normalize;
pub mod subtype;
pub mod ty;
pub mod verdict;

use tracing::debug;
use typespec_lexer::Lexer;
use typespec_parser::Parser;
use typespec_types::ast::Module;
use typespec_types::{CheckErrors, SourceFile, TypespecError};

pub use checker::{CallSite, Checker};
pub use config::{CheckerConfig, ConfigError, ContainerSpec};
pub use env::{Binding, BindingTable};
pub use fixture::{run_fixture, ExpectationCheck, FixtureResult};
pub use normalize::{normalize, NormalizeError, Normalizer};
pub use subtype::{is_subtype, SubtypeRelation};
pub use ty::{LiteralValue, PrimitiveKind, Type, Variance};
pub use verdict::{Reason, Status, Verdict, VerdictReport, VerdictReporter};

/// Check a parsed module, one verdict per statement.
pub fn check_statements(module: &Module, config: &CheckerConfig) -> VerdictReport {
    Checker::new(config).check(module)
}

/// Everything one run of the pipeline produced.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub source_file: SourceFile,
    pub module: Module,
    /// Lexer and parser errors.
    pub errors: CheckErrors,
    /// `None` when there were syntax errors.
    pub report: Option<VerdictReport>,
}

impl CheckOutcome {
    /// Syntax errors followed by one diagnostic per rejected statement.
    pub fn diagnostics(&self) -> CheckErrors {
        let mut all = self.errors.clone();
        for verdict in self.report.iter().flat_map(|r| r.verdicts()) {
            let (Some(code), Some(message)) = (verdict.code, &verdict.message) else {
                continue;
            };
            all.push_error(TypespecError::new(
                &self.source_file.name,
                code,
                message.clone(),
                verdict.span,
                self.source_file.line_for(verdict.span),
            ));
        }
        all
    }
}

/// Lex, parse and check `source` with the built-in container registry.
pub fn check_source(source: &str, file_name: &str) -> CheckOutcome {
    check_source_with(source, file_name, &CheckerConfig::default())
}

pub fn check_source_with(source: &str, file_name: &str, config: &CheckerConfig) -> CheckOutcome {
    let source_file = SourceFile::new(file_name, source);

    let lexed = Lexer::new(&source_file).lex();
    let mut errors = lexed.errors;
    let parsed = Parser::new(lexed.tokens, &source_file).parse();
    errors.extend(parsed.errors);
    debug!(
        file = file_name,
        statements = parsed.module.statements.len(),
        syntax_errors = errors.total_errors,
        "parsed"
    );

    let report = if errors.has_errors() {
        None
    } else {
        Some(check_statements(&parsed.module, config))
    };

    CheckOutcome {
        source_file,
        module: parsed.module,
        errors,
        report,
    }
}
