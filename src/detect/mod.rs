//! Detection of code-quality defects in the structural tree.

mod builtins;
mod docstrings;
mod excepts;
mod functions;
mod imports;
mod literals;
mod main_guard;
mod names;
mod runner;
mod types;
mod variables;

pub use builtins::is_builtin;
pub use docstrings::detect_missing_docstrings;
pub use excepts::detect_bare_excepts;
pub use functions::{detect_complex_functions, detect_too_many_arguments};
pub use imports::detect_unused_imports;
pub use literals::detect_repeated_literals;
pub use main_guard::detect_missing_main_guard;
pub use names::detect_undefined_names;
pub use runner::{default_checks, AnalysisContext, Check, CheckFn, Engine};
pub use types::{sort_findings, Finding, Rule, Severity};
pub use variables::detect_unused_variables;

#[cfg(test)]
pub(crate) mod testutil {
    use super::{sort_findings, AnalysisContext, CheckFn, Finding};
    use crate::config::Config;
    use crate::parser;
    use crate::symbols::SymbolTable;

    /// Run a single check against parsed source with default settings.
    pub fn run_check(src: &str, check: CheckFn) -> Vec<Finding> {
        let tree = parser::parse(src).expect("test source must parse");
        let symbols = SymbolTable::build(&tree);
        let config = Config::default();
        let ctx = AnalysisContext {
            tree: &tree,
            symbols: &symbols,
            config: &config,
        };
        let mut findings = check(&ctx);
        sort_findings(&mut findings);
        findings
    }
}
