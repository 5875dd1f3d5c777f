//! TruCode - static analysis for Python source files.
//!
//! TruCode parses one source unit into a structural tree, builds a symbol
//! table of bindings and uses, runs a fixed catalogue of defect checks and
//! renders each finding into an actionable suggestion, optionally enriched
//! by an AI scoring collaborator.
//!
//! # Architecture
//!
//! The pipeline is a straight line of pure stages:
//!
//! - `parser`: source text to an arena tree of nodes
//! - `symbols`: one pass recording bindings, uses and scopes
//! - `detect`: independent rule checks over (tree, symbols)
//! - `suggest`: templates per rule, plus the optional AI scorer
//! - `report`: pretty and JSON renderings
//!
//! A parse failure does not abort the run: it becomes a single
//! `syntax_error` finding with its baseline suggestion.

pub mod cli;
pub mod config;
pub mod describe;
pub mod detect;
pub mod parser;
pub mod report;
pub mod suggest;
pub mod symbols;
pub mod tree;

pub use config::Config;
pub use detect::{Engine, Finding, Rule, Severity};
pub use parser::ParseError;
pub use suggest::{NoopScorer, RemoteScorer, Scorer, Suggestion, SuggestionEngine};
pub use symbols::SymbolTable;

use tracing::debug;
use tree::Span;

/// Everything one pipeline run produces.
pub struct Analysis {
    /// Prose digest of the module.
    pub description: Option<String>,
    pub findings: Vec<Finding>,
    pub suggestions: Vec<Suggestion>,
}

/// Run the full pipeline over one source unit.
///
/// Never fails: syntax errors degrade to a single Error finding, scoring
/// errors degrade to baseline suggestions.
pub fn analyze(source: &str, config: &Config, scorer: Box<dyn Scorer>) -> Analysis {
    debug!(bytes = source.len(), "parsing source");
    match parser::parse(source) {
        Ok(tree) => {
            let symbols = SymbolTable::build(&tree);
            debug!(
                nodes = tree.len(),
                bindings = symbols.bindings().len(),
                uses = symbols.uses().len(),
                "symbol table built"
            );

            let engine = Engine::new(config);
            let findings = engine.detect(&tree, &symbols, config);

            let suggester = SuggestionEngine::new(scorer, config.ai.context_lines);
            let suggestions = suggester.suggest(&findings, source);
            debug!(suggestions = suggestions.len(), "suggestions rendered");

            Analysis {
                description: Some(describe::describe(&tree)),
                findings,
                suggestions,
            }
        }
        Err(err) => {
            debug!(error = %err, "parse failed, downgrading to a syntax_error finding");
            let span = Span {
                start_byte: 0,
                end_byte: 0,
                start_line: err.line,
                start_col: err.column,
                end_line: err.line,
                end_col: err.column + 1,
            };
            let findings = vec![Finding::new(
                Rule::SyntaxError,
                span,
                format!("Syntax error: {}", err.message),
            )];
            // No tree to give the scorer meaningful context; keep baselines.
            let suggester = SuggestionEngine::new(Box::new(NoopScorer), config.ai.context_lines);
            let suggestions = suggester.suggest(&findings, source);

            Analysis {
                description: Some(describe::describe_unparsed(source)),
                findings,
                suggestions,
            }
        }
    }
}
