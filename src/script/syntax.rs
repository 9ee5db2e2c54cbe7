use log::error;
use rustpython_parser::{ast, Parse};

// @module: Strict Python syntax check

/// Source name reported in parser messages
const SOURCE_NAME: &str = "<scene>";

/// Check a script against the full Python 3 grammar
///
/// tree-sitter recovers from indentation errors and Python 2 statements,
/// so the timeline walk alone cannot tell a valid script from a broken one.
/// Returns the parser's message on failure.
pub fn check_syntax(script: &str) -> Result<(), String> {
    match ast::Suite::parse(script, SOURCE_NAME) {
        Ok(_) => Ok(()),
        Err(e) => {
            let reason = e.to_string();
            error!("Script rejected by the Python grammar: {}", reason);
            Err(reason)
        }
    }
}
