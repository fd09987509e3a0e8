//! Pure-text analysis of captured stderr: error-line extraction and fix
//! suggestions for known failure signatures.

use std::sync::OnceLock;

use regex::Regex;

/// Collect lines that look like errors, preserving input order.
///
/// A line matches when it contains "error" in any case, or the literal
/// token "ERR_" (Node-style error codes such as ERR_MODULE_NOT_FOUND).
pub fn collect_error_lines(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .filter(|line| line.to_lowercase().contains("error") || line.contains("ERR_"))
        .map(str::to_string)
        .collect()
}

fn module_not_found_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The gap is lazy and line-bounded; the captured name is restricted to
    // module-ish characters so stray apostrophes ("Can't resolve") don't
    // derail the quoted-name match.
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(?:module not found|cannot find module)[^\n]*?['"]([A-Za-z0-9@_./-]+)['"]"#)
            .expect("module-not-found pattern compiles")
    })
}

fn not_defined_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z_$][A-Za-z0-9_$]*) is not defined")
            .expect("not-defined pattern compiles")
    })
}

/// Pattern-match known failure signatures and emit one fix suggestion per
/// match: missing modules (quoted name after a module-not-found marker) and
/// undefined identifiers ("X is not defined").
pub fn suggest_fixes(stderr: &str) -> Vec<String> {
    let mut suggestions = Vec::new();

    for caps in module_not_found_re().captures_iter(stderr) {
        let module = &caps[1];
        let hint = format!(
            "Module '{}' is missing - install it (e.g. `npm install {}`)",
            module, module
        );
        if !suggestions.contains(&hint) {
            suggestions.push(hint);
        }
    }

    for caps in not_defined_re().captures_iter(stderr) {
        let name = &caps[1];
        let hint = format!(
            "`{}` is not defined - declare it or import it before use",
            name
        );
        if !suggestions.contains(&hint) {
            suggestions.push(hint);
        }
    }

    suggestions
}
