//! Lexical symbol scanner for Java source.
//!
//! One linear pass with a single regex alternation - no grammar, no syntax
//! tree. The scanner is deliberately crude: it recognizes just enough shapes
//! (keyword-led declarations, assignment left-hand sides, capitalized dot
//! chains) to feed import resolution, and its false positives and false
//! negatives are accepted behavior. Resolution downstream tolerates both.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Primitives and auto-visible standard types that never need resolution.
/// Matches against these are dropped from every bucket.
const INTRINSIC: &[&str] = &[
    "int", "boolean", "byte", "char", "double", "float", "long", "void", "Integer", "Boolean",
    "Char", "Double", "Float", "Long", "String", "Void", "Exception", "Runnable",
];

/// Keywords that introduce a declaration or usage. The keyword immediately
/// before the captured name decides which bucket it lands in.
const KEYWORDS: &str = "package|new|import|implements|extends|enum|private|public|protected\
|final|static|class|interface|volatile|synchronized|abstract";

/// Symbols extracted from one source file.
///
/// `defines` keeps first-seen order so that a later entry can be read as a
/// nested declaration of an earlier one (see [`SymbolMap::scoped_defines`]).
/// The set-valued buckets are ordered so downstream resolution is
/// deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolMap {
    /// Declared package, if any. Last `package` declaration wins.
    pub namespace: Option<String>,
    /// Import statements already present in the file.
    pub imports: BTreeSet<String>,
    /// Declared type names (and assignment-LHS lookalikes), in lexical order.
    pub defines: Vec<String>,
    /// Referenced names, qualified or simple.
    pub uses: BTreeSet<String>,
}

impl SymbolMap {
    /// Pair each defined name with its enclosing top-level scope.
    ///
    /// The first define is its own scope; every later define is dot-joined
    /// under that running scope, modeling inner declarations without a parse
    /// tree. Yields `(scope, qualified_local_name)`.
    pub fn scoped_defines(&self) -> Vec<(String, String)> {
        let mut scope: Option<&str> = None;
        let mut out = Vec::with_capacity(self.defines.len());
        for define in &self.defines {
            match scope {
                None => {
                    scope = Some(define);
                    out.push((define.clone(), define.clone()));
                }
                Some(s) => out.push((s.to_string(), format!("{}.{}", s, define))),
            }
        }
        out
    }
}

/// The three match shapes, in precedence order: an assignment left-hand side
/// (constant-style or all-lowercase identifier followed by `=`), a keyword
/// run followed by a dotted name, and a bare capitalized dot chain. The
/// alternation is leftmost-first, so an earlier shape never loses to a later
/// one starting at the same position.
fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pat = format!(
            r"\b(?P<assign>[A-Z0-9_]+|[a-z0-9_]+)\b\s*=|(?:(?P<op>{KEYWORDS}) )+\b(?P<class>[A-Za-z0-9_.*]+)\b|\b(?P<ctx>[A-Z][A-Za-z0-9_]*(?:\.[A-Z][A-Za-z0-9_]*)*)\b"
        );
        Regex::new(&pat).expect("scanner pattern is well-formed")
    })
}

/// Scan one file's text into a [`SymbolMap`].
///
/// Never fails: malformed input degrades to an empty or partial map.
pub fn scan(text: &str) -> SymbolMap {
    let mut symbols = SymbolMap::default();

    for m in pattern().captures_iter(text) {
        let name = m
            .name("class")
            .or_else(|| m.name("ctx"))
            .or_else(|| m.name("assign"))
            .map(|g| g.as_str())
            .unwrap_or_default();
        if name.is_empty() || INTRINSIC.contains(&name) {
            continue;
        }

        match m.name("op").map(|g| g.as_str()) {
            Some("package") => symbols.namespace = Some(name.to_string()),
            Some("import") => {
                symbols.imports.insert(name.to_string());
            }
            Some("class") | Some("interface") | Some("enum") => {
                symbols.defines.push(name.to_string())
            }
            Some(_) => {
                symbols.uses.insert(name.to_string());
            }
            None if m.name("assign").is_some() => symbols.defines.push(name.to_string()),
            None => {
                symbols.uses.insert(name.to_string());
            }
        }
    }

    symbols
}
