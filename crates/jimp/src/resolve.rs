//! Import resolution.
//!
//! A pure function from `(scanned symbols, package index)` to the set of
//! fully-qualified import targets. Identical inputs always yield identical
//! output - the candidate walk is over ordered sets and every rule is
//! side-effect free.

use crate::index::PackageIndex;
use crate::scan::SymbolMap;
use std::collections::BTreeSet;

/// Resolve the imports a scanned file needs.
///
/// Explicit imports pass through unfiltered. Each used-but-not-defined name
/// is degraded (trailing constant/field segment stripped), looked up, and
/// then run through the elision rules in order: duplicate simple name,
/// auto-visible `java.lang` type, generated-resource substitution, own
/// namespace.
pub fn solve(symbols: &SymbolMap, index: &PackageIndex) -> BTreeSet<String> {
    let mut resolved: BTreeSet<String> = symbols.imports.clone();

    for used in &symbols.uses {
        if symbols.defines.iter().any(|d| d == used) {
            continue;
        }
        let degraded = degrade_constant_ref(used);
        let Some(target) = index.get(degraded) else {
            // Unknown name: silently ignored. A "could not resolve"
            // diagnostic would hook in here.
            continue;
        };

        // Two imports with the same simple name would collide in the file;
        // the first resolved candidate keeps the slot.
        if resolved.iter().any(|r| dequalified(r) == dequalified(target)) {
            continue;
        }
        // Auto-visible standard types need no import.
        if target.strip_prefix("java.lang.") == Some(degraded) {
            continue;
        }
        // Generated resource classes always belong to the current project,
        // never to the platform. Without a known own package the candidate
        // is dropped.
        let target = if target == "android.R" {
            match index.own_package() {
                Some(package) => format!("{}.R", package),
                None => continue,
            }
        } else {
            target.to_string()
        };
        // Same-package types are visible without an import.
        if symbols.namespace.as_deref() == Some(namespace_of(&target)) {
            continue;
        }

        resolved.insert(target);
    }

    resolved
}

/// Last dotted segment of a fully-qualified name.
fn dequalified(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Everything before the last dotted segment; empty for simple names.
fn namespace_of(qualified: &str) -> &str {
    qualified.rsplit_once('.').map(|(ns, _)| ns).unwrap_or("")
}

/// Strip one trailing constant- or field-shaped segment, converting
/// `Foo.BAR_CONST` or `Foo.bar` usage into a lookup for `Foo`.
fn degrade_constant_ref(qualified: &str) -> &str {
    match qualified.rsplit_once('.') {
        Some((head, tail)) if is_constant_shape(tail) => head,
        _ => qualified,
    }
}

/// Constant/field identifier shape: all-caps-with-digits/underscores, or
/// all-lowercase.
fn is_constant_shape(segment: &str) -> bool {
    !segment.is_empty()
        && (segment
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
            || segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;

    fn index_of(pairs: &[(&str, &str)]) -> PackageIndex {
        let mut index = PackageIndex::new();
        for (short, target) in pairs {
            index.insert_source(short, target.to_string());
        }
        index
    }

    #[test]
    fn resolves_used_symbol_through_the_index() {
        let symbols = scan(
            "package com.example.app;\npublic class Main { void f() { new Helper(); } }\n",
        );
        let index = index_of(&[("Helper", "com.example.app.util.Helper")]);
        let resolved = solve(&symbols, &index);
        assert_eq!(
            resolved.into_iter().collect::<Vec<_>>(),
            vec!["com.example.app.util.Helper".to_string()]
        );
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let symbols = scan(
            "package a.b;\nclass C { void f() { new X(); new Y(); Z.NAME.run(); } }\n",
        );
        let index = index_of(&[("X", "p.X"), ("Y", "q.Y"), ("Z", "r.Z")]);
        let first = solve(&symbols, &index);
        for _ in 0..8 {
            assert_eq!(solve(&symbols, &index), first);
        }
    }

    #[test]
    fn self_defined_names_are_never_imported() {
        let symbols = scan("package a.b;\npublic class Widget { }\nnew Widget();");
        let index = index_of(&[("Widget", "x.y.Widget")]);
        assert!(solve(&symbols, &index).is_empty());
    }

    #[test]
    fn java_lang_types_are_elided() {
        let symbols = scan("package a.b;\nclass C { void f() { new Thread(); } }\n");
        let index = index_of(&[("Thread", "java.lang.Thread")]);
        assert!(solve(&symbols, &index).is_empty());
    }

    #[test]
    fn duplicate_simple_names_keep_the_first_resolution() {
        let symbols = scan("package a.b;\nclass C { void f() { new Helper(); } }\n");
        let index = index_of(&[("Helper", "p.q.Helper")]);

        let mut imports = symbols.clone();
        imports.imports.insert("z.other.Helper".to_string());
        let resolved = solve(&imports, &index);
        // The explicit z.other.Helper already claims the simple name.
        assert_eq!(
            resolved.into_iter().collect::<Vec<_>>(),
            vec!["z.other.Helper".to_string()]
        );
    }

    #[test]
    fn constant_references_degrade_before_lookup() {
        let symbols = scan("package a.b;\nclass C { int x = Hints.MAX_WIDTH; }\n");
        let index = index_of(&[("Hints", "com.lib.Hints")]);
        let resolved = solve(&symbols, &index);
        assert!(resolved.contains("com.lib.Hints"));
    }

    #[test]
    fn resource_class_rewrites_to_own_package() {
        let symbols = scan("package com.example.app;\nclass C { int x = R.layout.main; }\n");
        let mut index = index_of(&[("R", "android.R")]);
        index.set_own_package("com.example.app");
        let resolved = solve(&symbols, &index);
        // com.example.app.R is in the file's own namespace, so it is elided
        // entirely - the platform android.R never survives.
        assert!(!resolved.contains("android.R"));
        assert!(resolved.is_empty());
    }

    #[test]
    fn resource_class_from_another_package_is_rewritten_and_kept() {
        let symbols = scan("package com.example.lib;\nclass C { int x = R.layout.main; }\n");
        let mut index = index_of(&[("R", "android.R")]);
        index.set_own_package("com.example.app");
        let resolved = solve(&symbols, &index);
        assert!(resolved.contains("com.example.app.R"));
    }

    #[test]
    fn resource_class_without_own_package_is_dropped() {
        let symbols = scan("package com.example.lib;\nclass C { int x = R.layout.main; }\n");
        let index = index_of(&[("R", "android.R")]);
        assert!(solve(&symbols, &index).is_empty());
    }

    #[test]
    fn same_namespace_targets_are_elided() {
        let symbols = scan("package a.b;\nclass C { void f() { new Peer(); } }\n");
        let index = index_of(&[("Peer", "a.b.Peer")]);
        assert!(solve(&symbols, &index).is_empty());
    }

    #[test]
    fn explicit_imports_pass_through_even_when_self_defined() {
        // Pins the documented behavior over the variant that subtracts
        // self-defined names from explicit imports.
        let mut symbols = scan("package a.b;\npublic class Widget { }\n");
        symbols.imports.insert("x.y.Widget".to_string());
        let resolved = solve(&symbols, &PackageIndex::new());
        assert!(resolved.contains("x.y.Widget"));
    }

    #[test]
    fn unresolvable_names_are_silently_ignored() {
        let symbols = scan("package a.b;\nclass C { void f() { new Mystery(); } }\n");
        assert!(solve(&symbols, &PackageIndex::new()).is_empty());
    }
}
