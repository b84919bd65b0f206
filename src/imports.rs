//! Import hygiene: helper import injection and unused import pruning

use std::collections::HashMap;

use swc_core::common::{SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
    Decl, Expr, Ident, ImportDecl, ImportNamedSpecifier, ImportPhase, ImportSpecifier, Lit,
    Module, ModuleDecl, ModuleItem, Pat, Stmt, Str,
};
use swc_core::ecma::visit::{Visit, VisitWith};

use crate::constants::HELPER_FN;

/// Whether an import or a top-level declaration already binds the helper.
pub fn has_helper_binding(module: &Module) -> bool {
    module.body.iter().any(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => import
            .specifiers
            .iter()
            .any(|specifier| &*specifier_local(specifier).sym == HELPER_FN),
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => declares_helper(&export.decl),
        ModuleItem::Stmt(Stmt::Decl(decl)) => declares_helper(decl),
        _ => false,
    })
}

fn declares_helper(decl: &Decl) -> bool {
    match decl {
        Decl::Fn(function) => &*function.ident.sym == HELPER_FN,
        Decl::Class(class) => &*class.ident.sym == HELPER_FN,
        Decl::Var(var) => var
            .decls
            .iter()
            .any(|d| matches!(&d.name, Pat::Ident(binding) if &*binding.id.sym == HELPER_FN)),
        _ => false,
    }
}

/// Insert `import { applyTheme } from "<helper_module>";` unless something
/// already binds the name. Returns whether an import was added.
pub fn inject_helper_import(module: &mut Module, helper_module: &str) -> bool {
    if has_helper_binding(module) {
        log::debug!("'{}' already bound, no import injected", HELPER_FN);
        return false;
    }

    let position = module
        .body
        .iter()
        .take_while(|item| is_directive(item))
        .count();

    let import = ImportDecl {
        span: DUMMY_SP,
        specifiers: vec![ImportSpecifier::Named(ImportNamedSpecifier {
            span: DUMMY_SP,
            local: Ident::new(HELPER_FN.into(), DUMMY_SP, SyntaxContext::empty()),
            imported: None,
            is_type_only: false,
        })],
        src: Box::new(Str {
            span: DUMMY_SP,
            value: helper_module.into(),
            raw: None,
        }),
        type_only: false,
        with: None,
        phase: ImportPhase::Evaluation,
    };

    module
        .body
        .insert(position, ModuleItem::ModuleDecl(ModuleDecl::Import(import)));
    log::debug!("Injected import of '{}' from '{}'", HELPER_FN, helper_module);
    true
}

fn is_directive(item: &ModuleItem) -> bool {
    matches!(
        item,
        ModuleItem::Stmt(Stmt::Expr(stmt)) if matches!(&*stmt.expr, Expr::Lit(Lit::Str(_)))
    )
}

/// Remove import bindings that are no longer referenced anywhere in the
/// module. The helper and the `retained` names are never removed; a
/// declaration left without specifiers is dropped. Returns the number of
/// specifiers removed.
pub fn prune_unused_imports(module: &mut Module, retained: &[String]) -> usize {
    let mut counter = ReferenceCounter::default();
    module.visit_with(&mut counter);

    let mut removed = 0;
    module.body.retain_mut(|item| {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            return true;
        };
        if import.specifiers.is_empty() {
            return true;
        }

        let source = import.src.value.clone();
        import.specifiers.retain(|specifier| {
            let name = &*specifier_local(specifier).sym;
            let keep = name == HELPER_FN
                || retained.iter().any(|r| r == name)
                || counter.references(name) > 0;
            if !keep {
                log::debug!("Pruned unused import '{}' from '{}'", name, source);
                removed += 1;
            }
            keep
        });
        !import.specifiers.is_empty()
    });

    removed
}

fn specifier_local(specifier: &ImportSpecifier) -> &Ident {
    match specifier {
        ImportSpecifier::Named(named) => &named.local,
        ImportSpecifier::Default(default) => &default.local,
        ImportSpecifier::Namespace(namespace) => &namespace.local,
    }
}

/// Counts identifier occurrences by name outside import declarations.
#[derive(Debug, Default)]
struct ReferenceCounter {
    counts: HashMap<String, usize>,
}

impl ReferenceCounter {
    fn references(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }
}

impl Visit for ReferenceCounter {
    fn visit_import_decl(&mut self, _: &ImportDecl) {}

    fn visit_ident(&mut self, ident: &Ident) {
        *self.counts.entry(ident.sym.to_string()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::print_module;
    use crate::parser::parse_module;

    fn prune(source: &str) -> (String, usize) {
        let mut parsed = parse_module(source, "test.tsx").unwrap();
        let removed = prune_unused_imports(&mut parsed.module, &["React".to_string()]);
        let printed = print_module(&parsed.module, &parsed.source_map, None).unwrap();
        (printed, removed)
    }

    fn reprint(source: &str) -> String {
        let parsed = parse_module(source, "test.tsx").unwrap();
        print_module(&parsed.module, &parsed.source_map, None).unwrap()
    }

    #[test]
    fn test_inject_once() {
        let mut parsed = parse_module("const a = 1;", "test.tsx").unwrap();
        assert!(inject_helper_import(&mut parsed.module, "./applyTheme"));
        assert!(!inject_helper_import(&mut parsed.module, "./applyTheme"));

        let printed = print_module(&parsed.module, &parsed.source_map, None).unwrap();
        assert_eq!(
            printed,
            reprint("import { applyTheme } from \"./applyTheme\"; const a = 1;")
        );
    }

    #[test]
    fn test_inject_after_directives() {
        let mut parsed = parse_module("'use client'; import x from 'x';", "test.tsx").unwrap();
        inject_helper_import(&mut parsed.module, "@ui/theme");

        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = &parsed.module.body[1] else {
            panic!("expected helper import after the directive");
        };
        assert_eq!(&*import.src.value, "@ui/theme");
    }

    #[test]
    fn test_existing_bindings_block_injection() {
        for source in [
            "import { applyTheme } from '../theme';",
            "import applyTheme from '../theme';",
            "function applyTheme() {}",
            "export const applyTheme = () => null;",
        ] {
            let parsed = parse_module(source, "test.tsx").unwrap();
            assert!(has_helper_binding(&parsed.module), "for {}", source);
        }
        let parsed = parse_module("const a = applyTheme;", "test.tsx").unwrap();
        assert!(!has_helper_binding(&parsed.module));
    }

    #[test]
    fn test_prune_single_specifier() {
        let (out, removed) = prune(
            "import { applyTheme, other } from './theme'; const s = applyTheme(a);",
        );
        assert_eq!(
            out,
            reprint("import { applyTheme } from './theme'; const s = applyTheme(a);")
        );
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_prune_whole_declaration() {
        let (out, removed) = prune("import colors, { spacing } from './tokens'; const s = 1;");
        assert_eq!(out, reprint("const s = 1;"));
        assert_eq!(removed, 2);
    }

    #[test]
    fn test_prune_keeps_referenced_and_retained() {
        let source = "import React from 'react'; import './global.css'; import { Button } from './ui'; import * as tokens from './tokens'; import type { Theme } from './theme'; const el = <Button size={tokens.size} />; const f = (theme: Theme) => theme;";
        let (out, removed) = prune(source);
        assert_eq!(out, reprint(source));
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_member_property_names_are_not_references() {
        let (out, removed) = prune("import { color } from './tokens'; const s = theme.color;");
        assert_eq!(out, reprint("const s = theme.color;"));
        assert_eq!(removed, 1);
    }
}
