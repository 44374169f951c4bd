//! Main script rewriting.
//!
//! Parses the inline main script with oxc to find every
//! `new <namespace>.<Name>(...)`, resolves each name against the registry,
//! and cuts the namespace out of the callee in the original text. Only the
//! callee spans change, so comments and formatting stay as written.
//!
//! The tree lives in an arena owned by a single call; nothing is shared
//! between documents.

use crate::assembler::{Replacement, apply_replacements};
use crate::conventions::Conventions;
use crate::error::{ConvertError, StructuralError, snippet};
use crate::registry::SymbolRegistry;
use crate::resolver::ResolvedSymbols;
use oxc_allocator::{Allocator, Vec as ArenaVec};
use oxc_ast::ast::{Argument, Expression, NewExpression, StaticMemberExpression};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};

/// Result of rewriting one main script.
#[derive(Debug, Clone)]
pub struct RewrittenScript {
    /// Script text with namespaced callees replaced by bare names.
    pub code: String,
    /// Symbols resolved during the walk.
    pub symbols: ResolvedSymbols,
    /// `<namespace>.x` accesses that are not constructor calls and were left as is.
    pub residual_references: usize,
}

/// Rewrites the main script `code` of a document.
///
/// `first_line` is the document line on which `code` starts; it only feeds
/// error messages.
///
/// The rewrite of a constructor is unconditional: unresolved names are
/// rewritten too and only recorded in `symbols.unresolved`, leaving the keep
/// or discard decision to the caller.
pub fn rewrite_main_script(
    code: &str,
    first_line: usize,
    registry: &SymbolRegistry,
    conventions: &Conventions,
) -> Result<RewrittenScript, ConvertError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceType::mjs()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(StructuralError::ScriptSyntax {
            line: first_line,
            message,
        }
        .into());
    }

    let mut rewriter = NamespaceRewriter::new(code, first_line, registry, conventions);
    rewriter.visit_program(&ret.program);
    if let Some(err) = rewriter.error {
        return Err(err);
    }
    if rewriter.residual_references > 0 {
        tracing::warn!(
            count = rewriter.residual_references,
            namespace = %conventions.namespace,
            "namespace accesses outside constructor calls are left unchanged"
        );
    }

    Ok(RewrittenScript {
        code: apply_replacements(code, rewriter.replacements),
        symbols: rewriter.symbols,
        residual_references: rewriter.residual_references,
    })
}

/// Collects callee replacements for namespaced constructors, pre-order, and
/// records how each member name resolved.
///
/// A structural problem stops the walk; the first one found is kept in
/// `error`.
struct NamespaceRewriter<'r> {
    source: &'r str,
    first_line: usize,
    registry: &'r SymbolRegistry,
    namespace: &'r str,
    replacements: Vec<Replacement>,
    symbols: ResolvedSymbols,
    residual_references: usize,
    error: Option<ConvertError>,
}

impl<'r> NamespaceRewriter<'r> {
    fn new(
        source: &'r str,
        first_line: usize,
        registry: &'r SymbolRegistry,
        conventions: &'r Conventions,
    ) -> Self {
        Self {
            source,
            first_line,
            registry,
            namespace: &conventions.namespace,
            replacements: Vec::new(),
            symbols: ResolvedSymbols::default(),
            residual_references: 0,
            error: None,
        }
    }

    fn line_of(&self, span: Span) -> usize {
        let end = (span.start as usize).min(self.source.len());
        self.first_line + self.source[..end].matches('\n').count()
    }

    fn excerpt(&self, span: Span) -> String {
        let start = (span.start as usize).min(self.source.len());
        let end = (span.end as usize).clamp(start, self.source.len());
        snippet(&self.source[start..end])
    }

    /// Schedules `<namespace>.<Name>` callees to become `<Name>`.
    ///
    /// Returns whether the callee was rewritten. Bare identifier callees are
    /// standard constructors or exempt tool globals and stay as they are.
    fn rewrite_callee(&mut self, expr: &NewExpression<'_>) -> Result<bool, ConvertError> {
        let member = match &expr.callee {
            Expression::Identifier(ident) => {
                tracing::trace!(name = %ident.name, "constructor on bare identifier");
                return Ok(false);
            }
            Expression::StaticMemberExpression(member) => member,
            other => {
                return Err(StructuralError::UnexpectedCallee {
                    kind: expression_kind(other),
                    line: self.line_of(expr.span),
                    snippet: self.excerpt(expr.span),
                }
                .into());
            }
        };

        let Expression::Identifier(object) = &member.object else {
            return Err(StructuralError::UnexpectedMemberObject {
                kind: expression_kind(&member.object),
                line: self.line_of(expr.span),
                snippet: self.excerpt(expr.span),
            }
            .into());
        };
        if object.name != self.namespace {
            return Err(StructuralError::NamespaceMismatch {
                namespace: object.name.to_string(),
                line: self.line_of(expr.span),
                snippet: self.excerpt(expr.span),
            }
            .into());
        }

        let name = member.property.name.as_str();
        self.symbols.record(name, self.registry)?;
        self.replacements.push(Replacement {
            start: member.span.start as usize,
            end: member.span.end as usize,
            new_text: name.to_string(),
        });
        Ok(true)
    }
}

impl<'a> Visit<'a> for NamespaceRewriter<'_> {
    fn visit_new_expression(&mut self, expr: &NewExpression<'a>) {
        if self.error.is_some() {
            return;
        }
        match self.rewrite_callee(expr) {
            // The rewritten callee is not a residual access; only the arguments remain.
            Ok(true) => self.visit_arguments(&expr.arguments),
            Ok(false) => walk::walk_new_expression(self, expr),
            Err(err) => self.error = Some(err),
        }
    }

    fn visit_arguments(&mut self, arguments: &ArenaVec<'a, Argument<'a>>) {
        if self.error.is_some() {
            return;
        }
        walk::walk_arguments(self, arguments);
    }

    fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'a>) {
        if let Expression::Identifier(object) = &expr.object
            && object.name == self.namespace
        {
            self.residual_references += 1;
        }
        walk::walk_static_member_expression(self, expr);
    }
}

fn expression_kind(expr: &Expression<'_>) -> &'static str {
    match expr {
        Expression::Identifier(_) => "identifier",
        Expression::StaticMemberExpression(_) => "member expression",
        Expression::ComputedMemberExpression(_) => "computed member expression",
        Expression::PrivateFieldExpression(_) => "private field expression",
        Expression::CallExpression(_) => "call expression",
        Expression::ParenthesizedExpression(_) => "parenthesized expression",
        Expression::ThisExpression(_) => "this",
        Expression::FunctionExpression(_) => "function expression",
        Expression::ClassExpression(_) => "class expression",
        Expression::NewExpression(_) => "new expression",
        _ => "expression",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SymbolRegistry {
        SymbolRegistry::new(
            ["OrbitControls", "GLTFLoader", "Sky"],
            ["OrbitControls", "GLTFLoader"],
            Vec::<String>::new(),
        )
    }

    fn rewrite(code: &str) -> Result<RewrittenScript, ConvertError> {
        rewrite_main_script(code, 1, &registry(), &Conventions::default())
    }

    fn names(set: &std::collections::BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn drops_namespace_from_constructors() {
        let out = rewrite(
            "var scene = new THREE.Scene();\nvar controls = new THREE.OrbitControls(camera);",
        )
        .unwrap();
        assert!(out.code.contains("new Scene()"));
        assert!(out.code.contains("new OrbitControls(camera)"));
        assert!(!out.code.contains("THREE."));
        assert_eq!(names(&out.symbols.core), vec!["Scene"]);
        assert_eq!(names(&out.symbols.module_tools), vec!["OrbitControls"]);
        assert!(out.symbols.is_resolved());
    }

    #[test]
    fn rewrites_nested_constructors() {
        let out = rewrite(
            "function init() { scene.add(new THREE.Mesh(new THREE.BoxGeometry(1, 1, 1), new THREE.MeshBasicMaterial())); }",
        )
        .unwrap();
        assert!(out.code.contains("new Mesh(new BoxGeometry(1, 1, 1), new MeshBasicMaterial())"));
        assert_eq!(
            names(&out.symbols.core),
            vec!["BoxGeometry", "Mesh", "MeshBasicMaterial"]
        );
    }

    #[test]
    fn keeps_comments_and_formatting() {
        let code = "\n\t\t\t// renderer\n\t\t\tvar r = new THREE.WebGLRenderer( {\n\t\t\t\tantialias: true, // smooth\n\t\t\t\t// alpha: true\n\t\t\t} );\n\t\t\tr.render(); // draw\n\t\t\t/* new THREE.Fog() */\n\t\t";
        let out = rewrite(code).unwrap();
        assert_eq!(
            out.code,
            "\n\t\t\t// renderer\n\t\t\tvar r = new WebGLRenderer( {\n\t\t\t\tantialias: true, // smooth\n\t\t\t\t// alpha: true\n\t\t\t} );\n\t\t\tr.render(); // draw\n\t\t\t/* new THREE.Fog() */\n\t\t"
        );
        assert_eq!(names(&out.symbols.core), vec!["WebGLRenderer"]);
    }

    #[test]
    fn unresolved_tools_are_recorded_and_still_rewritten() {
        let out = rewrite("var sky = new THREE.Sky(); var s = new THREE.Scene();").unwrap();
        assert_eq!(names(&out.symbols.unresolved), vec!["Sky"]);
        assert!(out.code.contains("new Sky()"));
    }

    #[test]
    fn bare_identifier_constructors_are_untouched() {
        let out = rewrite("var d = new Date(); var s = new Stats();").unwrap();
        assert!(out.code.contains("new Date()"));
        assert!(out.code.contains("new Stats()"));
        assert!(out.symbols.core.is_empty());
    }

    #[test]
    fn other_namespace_is_structural() {
        let err = rewrite("var x = 1;\nvar l = new dat.GUI();").unwrap_err();
        match err {
            ConvertError::Structural(StructuralError::NamespaceMismatch {
                namespace,
                line,
                snippet,
            }) => {
                assert_eq!(namespace, "dat");
                assert_eq!(line, 2);
                assert_eq!(snippet, "new dat.GUI()");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn deep_member_callee_is_structural() {
        let err = rewrite("new THREE.Math.Foo();").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Structural(StructuralError::UnexpectedMemberObject { .. })
        ));
    }

    #[test]
    fn computed_callee_is_structural() {
        let err = rewrite("new THREE['Scene']();").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Structural(StructuralError::UnexpectedCallee {
                kind: "computed member expression",
                ..
            })
        ));
    }

    #[test]
    fn syntax_errors_are_structural() {
        let err = rewrite("var = ;").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Structural(StructuralError::ScriptSyntax { .. })
        ));
    }

    #[test]
    fn inconsistent_registry_escapes() {
        let registry = SymbolRegistry::new(
            Vec::<String>::new(),
            ["Scene"],
            Vec::<String>::new(),
        );
        let err = rewrite_main_script(
            "new THREE.Scene();",
            1,
            &registry,
            &Conventions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Registry(_)));
    }

    #[test]
    fn counts_residual_namespace_accesses() {
        let out = rewrite(
            "mesh.rotation.x = THREE.MathUtils.degToRad(45); material.side = THREE.DoubleSide;",
        )
        .unwrap();
        assert_eq!(out.residual_references, 2);
        assert!(out.code.contains("THREE.DoubleSide"));
    }

    #[test]
    fn output_is_deterministic() {
        let code = "var a = new THREE.Scene(); function f() { return new THREE.OrbitControls(a); }";
        let first = rewrite(code).unwrap().code;
        let second = rewrite(code).unwrap().code;
        assert_eq!(first, second);
    }
}
