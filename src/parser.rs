//! Source parsing on top of swc
//!
//! Picks the swc syntax from the file extension and keeps the source map and
//! comments around so the printer can reproduce them.

use std::path::Path;

use swc_core::common::comments::SingleThreadedComments;
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, SourceMap, Spanned};
use swc_core::ecma::ast::{EsVersion, Expr, Module};
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::error::{Result, ThemifyError};

/// Source dialect of a file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSyntax {
    TypeScript,
    Tsx,
    JavaScript,
}

impl SourceSyntax {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("ts") | Some("mts") | Some("cts") => Self::TypeScript,
            Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => Self::JavaScript,
            _ => Self::Tsx,
        }
    }

    /// Whether the injected `theme` parameter may carry a `: Theme` annotation.
    pub fn supports_type_annotations(self) -> bool {
        !matches!(self, Self::JavaScript)
    }

    fn swc_syntax(self) -> Syntax {
        match self {
            Self::TypeScript => Syntax::Typescript(TsSyntax {
                tsx: false,
                ..Default::default()
            }),
            Self::Tsx => Syntax::Typescript(TsSyntax {
                tsx: true,
                ..Default::default()
            }),
            Self::JavaScript => Syntax::Es(EsSyntax {
                jsx: true,
                ..Default::default()
            }),
        }
    }
}

/// A parsed module together with everything needed to print it back.
pub struct ParsedModule {
    pub module: Module,
    pub source_map: Lrc<SourceMap>,
    pub comments: SingleThreadedComments,
    pub syntax: SourceSyntax,
}

impl std::fmt::Debug for ParsedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedModule")
            .field("module", &self.module)
            .field("syntax", &self.syntax)
            .finish_non_exhaustive()
    }
}

pub fn parse_module(source: &str, filename: &str) -> Result<ParsedModule> {
    let syntax = SourceSyntax::from_path(filename);
    let source_map: Lrc<SourceMap> = Default::default();
    let comments = SingleThreadedComments::default();

    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        source.to_string(),
    );

    let module = {
        let lexer = Lexer::new(
            syntax.swc_syntax(),
            EsVersion::latest(),
            StringInput::from(&*source_file),
            Some(&comments),
        );
        let mut parser = Parser::new_from(lexer);

        let module = parser.parse_module().map_err(|err| {
            let line = source_map.lookup_char_pos(err.span().lo).line;
            ThemifyError::parse(filename, line, err.kind().msg())
        })?;

        // Recovered errors still mean the tree is not what the author wrote.
        if let Some(err) = parser.take_errors().into_iter().next() {
            let line = source_map.lookup_char_pos(err.span().lo).line;
            return Err(ThemifyError::parse(filename, line, err.kind().msg()));
        }

        module
    };

    log::trace!("Parsed {} ({:?}, {} items)", filename, syntax, module.body.len());

    Ok(ParsedModule {
        module,
        source_map,
        comments,
        syntax,
    })
}

/// Parse a single TSX expression. Used by tests and diagnostics.
pub fn parse_expression(source: &str) -> Result<Expr> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom("<expression>".to_string())),
        source.to_string(),
    );

    let lexer = Lexer::new(
        SourceSyntax::Tsx.swc_syntax(),
        EsVersion::latest(),
        StringInput::from(&*source_file),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    parser
        .parse_expr()
        .map(|expr| *expr)
        .map_err(|err| ThemifyError::parse("<expression>", 1, err.kind().msg()))
}
