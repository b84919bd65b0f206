//! Printing rewritten modules back to source

use swc_core::common::comments::{Comments, SingleThreadedComments};
use swc_core::common::sync::Lrc;
use swc_core::common::SourceMap;
use swc_core::ecma::ast::Module;
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config, Emitter};

use crate::error::{Result, ThemifyError};
use crate::parser::ParsedModule;

pub fn print_module(
    module: &Module,
    source_map: &Lrc<SourceMap>,
    comments: Option<&SingleThreadedComments>,
) -> Result<String> {
    let mut buffer = Vec::new();

    {
        let writer = JsWriter::new(source_map.clone(), "\n", &mut buffer, None);
        let mut emitter = Emitter {
            cfg: Config::default(),
            comments: comments.map(|c| c as &dyn Comments),
            cm: source_map.clone(),
            wr: writer,
        };

        emitter
            .emit_module(module)
            .map_err(|e| ThemifyError::codegen(format!("failed to emit module: {}", e)))?;
    }

    String::from_utf8(buffer)
        .map_err(|e| ThemifyError::codegen(format!("emitted code is not valid UTF-8: {}", e)))
}

/// Print a parsed module with its original comments.
pub fn print_parsed(parsed: &ParsedModule) -> Result<String> {
    print_module(&parsed.module, &parsed.source_map, Some(&parsed.comments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;

    #[test]
    fn test_print_round_trip_is_stable() {
        let source = "import { a } from \"./a\";\nconst b = <div css={{ color: a }}/>;\n";
        let parsed = parse_module(source, "App.tsx").unwrap();
        let first = print_parsed(&parsed).unwrap();

        let reparsed = parse_module(&first, "App.tsx").unwrap();
        let second = print_parsed(&reparsed).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_print_keeps_comments() {
        let source = "// header comment\nconst a = 1;\n";
        let parsed = parse_module(source, "a.ts").unwrap();
        let printed = print_parsed(&parsed).unwrap();
        assert!(printed.contains("// header comment"));
    }
}
