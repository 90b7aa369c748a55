//! TypeScript front-end (`.ts`, `.tsx`, `.mts`, `.cts`).
//!
//! Extraction lives in [`crate::ecma`]; this wrapper picks the TS or TSX
//! grammar by extension and runs the shared walker.

use tokio_util::sync::CancellationToken;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{Language, ParseResult};

use crate::ecma::EcmaWalker;
use crate::parser::{check_input, finish, Parser};
use crate::treesitter::{collect_syntax_errors, parse_source};

pub struct TypeScriptParser {
    limits: ParserLimits,
}

impl TypeScriptParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }
}

impl Parser for TypeScriptParser {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "mts", "cts"]
    }

    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError> {
        let input = check_input(ctx, content, file_path, &self.limits)?;
        let grammar = if file_path.ends_with(".tsx") {
            tree_sitter_typescript::LANGUAGE_TSX
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT
        };
        let tree = parse_source(&grammar.into(), input.source)?;
        let bytes = input.source.as_bytes();

        let mut errors = collect_syntax_errors(tree.root_node(), bytes);
        let walker = EcmaWalker::new(ctx, bytes, file_path, Language::TypeScript, &self.limits);
        let extraction = walker.extract(tree.root_node())?;
        errors.extend(extraction.errors);

        finish(
            ctx,
            file_path,
            Language::TypeScript,
            input.hash,
            extraction.symbols,
            extraction.imports,
            errors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::types::{Symbol, SymbolKind};

    fn parse(source: &str) -> ParseResult {
        let parser = TypeScriptParser::new(ParserLimits::default());
        parser
            .parse(&CancellationToken::new(), source.as_bytes(), "app.ts")
            .unwrap()
    }

    fn find<'a>(result: &'a ParseResult, name: &str) -> &'a Symbol {
        result
            .symbols
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("missing symbol {name}"))
    }

    #[test]
    fn test_import_forms() {
        let result = parse(
            "import def from \"./a\";\nimport * as ns from \"./b\";\nimport { x, y } from \"./c\";\nimport type { T } from \"./d\";\n",
        );
        assert_eq!(result.imports.len(), 4);
        assert!(result.imports[0].is_default);
        assert_eq!(result.imports[0].names, vec!["def".to_string()]);
        assert!(result.imports[1].is_namespace);
        assert_eq!(result.imports[1].alias, "ns");
        assert_eq!(result.imports[2].names, vec!["x".to_string(), "y".to_string()]);
        assert!(result.imports[3].is_type_only);
        assert!(result.imports.iter().all(|i| i.is_relative));
    }

    #[test]
    fn test_common_js_require() {
        let result = parse("const fs = require(\"fs\");\n");
        assert_eq!(result.imports.len(), 1);
        assert!(result.imports[0].is_common_js);
        assert_eq!(result.imports[0].path, "fs");
        assert_eq!(result.imports[0].names, vec!["fs".to_string()]);
    }

    #[test]
    fn test_exported_async_function() {
        let result = parse("export async function load(id: string): Promise<void> {}\n");
        let load = find(&result, "load");
        assert_eq!(load.kind, SymbolKind::Function);
        assert!(load.exported);
        let meta = load.metadata.as_ref().unwrap();
        assert!(meta.is_async);
        assert_eq!(meta.return_type, "Promise<void>");
    }

    #[test]
    fn test_arrow_function_classified_as_function() {
        let result = parse("export const handler = async (req: Request) => req;\nconst LIMIT = 10;\nlet counter = 0;\n");
        let handler = find(&result, "handler");
        assert_eq!(handler.kind, SymbolKind::Function);
        assert!(handler.exported);
        assert!(handler.metadata.as_ref().unwrap().is_async);
        assert_eq!(find(&result, "LIMIT").kind, SymbolKind::Constant);
        assert_eq!(find(&result, "counter").kind, SymbolKind::Variable);
    }

    #[test]
    fn test_decorated_class_with_private_field() {
        let result = parse(
            "@Injectable()\nexport class S { #cache = new Map(); async get(id: string): Promise<any> { return null; } }\n",
        );
        let class = find(&result, "S");
        assert_eq!(class.kind, SymbolKind::Class);
        assert!(class.exported);
        assert_eq!(
            class.metadata.as_ref().unwrap().decorators,
            vec!["Injectable".to_string()]
        );

        let cache = class.children.iter().find(|c| c.name == "#cache").unwrap();
        assert_eq!(cache.kind, SymbolKind::Field);
        assert!(!cache.exported);
        assert_eq!(cache.metadata.as_ref().unwrap().access_modifier, "private");

        let get = class.children.iter().find(|c| c.name == "get").unwrap();
        assert_eq!(get.kind, SymbolKind::Method);
        assert!(get.metadata.as_ref().unwrap().is_async);
    }

    #[test]
    fn test_class_heritage() {
        let result = parse(
            "interface Reader { read(): string; }\nexport class File extends Base implements Reader { read(): string { return \"\"; } }\n",
        );
        let file = find(&result, "File");
        let meta = file.metadata.as_ref().unwrap();
        assert_eq!(meta.extends, "Base");
        assert_eq!(meta.implements, vec!["Reader".to_string()]);
    }

    #[test]
    fn test_interface_members() {
        let result = parse(
            "export interface Store {\n  size: number;\n  get(key: string): string;\n  put(key: string, value: string): void;\n}\n",
        );
        let store = find(&result, "Store");
        assert_eq!(store.kind, SymbolKind::Interface);
        let methods = &store.metadata.as_ref().unwrap().methods;
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].name, "get");
        assert_eq!(methods[0].param_count, 1);
        assert_eq!(methods[1].param_count, 2);
        assert!(store.children.iter().any(|c| c.kind == SymbolKind::Property));
    }

    #[test]
    fn test_enum_members() {
        let result = parse("export enum Color { Red, Green = 2 }\n");
        let color = find(&result, "Color");
        assert_eq!(color.kind, SymbolKind::Enum);
        let names: Vec<_> = color.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Red", "Green"]);
        assert!(color.children.iter().all(|c| c.kind == SymbolKind::EnumMember));
    }

    #[test]
    fn test_type_alias_and_generics() {
        let result = parse("export type Handler<T> = (event: T) => void;\n");
        let handler = find(&result, "Handler");
        assert_eq!(handler.kind, SymbolKind::Type);
        assert_eq!(
            handler.metadata.as_ref().unwrap().type_parameters,
            vec!["T".to_string()]
        );
    }

    #[test]
    fn test_re_export() {
        let result = parse("export { a, b } from \"./mod\";\n");
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(result.imports[0].path, "./mod");
    }

    #[test]
    fn test_jsdoc_becomes_doc_comment() {
        let result = parse("/** Loads a user. */\nexport function load() {}\n");
        assert_eq!(find(&result, "load").doc_comment, "/** Loads a user. */");
    }

    #[test]
    fn test_abstract_class() {
        let result = parse("export abstract class Base { abstract run(): void; }\n");
        assert!(find(&result, "Base").metadata.as_ref().unwrap().is_abstract);
    }

    #[test]
    fn test_tsx_component() {
        let parser = TypeScriptParser::new(ParserLimits::default());
        let result = parser
            .parse(
                &CancellationToken::new(),
                b"export function App() { return <div>hello</div>; }\n",
                "app.tsx",
            )
            .unwrap();
        assert!(result.symbols.iter().any(|s| s.name == "App"));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_method_calls_extracted() {
        let result = parse(
            "function helper() {}\nexport function main() { helper(); console.log(1); }\n",
        );
        let main_fn = find(&result, "main");
        assert_eq!(main_fn.calls.len(), 2);
        assert_eq!(main_fn.calls[0].target, "helper");
        assert_eq!(main_fn.calls[1].target, "log");
        assert_eq!(main_fn.calls[1].receiver, "console");
        assert!(main_fn.calls[1].is_method);
    }
}
