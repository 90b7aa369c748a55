use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Hard cap on symbol nesting. Validation and symbol counting both stop
/// descending past this depth.
pub const MAX_SYMBOL_DEPTH: usize = 32;

/// Languages with a registered parser front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Python,
    TypeScript,
    JavaScript,
    Css,
    Html,
    Yaml,
    Markdown,
    Dockerfile,
    Bash,
}

impl Language {
    /// Returns the canonical language tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Css => "css",
            Language::Html => "html",
            Language::Yaml => "yaml",
            Language::Markdown => "markdown",
            Language::Dockerfile => "dockerfile",
            Language::Bash => "bash",
        }
    }

    /// Parses a language tag. Unknown tags return `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "go" => Some(Language::Go),
            "python" => Some(Language::Python),
            "typescript" | "tsx" => Some(Language::TypeScript),
            "javascript" | "jsx" => Some(Language::JavaScript),
            "css" => Some(Language::Css),
            "html" => Some(Language::Html),
            "yaml" => Some(Language::Yaml),
            "markdown" => Some(Language::Markdown),
            "dockerfile" => Some(Language::Dockerfile),
            "bash" | "sh" | "shell" => Some(Language::Bash),
            _ => None,
        }
    }

    /// Maps a file extension to a language tag.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "go" => Some(Language::Go),
            "py" | "pyi" => Some(Language::Python),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "css" => Some(Language::Css),
            "html" | "htm" => Some(Language::Html),
            "yaml" | "yml" => Some(Language::Yaml),
            "md" | "markdown" => Some(Language::Markdown),
            "dockerfile" => Some(Language::Dockerfile),
            "sh" | "bash" => Some(Language::Bash),
            _ => None,
        }
    }

    /// Detects the language for a path, including extensionless `Dockerfile`.
    pub fn from_path(path: &Path) -> Option<Self> {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name == "Dockerfile" || name == "dockerfile" || name == "Containerfile" {
                return Some(Language::Dockerfile);
            }
        }
        Language::from_extension(path.extension()?.to_str()?)
    }

    /// The canonical extension used when writing scratch files for linting.
    pub fn canonical_extension(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Python => "py",
            Language::TypeScript => "ts",
            Language::JavaScript => "js",
            Language::Css => "css",
            Language::Html => "html",
            Language::Yaml => "yaml",
            Language::Markdown => "md",
            Language::Dockerfile => "dockerfile",
            Language::Bash => "sh",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of symbol kinds a parser may emit.
///
/// Unknown strings parse to [`SymbolKind::Unknown`]; `as_str` and `parse`
/// round-trip on every other variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolKind {
    Package,
    File,
    Module,
    Import,
    Function,
    Method,
    Class,
    Interface,
    Struct,
    Type,
    Enum,
    EnumMember,
    Field,
    Property,
    Variable,
    Constant,
    Decorator,
    Parameter,
    Heading,
    CodeBlock,
    List,
    Link,
    CssClass,
    CssId,
    CssVariable,
    Animation,
    MediaQuery,
    Element,
    Component,
    Form,
    Key,
    Anchor,
    Document,
    Stage,
    Arg,
    EnvVar,
    Label,
    Port,
    Volume,
    Instruction,
    Alias,
    Unknown,
}

impl SymbolKind {
    /// Returns the kebab-case string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Package => "package",
            SymbolKind::File => "file",
            SymbolKind::Module => "module",
            SymbolKind::Import => "import",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Struct => "struct",
            SymbolKind::Type => "type",
            SymbolKind::Enum => "enum",
            SymbolKind::EnumMember => "enum-member",
            SymbolKind::Field => "field",
            SymbolKind::Property => "property",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Decorator => "decorator",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Heading => "heading",
            SymbolKind::CodeBlock => "code-block",
            SymbolKind::List => "list",
            SymbolKind::Link => "link",
            SymbolKind::CssClass => "css-class",
            SymbolKind::CssId => "css-id",
            SymbolKind::CssVariable => "css-variable",
            SymbolKind::Animation => "animation",
            SymbolKind::MediaQuery => "media-query",
            SymbolKind::Element => "element",
            SymbolKind::Component => "component",
            SymbolKind::Form => "form",
            SymbolKind::Key => "key",
            SymbolKind::Anchor => "anchor",
            SymbolKind::Document => "document",
            SymbolKind::Stage => "stage",
            SymbolKind::Arg => "arg",
            SymbolKind::EnvVar => "env-var",
            SymbolKind::Label => "label",
            SymbolKind::Port => "port",
            SymbolKind::Volume => "volume",
            SymbolKind::Instruction => "instruction",
            SymbolKind::Alias => "alias",
            SymbolKind::Unknown => "unknown",
        }
    }

    /// Parses a kind string; anything outside the closed set maps to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "package" => SymbolKind::Package,
            "file" => SymbolKind::File,
            "module" => SymbolKind::Module,
            "import" => SymbolKind::Import,
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "class" => SymbolKind::Class,
            "interface" => SymbolKind::Interface,
            "struct" => SymbolKind::Struct,
            "type" => SymbolKind::Type,
            "enum" => SymbolKind::Enum,
            "enum-member" => SymbolKind::EnumMember,
            "field" => SymbolKind::Field,
            "property" => SymbolKind::Property,
            "variable" => SymbolKind::Variable,
            "constant" => SymbolKind::Constant,
            "decorator" => SymbolKind::Decorator,
            "parameter" => SymbolKind::Parameter,
            "heading" => SymbolKind::Heading,
            "code-block" => SymbolKind::CodeBlock,
            "list" => SymbolKind::List,
            "link" => SymbolKind::Link,
            "css-class" => SymbolKind::CssClass,
            "css-id" => SymbolKind::CssId,
            "css-variable" => SymbolKind::CssVariable,
            "animation" => SymbolKind::Animation,
            "media-query" => SymbolKind::MediaQuery,
            "element" => SymbolKind::Element,
            "component" => SymbolKind::Component,
            "form" => SymbolKind::Form,
            "key" => SymbolKind::Key,
            "anchor" => SymbolKind::Anchor,
            "document" => SymbolKind::Document,
            "stage" => SymbolKind::Stage,
            "arg" => SymbolKind::Arg,
            "env-var" => SymbolKind::EnvVar,
            "label" => SymbolKind::Label,
            "port" => SymbolKind::Port,
            "volume" => SymbolKind::Volume,
            "instruction" => SymbolKind::Instruction,
            "alias" => SymbolKind::Alias,
            _ => SymbolKind::Unknown,
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source range. Lines are 1-indexed, columns 0-indexed.
///
/// Field order matters: the derived `Ord` gives the total order used for
/// deterministic edge sorting.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Location {
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub start_col: u32,
    pub end_col: u32,
}

impl Location {
    pub fn new(file_path: &str, start_line: u32, end_line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            file_path: file_path.to_string(),
            start_line,
            end_line,
            start_col,
            end_col,
        }
    }
}

/// Normalized method signature used for structural conformance checks
/// (Go interface satisfaction, Python Protocol/ABC).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub params: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub returns: String,
    pub param_count: u32,
    pub return_count: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub receiver_type: String,
}

/// A single observed call from one symbol's body, not yet resolved to a
/// target id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Bare callee name (e.g. "Println", "helper").
    pub target: String,
    /// Receiver expression for method calls; empty for plain calls.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub receiver: String,
    pub is_method: bool,
    pub location: Location,
}

/// An import statement extracted from source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// The module specifier / import path as written, quotes stripped.
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    /// Individual names brought into scope.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_namespace: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_wildcard: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_relative: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_type_only: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_common_js: bool,
    /// `<script type="module">` external reference.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_module: bool,
    /// `<script src>` external reference.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_script: bool,
    /// `@import`/`<link rel=stylesheet>` reference.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_stylesheet: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media_query: String,
    pub location: Location,
}

/// Language-specific symbol detail. A closed bag of optional fields rather
/// than a subclass hierarchy; each parser populates its own subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_generator: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_modifier: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extends: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub return_type: String,
    /// Method set for structural matching (interfaces, Protocols, receiver
    /// types).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodSignature>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub css_selector: String,
}

impl Metadata {
    /// True when no field deviates from its default.
    pub fn is_empty(&self) -> bool {
        *self == Metadata::default()
    }
}

/// A named, located construct extracted from source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Deterministic identifier `{file_path}:{start_line}:{name}`.
    pub id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub start_col: u32,
    pub end_col: u32,
    pub language: Language,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc_comment: String,
    pub exported: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub package: String,
    /// Bare receiver type name for methods, without pointer or variable.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub receiver: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Owned sub-symbols in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Symbol>,
    /// Call sites observed in this symbol's body, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<CallSite>,
}

/// Builds the deterministic symbol id.
pub fn symbol_id(file_path: &str, start_line: u32, name: &str) -> String {
    format!("{file_path}:{start_line}:{name}")
}

impl Symbol {
    /// Creates a symbol with the deterministic id and empty optional fields.
    pub fn new(
        name: &str,
        kind: SymbolKind,
        file_path: &str,
        language: Language,
        start_line: u32,
        end_line: u32,
        start_col: u32,
        end_col: u32,
    ) -> Self {
        Symbol {
            id: symbol_id(file_path, start_line, name),
            name: name.to_string(),
            kind,
            file_path: file_path.to_string(),
            start_line,
            end_line,
            start_col,
            end_col,
            language,
            signature: String::new(),
            doc_comment: String::new(),
            exported: false,
            package: String::new(),
            receiver: String::new(),
            metadata: None,
            children: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// The symbol's own source range as a [`Location`].
    pub fn location(&self) -> Location {
        Location {
            file_path: self.file_path.clone(),
            start_line: self.start_line,
            end_line: self.end_line,
            start_col: self.start_col,
            end_col: self.end_col,
        }
    }

    /// Mutable access to the metadata bag, creating it on first use.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        self.metadata.get_or_insert_with(Metadata::default)
    }

    /// Validates this symbol and its children recursively.
    pub fn validate(&self) -> Result<(), ParseError> {
        self.validate_at_depth(0)
    }

    fn validate_at_depth(&self, depth: usize) -> Result<(), ParseError> {
        if depth >= MAX_SYMBOL_DEPTH {
            return Err(ParseError::validation(
                "children",
                format!("symbol nesting exceeds depth {MAX_SYMBOL_DEPTH}"),
            ));
        }
        if self.name.is_empty() {
            return Err(ParseError::validation("name", "empty symbol name"));
        }
        if self.file_path.is_empty() {
            return Err(ParseError::validation("file_path", "empty file path"));
        }
        if self.file_path.contains("..") {
            return Err(ParseError::validation(
                "file_path",
                format!("parent traversal in {}", self.file_path),
            ));
        }
        if self.start_line < 1 {
            return Err(ParseError::validation(
                "start_line",
                format!("{} for {}", self.start_line, self.name),
            ));
        }
        if self.end_line < self.start_line {
            return Err(ParseError::validation(
                "end_line",
                format!("{} < start_line {} for {}", self.end_line, self.start_line, self.name),
            ));
        }
        if self.id != symbol_id(&self.file_path, self.start_line, &self.name) {
            return Err(ParseError::validation(
                "id",
                format!("non-canonical id {}", self.id),
            ));
        }
        for call in &self.calls {
            if call.target.is_empty() {
                return Err(ParseError::validation("calls.target", "empty call target"));
            }
            if call.location.start_line < 1 {
                return Err(ParseError::validation(
                    "calls.location",
                    format!("line {} in {}", call.location.start_line, self.name),
                ));
            }
        }
        for child in &self.children {
            if child.start_line < self.start_line || child.end_line > self.end_line {
                return Err(ParseError::validation(
                    "children",
                    format!(
                        "{} range {}..{} escapes parent {} range {}..{}",
                        child.name,
                        child.start_line,
                        child.end_line,
                        self.name,
                        self.start_line,
                        self.end_line
                    ),
                ));
            }
            child.validate_at_depth(depth + 1)?;
        }
        Ok(())
    }

    /// Count of this symbol plus all descendants, bounded by the depth cap.
    pub fn deep_count(&self) -> usize {
        fn count(sym: &Symbol, depth: usize) -> usize {
            if depth >= MAX_SYMBOL_DEPTH {
                return 1;
            }
            1 + sym.children.iter().map(|c| count(c, depth + 1)).sum::<usize>()
        }
        count(self, 0)
    }
}

/// Per-file, immutable record of extraction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub file_path: String,
    pub language: Language,
    /// SHA-256 of the input bytes, lowercase hex.
    pub content_hash: String,
    /// Unix milliseconds at which parsing completed.
    pub parsed_at_milli: u64,
    /// Top-level symbols only; nested symbols live in `children`.
    pub symbols: Vec<Symbol>,
    pub imports: Vec<Import>,
    /// Non-fatal syntax/validation messages accumulated during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ParseResult {
    /// Validates every invariant of a finished parse result.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.file_path.is_empty() {
            return Err(ParseError::validation("file_path", "empty file path"));
        }
        if self.file_path.contains("..") {
            return Err(ParseError::validation(
                "file_path",
                format!("parent traversal in {}", self.file_path),
            ));
        }
        if self.content_hash.len() != 64
            || !self.content_hash.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(ParseError::validation(
                "content_hash",
                format!("expected 64 hex chars, got {:?}", self.content_hash),
            ));
        }
        if self.parsed_at_milli == 0 {
            return Err(ParseError::validation("parsed_at_milli", "zero timestamp"));
        }
        for symbol in &self.symbols {
            symbol.validate()?;
        }
        Ok(())
    }

    /// Total symbol count including children, bounded by the depth cap.
    pub fn symbol_count(&self) -> usize {
        self.symbols.iter().map(Symbol::deep_count).sum()
    }
}
