pub mod directive;
pub mod enum_info;

pub use enum_info::{BaseKind, BaseType, EnumInfo, EnumValue};

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Extracts annotated enum declarations from Go source files.
pub struct GoParser {
    strict: bool,
}

impl GoParser {
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Enables member-name validation (non-empty, unique, valid identifiers).
    /// The default is permissive.
    pub fn with_strict(strict: bool) -> Self {
        Self { strict }
    }

    /// Parses the given files, in order, and returns every enum model found.
    ///
    /// Files without a `.go` extension are skipped, as are generated
    /// `_enum.go` companion files. Any error aborts the whole run.
    pub fn parse_enums(&self, files: &[PathBuf]) -> Result<Vec<EnumInfo>> {
        let mut enums = Vec::new();

        for file in files {
            let file_name = file.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !file_name.ends_with(".go") || file_name.ends_with("_enum.go") {
                continue;
            }

            let content = std::fs::read_to_string(file).map_err(|e| Error::Parse {
                file: file.clone(),
                message: e.to_string(),
            })?;

            for decl in parse_declarations(file, &content)? {
                for comment in &decl.doc {
                    if let Some(payload) = directive_payload(comment) {
                        enums.push(self.extract(file, &decl, &payload)?);
                    }
                }
            }
        }

        Ok(enums)
    }

    fn extract(&self, file: &Path, decl: &TypeDecl, payload: &str) -> Result<EnumInfo> {
        if decl.specs.len() != 1 {
            return Err(Error::MalformedDeclaration {
                file: file.to_path_buf(),
                detail: format!(
                    "enum directive on a declaration group with {} type specs",
                    decl.specs.len()
                ),
            });
        }

        let spec = &decl.specs[0];
        let ident = plain_identifier(&spec.underlying).ok_or_else(|| Error::UnsupportedBaseType {
            type_name: spec.name.clone(),
            base: spec.underlying.clone(),
        })?;
        let base_type = BaseType::resolve(&spec.name, ident)?;

        let values = directive::parse_payload(&spec.name, &base_type, payload, self.strict)?;
        if values.is_empty() {
            return Err(Error::MalformedDeclaration {
                file: file.to_path_buf(),
                detail: format!("enum directive for `{}` has no members", spec.name),
            });
        }

        Ok(EnumInfo {
            type_name: spec.name.clone(),
            base_type,
            values,
        })
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads the `package` clause of a Go file. Used to infer the default
/// package name from the first input file.
pub fn package_clause(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Parse {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut lexer = LineLexer::default();
    for line in content.lines() {
        let scanned = lexer.scan_line(path, line)?;
        let code = scanned.code.trim();
        if code.is_empty() {
            continue;
        }
        return match code.strip_prefix("package") {
            Some(rest) if rest.starts_with(char::is_whitespace) && !rest.trim().is_empty() => {
                Ok(rest.trim().to_string())
            }
            _ => Err(Error::Parse {
                file: path.to_path_buf(),
                message: "missing package clause".to_string(),
            }),
        };
    }

    Err(Error::Parse {
        file: path.to_path_buf(),
        message: "missing package clause".to_string(),
    })
}

/// Checks a doc-comment line for the enum directive and returns its payload.
/// Detection normalizes the line (lower-case, whitespace removed); the
/// payload is everything after the first `:` of the original line.
fn directive_payload(comment: &str) -> Option<String> {
    let normalized: String = comment
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if !normalized.starts_with("//enum:") {
        return None;
    }
    comment
        .split_once(':')
        .map(|(_, payload)| payload.trim().to_string())
}

/// One `Name underlying` entry of a type declaration.
#[derive(Debug)]
struct TypeSpec {
    name: String,
    /// Raw source text after the name, e.g. `string`, `struct {`, `[]byte`
    underlying: String,
}

/// A top-level `type` declaration together with its leading comment block.
#[derive(Debug)]
struct TypeDecl {
    doc: Vec<String>,
    specs: Vec<TypeSpec>,
}

/// Accepts `ident` and the alias form `= ident`; anything else (composite
/// types, qualified names) is not a plain identifier.
fn plain_identifier(underlying: &str) -> Option<&str> {
    let u = underlying.trim();
    let u = u.strip_prefix('=').map(str::trim).unwrap_or(u);
    let mut chars = u.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some(u)
    } else {
        None
    }
}

/// Per-line lexer state: block comments and raw strings carry across lines.
#[derive(Default)]
struct LineLexer {
    in_block_comment: bool,
    in_raw_string: bool,
}

struct ScannedLine {
    /// Line text with comments and string/rune contents blanked out
    code: String,
    /// Trailing or full-line `//` comment, including the slashes
    comment: Option<String>,
}

impl LineLexer {
    fn scan_line(&mut self, file: &Path, line: &str) -> Result<ScannedLine> {
        let chars: Vec<(usize, char)> = line.char_indices().collect();
        let mut code = String::new();
        let mut comment = None;
        let mut i = 0;

        while i < chars.len() {
            let (offset, c) = chars[i];

            if self.in_block_comment {
                if c == '*' && matches!(chars.get(i + 1), Some((_, '/'))) {
                    self.in_block_comment = false;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }

            if self.in_raw_string {
                if c == '`' {
                    self.in_raw_string = false;
                }
                i += 1;
                continue;
            }

            match c {
                '/' if matches!(chars.get(i + 1), Some((_, '/'))) => {
                    comment = Some(line[offset..].trim().to_string());
                    break;
                }
                '/' if matches!(chars.get(i + 1), Some((_, '*'))) => {
                    self.in_block_comment = true;
                    i += 2;
                }
                '`' => {
                    self.in_raw_string = true;
                    code.push(' ');
                    i += 1;
                }
                '"' | '\'' => {
                    i = self.consume_literal(file, line, &chars, i, c)?;
                    code.push(' ');
                }
                _ => {
                    code.push(c);
                    i += 1;
                }
            }
        }

        Ok(ScannedLine { code, comment })
    }

    /// Consumes an interpreted string or rune literal starting at `start`,
    /// returning the index just past the closing quote.
    fn consume_literal(
        &self,
        file: &Path,
        line: &str,
        chars: &[(usize, char)],
        start: usize,
        quote: char,
    ) -> Result<usize> {
        let mut i = start + 1;
        while i < chars.len() {
            match chars[i].1 {
                '\\' => i += 2,
                c if c == quote => return Ok(i + 1),
                _ => i += 1,
            }
        }
        Err(Error::Parse {
            file: file.to_path_buf(),
            message: format!("unterminated {} literal: {}", literal_kind(quote), line.trim()),
        })
    }
}

fn literal_kind(quote: char) -> &'static str {
    if quote == '"' {
        "string"
    } else {
        "rune"
    }
}

/// Scans Go source into top-level type declarations with attached doc
/// comment blocks. This is a declaration-level pass, not a full Go parser:
/// it tracks comments, string literals, and brace depth, and reports
/// structural problems (unterminated comments/strings/groups, unbalanced
/// braces, a `type` keyword without a name) as `ParseError`.
fn parse_declarations(file: &Path, content: &str) -> Result<Vec<TypeDecl>> {
    let mut lexer = LineLexer::default();
    let mut decls = Vec::new();
    let mut doc: Vec<String> = Vec::new();
    let mut depth: i64 = 0;

    // Open `type ( ... )` group, if any: accumulated specs plus the brace
    // depth of a multi-line spec inside the group.
    let mut group: Option<(Vec<String>, Vec<TypeSpec>, i64)> = None;

    for line in content.lines() {
        let scanned = lexer.scan_line(file, line)?;
        let code = scanned.code.trim().to_string();

        if let Some((doc_block, mut specs, mut spec_depth)) = group.take() {
            match group_step(&code, &mut specs, &mut spec_depth) {
                GroupStep::Open => group = Some((doc_block, specs, spec_depth)),
                GroupStep::Closed => decls.push(TypeDecl {
                    doc: doc_block,
                    specs,
                }),
            }
            continue;
        }

        if code.is_empty() {
            if let Some(comment) = scanned.comment {
                doc.push(comment);
            } else if line.trim().is_empty() {
                // A blank line breaks doc attachment.
                doc.clear();
            }
            continue;
        }

        if depth == 0 && (code == "type" || code.starts_with("type ") || code.starts_with("type(")) {
            let rest = code["type".len()..].trim();
            if let Some(inline) = rest.strip_prefix('(') {
                let mut specs = Vec::new();
                let mut spec_depth = 0i64;
                match group_step(inline.trim(), &mut specs, &mut spec_depth) {
                    GroupStep::Open => group = Some((std::mem::take(&mut doc), specs, spec_depth)),
                    GroupStep::Closed => decls.push(TypeDecl {
                        doc: std::mem::take(&mut doc),
                        specs,
                    }),
                }
                continue;
            }
            let spec = split_spec(rest).ok_or_else(|| Error::Parse {
                file: file.to_path_buf(),
                message: format!("type declaration without a name: {}", line.trim()),
            })?;
            decls.push(TypeDecl {
                doc: std::mem::take(&mut doc),
                specs: vec![spec],
            });
        } else {
            doc.clear();
        }

        depth += brace_delta(&code);
        if depth < 0 {
            return Err(Error::Parse {
                file: file.to_path_buf(),
                message: format!("unbalanced braces near: {}", line.trim()),
            });
        }
    }

    if lexer.in_block_comment {
        return Err(Error::Parse {
            file: file.to_path_buf(),
            message: "unterminated block comment".to_string(),
        });
    }
    if lexer.in_raw_string {
        return Err(Error::Parse {
            file: file.to_path_buf(),
            message: "unterminated raw string literal".to_string(),
        });
    }
    if group.is_some() {
        return Err(Error::Parse {
            file: file.to_path_buf(),
            message: "unterminated type declaration group".to_string(),
        });
    }
    if depth != 0 {
        return Err(Error::Parse {
            file: file.to_path_buf(),
            message: "unbalanced braces at end of file".to_string(),
        });
    }

    Ok(decls)
}

enum GroupStep {
    Open,
    Closed,
}

/// Processes one line of a `type ( ... )` group body.
fn group_step(code: &str, specs: &mut Vec<TypeSpec>, spec_depth: &mut i64) -> GroupStep {
    if *spec_depth > 0 {
        // Continuation of a multi-line spec (e.g. a struct body).
        *spec_depth += brace_delta(code);
        return GroupStep::Open;
    }

    // The group closes at the first `)` outside any braces.
    let mut depth = 0i64;
    for (i, c) in code.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            ')' if depth == 0 => {
                let before = code[..i].trim();
                if let Some(spec) = split_spec(before) {
                    specs.push(spec);
                }
                return GroupStep::Closed;
            }
            _ => {}
        }
    }

    if let Some(spec) = split_spec(code.trim()) {
        specs.push(spec);
    }
    *spec_depth += brace_delta(code);
    GroupStep::Open
}

/// Splits a spec line into the type name and the underlying-type text.
fn split_spec(text: &str) -> Option<TypeSpec> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.split_once(char::is_whitespace) {
        Some((name, underlying)) => Some(TypeSpec {
            name: name.to_string(),
            underlying: underlying.trim().to_string(),
        }),
        None => Some(TypeSpec {
            name: text.to_string(),
            underlying: String::new(),
        }),
    }
}

fn brace_delta(code: &str) -> i64 {
    let mut delta = 0;
    for c in code.chars() {
        match c {
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}
