use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use minijinja::{context, Environment};
use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::parser::EnumInfo;

const ENUM_TEMPLATE: &str = include_str!("../templates/enum.go.j2");

/// Process-wide template environment, built once. Auto-escape is disabled
/// since the output is Go source, not markup.
static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    env.add_function("contains", |haystack: String, needle: String| {
        haystack.contains(&needle)
    });
    env.add_function("default_for", default_for);
    env.add_template("enum", ENUM_TEMPLATE)
        .expect("embedded enum template is valid");
    env
});

/// Zero value for a base-type category, as rendered into the error return
/// of the generated parse function.
fn default_for(kind: String) -> String {
    match kind.as_str() {
        "textual" => "\"\"",
        "floating" => "0.0",
        "boolean" => "false",
        _ => "0",
    }
    .to_string()
}

/// The identity line embedded in every companion file. The idempotency
/// guard looks for this exact text.
pub fn canonical_header(package_name: &str, type_name: &str) -> String {
    format!(
        "// Package {} adds an enum value and parsing functions for the enum type {}.",
        package_name, type_name
    )
}

/// What happened to one enum model.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Generated(PathBuf),
    Skipped(PathBuf),
}

/// Renders enum models into companion files.
pub struct Generator {
    /// When set, the header-substring guard is replaced by a strict
    /// content comparison against the freshly rendered output.
    hash_guard: bool,
}

impl Generator {
    pub fn new() -> Self {
        Self { hash_guard: false }
    }

    pub fn with_hash_guard(hash_guard: bool) -> Self {
        Self { hash_guard }
    }

    /// Generates the companion file for one enum model, or skips it when
    /// the destination already carries the matching identity header.
    pub fn generate(
        &self,
        output_dir: &Path,
        package_name: &str,
        enum_info: &EnumInfo,
    ) -> Result<Outcome> {
        let file_name = format!("{}_enum.go", enum_info.type_name.trim().to_lowercase());
        let file_path = output_dir.join(file_name);

        if self.hash_guard {
            return self.generate_hash_guarded(&file_path, package_name, enum_info);
        }

        if file_contains_header(&file_path, package_name, &enum_info.type_name)? {
            return Ok(Outcome::Skipped(file_path));
        }

        let rendered = render(package_name, enum_info)?;
        write_file(&file_path, &rendered)?;
        Ok(Outcome::Generated(file_path))
    }

    fn generate_hash_guarded(
        &self,
        file_path: &Path,
        package_name: &str,
        enum_info: &EnumInfo,
    ) -> Result<Outcome> {
        let rendered = render(package_name, enum_info)?;

        match std::fs::read(file_path) {
            Ok(existing) if md5_hex(&existing) == md5_hex(rendered.as_bytes()) => {
                return Ok(Outcome::Skipped(file_path.to_path_buf()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::GenerationIo {
                    path: file_path.to_path_buf(),
                    source: e,
                })
            }
        }

        write_file(file_path, &rendered)?;
        Ok(Outcome::Generated(file_path.to_path_buf()))
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

fn render(package_name: &str, enum_info: &EnumInfo) -> Result<String> {
    let template = TEMPLATES.get_template("enum")?;
    let rendered = template.render(context! {
        package_name => package_name,
        enum => enum_info,
    })?;
    Ok(rendered)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| Error::GenerationIo {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Scans an existing destination file for the canonical identity header.
/// A missing file means generation proceeds; any other read failure is
/// fatal.
fn file_contains_header(path: &Path, package_name: &str, type_name: &str) -> Result<bool> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(Error::GenerationIo {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let header = canonical_header(package_name, type_name);
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Error::GenerationIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        if line.contains(&header) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn md5_hex(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{BaseType, EnumValue};
    use std::fs;
    use tempfile::TempDir;

    fn color_enum() -> EnumInfo {
        EnumInfo {
            type_name: "Color".to_string(),
            base_type: BaseType::resolve("Color", "string").unwrap(),
            values: vec![
                EnumValue {
                    name: "RED".to_string(),
                    value: "\"#FF0000\"".to_string(),
                },
                EnumValue {
                    name: "BLUE".to_string(),
                    value: "\"\"".to_string(),
                },
            ],
        }
    }

    fn status_enum() -> EnumInfo {
        EnumInfo {
            type_name: "Status".to_string(),
            base_type: BaseType::resolve("Status", "int").unwrap(),
            values: vec![
                EnumValue {
                    name: "Active".to_string(),
                    value: "0".to_string(),
                },
                EnumValue {
                    name: "Pending".to_string(),
                    value: "5".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_generate_writes_companion_file() {
        let dir = TempDir::new().unwrap();
        let outcome = Generator::new()
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();

        let path = dir.path().join("color_enum.go");
        assert_eq!(outcome, Outcome::Generated(path.clone()));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(&canonical_header("colors", "Color")));
        assert!(content.contains("package colors"));
        assert!(content.contains("ColorRED Color = \"#FF0000\""));
        assert!(content.contains("ColorBLUE Color = \"\""));
        assert!(content.contains("func (e Color) String() string"));
        assert!(content.contains("func ParseColor(value string) (Color, error)"));
        assert!(content.contains("func (e Color) IsValid() bool"));
    }

    #[test]
    fn test_generated_int_enum_uses_literal_values() {
        let dir = TempDir::new().unwrap();
        Generator::new()
            .generate(dir.path(), "status", &status_enum())
            .unwrap();

        let content = fs::read_to_string(dir.path().join("status_enum.go")).unwrap();
        assert!(content.contains("StatusActive Status = 0"));
        assert!(content.contains("StatusPending Status = 5"));
        assert!(content.contains("func ParseStatus(value int) (Status, error)"));
        // Integral bases fall back to a %d-formatted stringification.
        assert!(content.contains("int64(e)"));
    }

    #[test]
    fn test_names_table_round_trips_members() {
        let dir = TempDir::new().unwrap();
        Generator::new()
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();

        let content = fs::read_to_string(dir.path().join("color_enum.go")).unwrap();
        // Every member appears in the lookup table the String/Parse pair
        // shares, keyed by its constant and mapped to its symbolic name.
        assert!(content.contains("var colorNames = map[Color]string{"));
        assert!(content.contains("ColorRED: \"RED\""));
        assert!(content.contains("ColorBLUE: \"BLUE\""));
    }

    #[test]
    fn test_parse_error_returns_zero_value() {
        let dir = TempDir::new().unwrap();
        Generator::new()
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();
        let content = fs::read_to_string(dir.path().join("color_enum.go")).unwrap();
        assert!(content.contains("return Color(\"\"), fmt.Errorf"));

        Generator::new()
            .generate(dir.path(), "status", &status_enum())
            .unwrap();
        let content = fs::read_to_string(dir.path().join("status_enum.go")).unwrap();
        assert!(content.contains("return Status(0), fmt.Errorf"));
    }

    #[test]
    fn test_destination_name_is_trimmed_and_lowercased() {
        let dir = TempDir::new().unwrap();
        let mut info = color_enum();
        info.type_name = " HTTPMethod ".to_string();
        Generator::new()
            .generate(dir.path(), "api", &info)
            .unwrap();
        assert!(dir.path().join("httpmethod_enum.go").exists());
    }

    #[test]
    fn test_second_run_is_skipped_and_file_untouched() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::new();

        generator
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();
        let path = dir.path().join("color_enum.go");
        let before = fs::read(&path).unwrap();

        let outcome = generator
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();
        assert_eq!(outcome, Outcome::Skipped(path.clone()));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_existing_file_without_header_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("color_enum.go");
        fs::write(&path, "package colors\n\n// hand-written stub\n").unwrap();

        let outcome = Generator::new()
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();
        assert_eq!(outcome, Outcome::Generated(path.clone()));
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains(&canonical_header("colors", "Color")));
    }

    #[test]
    fn test_guard_is_identity_specific() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("color_enum.go");
        // Header for a different package does not satisfy the guard.
        fs::write(
            &path,
            format!("{}\npackage old\n", canonical_header("old", "Color")),
        )
        .unwrap();

        let outcome = Generator::new()
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();
        assert_eq!(outcome, Outcome::Generated(path));
    }

    #[test]
    fn test_default_guard_ignores_content_drift() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::new();
        generator
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();

        let path = dir.path().join("color_enum.go");
        let mut content = fs::read_to_string(&path).unwrap();
        content.push_str("\n// local edit\n");
        fs::write(&path, &content).unwrap();

        // The header is still present, so the substring guard skips even
        // though the content no longer matches a fresh render.
        let outcome = generator
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();
        assert_eq!(outcome, Outcome::Skipped(path.clone()));
        assert!(fs::read_to_string(&path).unwrap().contains("// local edit"));
    }

    #[test]
    fn test_hash_guard_rewrites_drifted_content() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::with_hash_guard(true);
        generator
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();

        let path = dir.path().join("color_enum.go");
        let pristine = fs::read_to_string(&path).unwrap();

        // Untouched file: skipped.
        let outcome = generator
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();
        assert_eq!(outcome, Outcome::Skipped(path.clone()));

        // Drifted file: rewritten back to the rendered output.
        fs::write(&path, format!("{}\n// local edit\n", pristine)).unwrap();
        let outcome = generator
            .generate(dir.path(), "colors", &color_enum())
            .unwrap();
        assert_eq!(outcome, Outcome::Generated(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), pristine);
    }

    #[test]
    fn test_missing_output_directory_is_generation_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = Generator::new()
            .generate(&missing, "colors", &color_enum())
            .unwrap_err();
        assert!(matches!(err, Error::GenerationIo { .. }));
    }
}
