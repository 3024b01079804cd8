use crate::app::error::{Error, Result};
use crate::app::models::Package;
use pathdiff::diff_paths;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const GO_MOD: &str = "go.mod";

/// Identifies the Go package in `dir`: its name from the package clauses and
/// its import path from the enclosing module or GOPATH.
pub fn resolve_package(dir: &Path) -> Result<Package> {
    let name = read_package_name(dir)?;
    let module_mode = env::var("GO111MODULE").map_or(true, |v| v != "off");
    let import_path = resolve_import_path(dir, module_mode, &source_roots())?;
    Ok(Package { name, import_path })
}

/// `$GOROOT/src` followed by `src` of every GOPATH entry.
fn source_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(goroot) = env::var_os("GOROOT").filter(|v| !v.is_empty()) {
        roots.push(PathBuf::from(goroot).join("src"));
    }
    match env::var_os("GOPATH").filter(|v| !v.is_empty()) {
        Some(gopath) => roots.extend(env::split_paths(&gopath).map(|p| p.join("src"))),
        None => roots.extend(dirs::home_dir().map(|home| home.join("go").join("src"))),
    }
    roots
}

fn resolve_import_path(dir: &Path, module_mode: bool, roots: &[PathBuf]) -> Result<String> {
    if module_mode {
        if let Some((module_root, module_path)) = find_module(dir)? {
            let relative = diff_paths(dir, &module_root).unwrap_or_default();
            return Ok(join_import_path(&module_path, &slash_path(&relative)?));
        }
    }

    for root in roots {
        if let Ok(relative) = dir.strip_prefix(root) {
            if relative.as_os_str().is_empty() {
                continue;
            }
            return slash_path(relative).map(|rel| join_import_path("", &rel));
        }
    }

    Err(Error::NoImportPath(dir.to_path_buf()))
}

/// Nearest `go.mod` at or above `dir`, with its module path.
fn find_module(dir: &Path) -> Result<Option<(PathBuf, String)>> {
    for ancestor in dir.ancestors() {
        let go_mod = ancestor.join(GO_MOD);
        if !go_mod.is_file() {
            continue;
        }
        let contents = fs::read_to_string(&go_mod).map_err(|source| Error::ReadPath {
            path: go_mod.clone(),
            source,
        })?;
        let module_path =
            parse_module_directive(&contents).ok_or(Error::MissingModuleDirective(go_mod))?;
        log::debug!("Using module {} rooted at {:?}", module_path, ancestor);
        return Ok(Some((ancestor.to_path_buf(), module_path)));
    }
    Ok(None)
}

fn parse_module_directive(contents: &str) -> Option<String> {
    let mut in_block = false;
    for line in contents.lines() {
        let line = line.split("//").next().unwrap_or_default().trim();
        if in_block {
            if line.starts_with(')') {
                in_block = false;
            } else if let Some(path) = unquote(line) {
                return Some(path);
            }
            continue;
        }

        let Some(rest) = line.strip_prefix("module") else {
            continue;
        };
        if !rest.starts_with([' ', '\t', '"', '`', '(']) {
            continue;
        }
        let rest = rest.trim();
        if let Some(inner) = rest.strip_prefix('(') {
            in_block = true;
            if let Some(path) = unquote(inner.trim()) {
                return Some(path);
            }
        } else if let Some(path) = unquote(rest) {
            return Some(path);
        }
    }
    None
}

fn unquote(token: &str) -> Option<String> {
    let inner = ['"', '`']
        .iter()
        .find_map(|&q| token.strip_prefix(q).and_then(|t| t.strip_suffix(q)))
        .unwrap_or(token);
    if inner.is_empty() || inner.contains(char::is_whitespace) {
        return None;
    }
    Some(inner.to_string())
}

/// Package clause shared by the buildable Go files in `dir`.
fn read_package_name(dir: &Path) -> Result<String> {
    let read_error = |source| Error::ReadPath {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(read_error)?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(read_error)?;
    entries.sort_by_key(|e| e.file_name());

    let mut found: Option<(String, String)> = None;
    for entry in entries {
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !is_go_source(&file_name) || !entry.path().is_file() {
            continue;
        }

        let path = entry.path();
        let contents = fs::read_to_string(&path).map_err(|source| Error::ReadPath {
            path: path.clone(),
            source,
        })?;
        let header = scan_header(&contents).ok_or_else(|| Error::MissingPackageClause(path))?;
        if header.ignored || header.name == "documentation" {
            log::debug!("Ignoring {}", file_name);
            continue;
        }

        match &found {
            None => found = Some((header.name, file_name)),
            Some((first, first_file)) if *first != header.name => {
                return Err(Error::MultiplePackages {
                    dir: dir.to_path_buf(),
                    first: first.clone(),
                    first_file: first_file.clone(),
                    second: header.name,
                    second_file: file_name,
                })
            }
            Some(_) => {}
        }
    }

    found
        .map(|(name, _)| name)
        .ok_or_else(|| Error::NoGoFiles(dir.to_path_buf()))
}

fn is_go_source(file_name: &str) -> bool {
    file_name.ends_with(".go")
        && !file_name.ends_with("_test.go")
        && !file_name.starts_with(['_', '.'])
}

struct FileHeader {
    name: String,
    ignored: bool,
}

/// Reads past leading comments to the package clause, noting `ignore` build constraints.
fn scan_header(src: &str) -> Option<FileHeader> {
    let mut rest = src;
    let mut ignored = false;

    loop {
        rest = rest.trim_start();
        if let Some(comment) = rest.strip_prefix("//") {
            let (line, tail) = comment.split_once('\n').unwrap_or((comment, ""));
            ignored |= is_ignore_constraint(line);
            rest = tail;
        } else if let Some(comment) = rest.strip_prefix("/*") {
            rest = &comment[comment.find("*/")? + 2..];
        } else {
            break;
        }
    }

    let rest = rest.strip_prefix("package")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name: String = rest
        .trim_start()
        .chars()
        .take_while(|&c| c == '_' || c.is_alphanumeric())
        .collect();
    if name.is_empty() {
        return None;
    }
    Some(FileHeader { name, ignored })
}

fn is_ignore_constraint(comment: &str) -> bool {
    let comment = comment.trim_end();
    if let Some(expr) = comment.strip_prefix("go:build ") {
        return expr
            .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '!'))
            .any(|tag| tag == "ignore");
    }
    if let Some(tags) = comment.trim_start().strip_prefix("+build ") {
        return tags
            .split(|c: char| c.is_whitespace() || c == ',')
            .any(|tag| tag == "ignore");
    }
    false
}

fn slash_path(path: &Path) -> Result<String> {
    let parts = path
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| Error::NonUtf8Path(path.to_path_buf()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

/// Joins slash-separated import path elements, then cleans the result
/// lexically. Empty elements are ignored.
pub fn join_import_path(base: &str, rel: &str) -> String {
    let joined = match (base.is_empty(), rel.is_empty()) {
        (true, true) => return String::new(),
        (true, false) => rel.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{}/{}", base, rel),
    };
    clean_import_path(&joined)
}

fn clean_import_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }

    let body = parts.join("/");
    if rooted {
        format!("/{}", body)
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn joins_and_cleans_import_paths() {
        assert_eq!(join_import_path("example.com/app", "plugins"), "example.com/app/plugins");
        assert_eq!(join_import_path("example.com/app", "./plugins/"), "example.com/app/plugins");
        assert_eq!(join_import_path("example.com/app", "a//b/../c"), "example.com/app/a/c");
        assert_eq!(join_import_path("example.com/app", "../lib"), "example.com/lib");
        assert_eq!(join_import_path("example.com/app", ""), "example.com/app");
        assert_eq!(join_import_path("", "x"), "x");
        assert_eq!(join_import_path(".", "x"), "x");
        assert_eq!(join_import_path("", ""), "");
        assert_eq!(join_import_path("a", ".."), ".");
    }

    #[test]
    fn parses_module_directive_forms() {
        assert_eq!(
            parse_module_directive("// header\nmodule example.com/app // trailing\n\ngo 1.22\n"),
            Some("example.com/app".to_string())
        );
        assert_eq!(
            parse_module_directive("module \"example.com/quoted\"\n"),
            Some("example.com/quoted".to_string())
        );
        assert_eq!(
            parse_module_directive("module `example.com/raw`\n"),
            Some("example.com/raw".to_string())
        );
        assert_eq!(
            parse_module_directive("module (\n\texample.com/block\n)\n"),
            Some("example.com/block".to_string())
        );
        assert_eq!(parse_module_directive("modules x\ngo 1.22\n"), None);
        assert_eq!(parse_module_directive(""), None);
    }

    #[test]
    fn resolves_import_path_from_nearest_go_mod() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "go.mod", "module example.com/app\n");
        let nested = temp.path().join("cmd").join("server");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            resolve_import_path(temp.path(), true, &[]).unwrap(),
            "example.com/app"
        );
        assert_eq!(
            resolve_import_path(&nested, true, &[]).unwrap(),
            "example.com/app/cmd/server"
        );
    }

    #[test]
    fn go_mod_without_module_is_an_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "go.mod", "go 1.22\n");
        assert!(matches!(
            resolve_import_path(temp.path(), true, &[]),
            Err(Error::MissingModuleDirective(_))
        ));
    }

    #[test]
    fn falls_back_to_gopath_roots() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let pkg = src.join("github.com").join("acme").join("tool");
        fs::create_dir_all(&pkg).unwrap();
        write(&pkg, "go.mod", "module example.com/ignored\n");

        assert_eq!(
            resolve_import_path(&pkg, false, &[src.clone()]).unwrap(),
            "github.com/acme/tool"
        );
        assert!(matches!(
            resolve_import_path(&src, false, &[src.clone()]),
            Err(Error::NoImportPath(_))
        ));
    }

    #[test]
    fn outside_any_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            resolve_import_path(temp.path(), false, &[]),
            Err(Error::NoImportPath(_))
        ));
    }

    #[test]
    fn reads_package_name_skipping_non_build_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "app.go", "// Package app does things.\n/* block */\npackage app\n");
        write(temp.path(), "app_test.go", "package app_test\n");
        write(temp.path(), "_scratch.go", "package scratch\n");
        write(temp.path(), "gen.go", "//go:build ignore\n\npackage main\n");
        write(temp.path(), "old.go", "// +build ignore\n\npackage main\n");
        write(temp.path(), "doc.go", "package documentation\n");
        write(temp.path(), "README.md", "package readme\n");
        fs::create_dir(temp.path().join("dir.go")).unwrap();

        assert_eq!(read_package_name(temp.path()).unwrap(), "app");
    }

    #[test]
    fn conflicting_package_names_are_an_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.go", "package alpha\n");
        write(temp.path(), "b.go", "package beta\n");

        let err = read_package_name(temp.path()).unwrap_err();
        assert!(err.to_string().contains("found packages alpha (a.go) and beta (b.go)"));
    }

    #[test]
    fn no_go_files_is_an_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "notes.txt", "hello");
        assert!(matches!(read_package_name(temp.path()), Err(Error::NoGoFiles(_))));
    }

    #[test]
    fn missing_package_clause_is_an_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "broken.go", "func main() {}\n");
        assert!(matches!(
            read_package_name(temp.path()),
            Err(Error::MissingPackageClause(_))
        ));
    }

    #[test]
    fn build_constraints_other_than_ignore_are_kept() {
        assert!(is_ignore_constraint("go:build ignore"));
        assert!(is_ignore_constraint("go:build ignore && linux"));
        assert!(!is_ignore_constraint("go:build !ignore"));
        assert!(!is_ignore_constraint("go:build linux"));
        assert!(is_ignore_constraint(" +build ignore"));
        assert!(!is_ignore_constraint(" Package app ignores nothing"));
    }
}
