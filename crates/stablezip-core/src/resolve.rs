//! Pattern expansion into a deduplicated list of regular files.
//!
//! Patterns follow the usual glob conventions: `*`, `?`, `[...]` and `{a,b}`
//! stay within one path component, `**` spans directories. A pattern with no
//! metacharacters is looked up directly; any other pattern is walked from its
//! longest literal directory prefix, following symbolic links to
//! directories. Patterns starting with `!` remove files from the result.
//!
//! Wildcards never match a name starting with `.`: hidden files are only
//! picked up, and hidden directories only entered, where the matching
//! pattern component itself starts with `.` (as in `.*` or `**/.env`) or
//! names them literally.

use crate::ArchiveError;
use crate::Result;
use globset::Glob;
use globset::GlobBuilder;
use globset::GlobMatcher;
use globset::GlobSet;
use globset::GlobSetBuilder;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

const GLOB_META: [char; 4] = ['*', '?', '[', '{'];

/// Expands `patterns` against `root` into regular-file paths.
///
/// Results keep the order in which files were first seen: pattern by
/// pattern, and within a pattern in file-name order. A symbolic link that
/// matches and points to a regular file is returned as that file; one that
/// points nowhere aborts the expansion.
///
/// An empty result is not an error here; the caller decides.
///
/// # Examples
///
/// ```no_run
/// use stablezip_core::resolve::resolve;
/// use std::path::Path;
///
/// let files = resolve(&["src/**/*.rs", "!src/generated/**"], Path::new("."))?;
/// for file in &files {
///     println!("{}", file.display());
/// }
/// # Ok::<(), stablezip_core::ArchiveError>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - a pattern is not a valid glob ([`ArchiveError::InvalidPattern`])
/// - a matched symlink is dangling ([`ArchiveError::BrokenLink`])
/// - a directory cannot be read ([`ArchiveError::Traversal`])
pub fn resolve<S: AsRef<str>>(patterns: &[S], root: &Path) -> Result<Vec<PathBuf>> {
    let mut includes = Vec::new();
    let mut excludes = Vec::new();
    for raw in patterns {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            continue;
        }
        match raw.strip_prefix('!') {
            Some(negated) => excludes.push(negated.trim()),
            None => includes.push(CompiledPattern::new(raw)?),
        }
    }
    let exclusions = Exclusions::new(&excludes)?;

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for pattern in &includes {
        let before = files.len();
        pattern.expand(root, &mut |path: PathBuf| {
            if !exclusions.excludes(&path, root) && seen.insert(path.clone()) {
                files.push(path);
            }
        })?;
        tracing::debug!(
            pattern = %pattern.raw,
            matched = files.len() - before,
            "expanded pattern"
        );
    }

    Ok(files)
}

/// Strips leading `./` components so `./a.txt` and `a.txt` match alike.
fn normalize(pattern: &str) -> &str {
    let mut pattern = pattern;
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest.trim_start_matches('/');
    }
    pattern
}

fn is_dynamic(component: &str) -> bool {
    component.contains(GLOB_META)
}

fn compile(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map_err(|source| ArchiveError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// An include pattern split into its literal base and matcher.
struct CompiledPattern {
    raw: String,
    normalized: String,
    /// Literal leading directory components.
    base: PathBuf,
    /// `None` for patterns without metacharacters.
    matcher: Option<GlobMatcher>,
    /// Walk depth below `base`; `None` when the pattern contains `**`.
    max_depth: Option<usize>,
    /// Pattern components below `base` that start with `.`.
    dot_components: GlobSet,
}

impl CompiledPattern {
    fn new(raw: &str) -> Result<Self> {
        let normalized = normalize(raw).to_string();

        if !is_dynamic(&normalized) {
            return Ok(Self {
                raw: raw.to_string(),
                base: PathBuf::from(&normalized),
                normalized,
                matcher: None,
                max_depth: None,
                dot_components: GlobSet::empty(),
            });
        }

        let components: Vec<&str> = normalized.split('/').collect();
        let literal = components
            .iter()
            .take_while(|c| !is_dynamic(c))
            .count();
        let rest = &components[literal..];

        let mut base = components[..literal].join("/");
        if base.is_empty() && normalized.starts_with('/') {
            base.push('/');
        }
        let max_depth = if rest.iter().any(|c| c.contains("**")) {
            None
        } else {
            Some(rest.len())
        };

        let mut dots = GlobSetBuilder::new();
        for component in rest.iter().filter(|c| c.starts_with('.')) {
            dots.add(compile(component)?);
        }
        let dot_components = dots.build().map_err(|source| ArchiveError::InvalidPattern {
            pattern: raw.to_string(),
            source,
        })?;

        Ok(Self {
            raw: raw.to_string(),
            matcher: Some(compile(&normalized)?.compile_matcher()),
            base: PathBuf::from(base),
            normalized,
            max_depth,
            dot_components,
        })
    }

    /// Whether a walked name may be considered: visible names always,
    /// hidden ones only when a `.`-leading pattern component matches them.
    fn admits(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        !name.starts_with('.') || self.dot_components.is_match(&*name)
    }

    fn matches(&self, matcher: &GlobMatcher, path: &Path, root: &Path) -> bool {
        let key = if self.is_absolute() {
            path
        } else {
            path.strip_prefix(root).unwrap_or(path)
        };
        matcher.is_match(key)
    }

    fn is_absolute(&self) -> bool {
        Path::new(&self.normalized).is_absolute()
    }

    /// Feeds every regular file matched by this pattern to `emit`.
    fn expand(&self, root: &Path, emit: &mut dyn FnMut(PathBuf)) -> Result<()> {
        let Some(matcher) = &self.matcher else {
            let path = root.join(&self.base);
            if let Some(file) = classify_static(&path)? {
                emit(file);
            }
            return Ok(());
        };

        let walk_root = if self.base.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(&self.base)
        };
        if fs::symlink_metadata(&walk_root).is_err() {
            return Ok(());
        }

        let mut walker = WalkDir::new(&walk_root)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }
        // Depth 0 is the literal base, which may itself be hidden.
        let entries = walker
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.admits(entry.file_name()));

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    if let Some(link) = dangling_link(&source) {
                        let visible = link.file_name().is_some_and(|name| self.admits(name));
                        if visible && self.matches(matcher, link, root) {
                            return Err(ArchiveError::BrokenLink {
                                path: link.to_path_buf(),
                            });
                        }
                        continue;
                    }
                    return Err(ArchiveError::Traversal {
                        path: source
                            .path()
                            .map_or_else(|| walk_root.clone(), Path::to_path_buf),
                        source,
                    });
                }
            };

            // Links are already resolved: directories, symlinked or not, are
            // only descended into.
            if entry.file_type().is_file() && self.matches(matcher, entry.path(), root) {
                emit(entry.path().to_path_buf());
            }
        }

        Ok(())
    }
}

/// Looks up a literal path; `Ok(None)` if absent or not a file.
fn classify_static(path: &Path) -> Result<Option<PathBuf>> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ArchiveError::Io(e)),
    };

    if metadata.is_file() || (metadata.file_type().is_symlink() && follows_to_file(path)?) {
        Ok(Some(path.to_path_buf()))
    } else {
        Ok(None)
    }
}

/// The link behind a walk error, if the error is a dangling symlink.
fn dangling_link(err: &walkdir::Error) -> Option<&Path> {
    let path = err.path()?;
    let not_found = err
        .io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
    let is_link = fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink());
    (not_found && is_link).then_some(path)
}

/// Resolves a symlink, failing if its target does not exist.
fn follows_to_file(link: &Path) -> Result<bool> {
    match fs::metadata(link) {
        Ok(target) => Ok(target.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ArchiveError::BrokenLink {
            path: link.to_path_buf(),
        }),
        Err(e) => Err(ArchiveError::Io(e)),
    }
}

/// Compiled `!` patterns, split by whether they are absolute.
struct Exclusions {
    relative: GlobSet,
    absolute: GlobSet,
}

impl Exclusions {
    fn new(patterns: &[&str]) -> Result<Self> {
        let mut relative = GlobSetBuilder::new();
        let mut absolute = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = normalize(pattern);
            if pattern.is_empty() {
                continue;
            }
            let glob = compile(pattern)?;
            if Path::new(pattern).is_absolute() {
                absolute.add(glob);
            } else {
                relative.add(glob);
            }
        }

        let build = |builder: GlobSetBuilder| {
            builder.build().map_err(|source| ArchiveError::InvalidPattern {
                pattern: patterns.join(", "),
                source,
            })
        };
        Ok(Self {
            relative: build(relative)?,
            absolute: build(absolute)?,
        })
    }

    fn excludes(&self, path: &Path, root: &Path) -> bool {
        if self.absolute.is_match(path) {
            return true;
        }
        path.strip_prefix(root)
            .is_ok_and(|relative| self.relative.is_match(relative))
    }
}
