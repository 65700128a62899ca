//! Configuration for a deterministic archive run.

use crate::ArchiveError;
use crate::Result;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

/// Input key holding the newline-separated pattern list.
pub const INPUT_PATHS: &str = "paths";
/// Input key holding the destination archive path.
pub const INPUT_OUTPUT_FILE: &str = "outputFile";
/// Input key toggling creation of the destination directory.
pub const INPUT_AUTO_CREATE_OUTPUT_DIR: &str = "autoCreateOutputDir";
/// Reserved input key, accepted and carried but never used.
pub const INPUT_MILLISECONDS: &str = "milliseconds";

/// Maximum DEFLATE level, used unless configured otherwise.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 9;

/// What to do when two resolved files share a base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Replace the earlier entry's content in place and record a warning.
    #[default]
    LastWins,
    /// Fail the build with [`ArchiveError::EntryNameCollision`].
    Error,
}

/// How the finished archive is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate and overwrite the destination directly.
    #[default]
    Overwrite,
    /// Write to a temporary file next to the destination, then rename it.
    Atomic,
}

/// Configuration for one archive run.
///
/// This is the only input the pipeline reads: nothing is looked up from the
/// environment inside the core.
///
/// # Examples
///
/// ```
/// use stablezip_core::ArchiveConfig;
///
/// let config = ArchiveConfig::new(vec!["dist/*.js".to_string()], "out/bundle.zip")
///     .with_auto_create_output_dir(true)
///     .with_compression_level(9);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Glob patterns, in order. Blank entries are not allowed here; use
    /// [`parse_paths`] to clean raw input.
    pub patterns: Vec<String>,

    /// Destination archive path.
    pub output_file: PathBuf,

    /// Directory relative patterns are expanded against.
    ///
    /// `None` means the process working directory.
    pub root: Option<PathBuf>,

    /// Create the destination's parent directory when missing.
    ///
    /// Default: `false`.
    pub auto_create_output_dir: bool,

    /// DEFLATE level (1-9).
    ///
    /// Default: `9`.
    pub compression_level: u8,

    /// Entry-name collision handling.
    ///
    /// Default: [`CollisionPolicy::LastWins`].
    pub collision_policy: CollisionPolicy,

    /// Destination write strategy.
    ///
    /// Default: [`WriteMode::Overwrite`].
    pub write_mode: WriteMode,

    /// Reserved input; accepted but not consumed.
    pub milliseconds: Option<String>,
}

impl ArchiveConfig {
    /// Creates a configuration with default options.
    #[must_use]
    pub fn new(patterns: Vec<String>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            patterns,
            output_file: output_file.into(),
            root: None,
            auto_create_output_dir: false,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            collision_policy: CollisionPolicy::default(),
            write_mode: WriteMode::default(),
            milliseconds: None,
        }
    }

    /// Builds a configuration from a string-keyed input map.
    ///
    /// Applies the invocation rules: `paths` is split on newlines with blank
    /// lines dropped, `outputFile` is made absolute against the working
    /// directory, `autoCreateOutputDir` is parsed as a boolean-ish string and
    /// `milliseconds` is carried through untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use stablezip_core::ArchiveConfig;
    /// use std::collections::HashMap;
    ///
    /// let inputs = HashMap::from([
    ///     ("paths".to_string(), "a.txt\n\n  b.txt  \n".to_string()),
    ///     ("outputFile".to_string(), "out.zip".to_string()),
    ///     ("autoCreateOutputDir".to_string(), "true".to_string()),
    /// ]);
    /// let config = ArchiveConfig::from_inputs(&inputs).unwrap();
    /// assert_eq!(config.patterns, vec!["a.txt", "b.txt"]);
    /// assert!(config.output_file.is_absolute());
    /// assert!(config.auto_create_output_dir);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `paths` is missing or blank ([`ArchiveError::EmptyInput`])
    /// - `outputFile` is missing or blank
    /// - `autoCreateOutputDir` is not boolean-ish
    /// - the working directory cannot be determined
    pub fn from_inputs<S: std::hash::BuildHasher>(
        inputs: &HashMap<String, String, S>,
    ) -> Result<Self> {
        let raw_paths = inputs.get(INPUT_PATHS).map_or("", String::as_str);
        let output_file = inputs
            .get(INPUT_OUTPUT_FILE)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ArchiveError::InvalidInput {
                name: INPUT_OUTPUT_FILE.to_string(),
                reason: "a destination path is required".to_string(),
            })?;
        let mut config = Self::from_raw([raw_paths], Path::new(output_file))?;

        if let Some(value) = inputs.get(INPUT_AUTO_CREATE_OUTPUT_DIR) {
            config.auto_create_output_dir = parse_bool(INPUT_AUTO_CREATE_OUTPUT_DIR, value)?;
        }
        config.milliseconds = inputs.get(INPUT_MILLISECONDS).cloned();
        Ok(config)
    }

    /// Builds a configuration from raw pattern text and a destination.
    ///
    /// Each raw value is split with [`parse_paths`]; the patterns of all
    /// values are concatenated in order. `output_file` is made absolute
    /// against the working directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use stablezip_core::ArchiveConfig;
    /// use std::path::Path;
    ///
    /// let config = ArchiveConfig::from_raw(["a.txt\n", "dist/*\r\nb.txt"], Path::new("out.zip"))?;
    /// assert_eq!(config.patterns, vec!["a.txt", "dist/*", "b.txt"]);
    /// assert!(config.output_file.is_absolute());
    /// # Ok::<(), stablezip_core::ArchiveError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::EmptyInput`] if no pattern remains, or an I/O
    /// error if the working directory cannot be determined.
    pub fn from_raw<'a, I>(raw_paths: I, output_file: &Path) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let patterns: Vec<String> = raw_paths.into_iter().flat_map(parse_paths).collect();
        if patterns.is_empty() {
            return Err(ArchiveError::EmptyInput);
        }
        Ok(Self::new(patterns, absolutize(output_file)?))
    }

    /// Sets the directory patterns are expanded against.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Sets whether to create the destination directory.
    #[must_use]
    pub fn with_auto_create_output_dir(mut self, create: bool) -> Self {
        self.auto_create_output_dir = create;
        self
    }

    /// Sets the compression level.
    ///
    /// # Panics
    ///
    /// Panics if the compression level is not in the range 1-9.
    /// Use `validate()` for non-panicking validation.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        assert!((1..=9).contains(&level), "compression level must be 1-9");
        self.compression_level = level;
        self
    }

    /// Sets the collision policy.
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Sets the write mode.
    #[must_use]
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Sets the reserved `milliseconds` value.
    #[must_use]
    pub fn with_milliseconds(mut self, value: Option<String>) -> Self {
        self.milliseconds = value;
        self
    }

    /// Returns the directory patterns are expanded against.
    ///
    /// # Errors
    ///
    /// Returns an error if no root is configured and the working directory
    /// cannot be determined.
    pub fn resolved_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no non-blank pattern is present
    /// - only exclusion patterns are present
    /// - compression level is not in range 1-9
    pub fn validate(&self) -> Result<()> {
        if !self
            .patterns
            .iter()
            .map(|p| p.trim())
            .any(|p| !p.is_empty() && !p.starts_with('!'))
        {
            return Err(ArchiveError::EmptyInput);
        }
        if !(1..=9).contains(&self.compression_level) {
            return Err(ArchiveError::InvalidCompressionLevel {
                level: self.compression_level,
            });
        }
        Ok(())
    }
}

/// Splits raw `paths` input into trimmed, non-blank patterns.
///
/// Both `\r` and `\n` separate entries.
///
/// # Examples
///
/// ```
/// use stablezip_core::config::parse_paths;
///
/// assert_eq!(parse_paths("a\r\n b \n\n"), vec!["a", "b"]);
/// assert!(parse_paths("  \n\t").is_empty());
/// ```
#[must_use]
pub fn parse_paths(raw: &str) -> Vec<String> {
    raw.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a boolean-ish input value.
///
/// Accepts `true/false`, `1/0`, `yes/no`, `on/off`, `y/n`
/// (case-insensitive). An empty value is `false`.
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidInput`] for any other value.
pub fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "n" | "" => Ok(false),
        other => Err(ArchiveError::InvalidInput {
            name: name.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_archive_config_defaults() {
        let config = ArchiveConfig::new(vec!["*.txt".to_string()], "out.zip");
        assert_eq!(config.compression_level, 9);
        assert!(!config.auto_create_output_dir);
        assert_eq!(config.collision_policy, CollisionPolicy::LastWins);
        assert_eq!(config.write_mode, WriteMode::Overwrite);
        assert_eq!(config.root, None);
        assert_eq!(config.milliseconds, None);
    }

    #[test]
    fn test_archive_config_builder() {
        let config = ArchiveConfig::new(vec!["a".to_string()], "out.zip")
            .with_root("/work")
            .with_auto_create_output_dir(true)
            .with_compression_level(1)
            .with_collision_policy(CollisionPolicy::Error)
            .with_write_mode(WriteMode::Atomic)
            .with_milliseconds(Some("500".to_string()));

        assert_eq!(config.root, Some(PathBuf::from("/work")));
        assert!(config.auto_create_output_dir);
        assert_eq!(config.compression_level, 1);
        assert_eq!(config.collision_policy, CollisionPolicy::Error);
        assert_eq!(config.write_mode, WriteMode::Atomic);
        assert_eq!(config.milliseconds.as_deref(), Some("500"));
        assert_eq!(config.resolved_root().unwrap(), PathBuf::from("/work"));
    }

    #[test]
    fn test_validate_rejects_empty_patterns() {
        let config = ArchiveConfig::new(vec![], "out.zip");
        assert!(matches!(config.validate(), Err(ArchiveError::EmptyInput)));

        let config = ArchiveConfig::new(vec!["  ".to_string()], "out.zip");
        assert!(matches!(config.validate(), Err(ArchiveError::EmptyInput)));

        let config = ArchiveConfig::new(vec!["!*.log".to_string()], "out.zip");
        assert!(matches!(config.validate(), Err(ArchiveError::EmptyInput)));
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let mut config = ArchiveConfig::new(vec!["a".to_string()], "out.zip");
        config.compression_level = 0;
        assert!(matches!(
            config.validate(),
            Err(ArchiveError::InvalidCompressionLevel { level: 0 })
        ));
        config.compression_level = 10;
        assert!(matches!(
            config.validate(),
            Err(ArchiveError::InvalidCompressionLevel { level: 10 })
        ));
    }

    #[test]
    #[should_panic(expected = "compression level must be 1-9")]
    fn test_builder_invalid_compression() {
        let _config = ArchiveConfig::new(vec![], "out.zip").with_compression_level(0);
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(
            parse_paths("a.txt\nb.txt\r\n\r\n  c/*.md  "),
            vec!["a.txt", "b.txt", "c/*.md"]
        );
        assert!(parse_paths("").is_empty());
        assert!(parse_paths("\n \r\n\t\n").is_empty());
    }

    #[test]
    fn test_parse_bool() {
        for value in ["true", "TRUE", "1", "yes", "On", "y"] {
            assert!(parse_bool("flag", value).unwrap(), "{value}");
        }
        for value in ["false", "0", "no", "OFF", "n", "", "  "] {
            assert!(!parse_bool("flag", value).unwrap(), "{value}");
        }
        let err = parse_bool("flag", "maybe").unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidInput { ref name, .. } if name == "flag"));
    }

    #[test]
    fn test_from_inputs() {
        let config = ArchiveConfig::from_inputs(&inputs(&[
            ("paths", "a.txt\n\nb.txt\n"),
            ("outputFile", "build/out.zip"),
            ("autoCreateOutputDir", "1"),
            ("milliseconds", "1000"),
        ]))
        .unwrap();

        assert_eq!(config.patterns, vec!["a.txt", "b.txt"]);
        assert!(config.output_file.is_absolute());
        assert!(config.output_file.ends_with("build/out.zip"));
        assert!(config.auto_create_output_dir);
        assert_eq!(config.milliseconds.as_deref(), Some("1000"));
    }

    #[test]
    fn test_from_inputs_blank_paths() {
        let result = ArchiveConfig::from_inputs(&inputs(&[
            ("paths", " \n \r\n"),
            ("outputFile", "out.zip"),
        ]));
        assert!(matches!(result, Err(ArchiveError::EmptyInput)));

        let result = ArchiveConfig::from_inputs(&inputs(&[("outputFile", "out.zip")]));
        assert!(matches!(result, Err(ArchiveError::EmptyInput)));
    }

    #[test]
    fn test_from_inputs_missing_output() {
        let result = ArchiveConfig::from_inputs(&inputs(&[("paths", "a.txt")]));
        assert!(matches!(
            result,
            Err(ArchiveError::InvalidInput { ref name, .. }) if name == INPUT_OUTPUT_FILE
        ));
    }

    #[test]
    fn test_from_raw_concatenates_values() {
        let config = ArchiveConfig::from_raw(["a.txt\n\n", " ", "b/*.md\r\nc"], Path::new("o.zip"))
            .unwrap();
        assert_eq!(config.patterns, vec!["a.txt", "b/*.md", "c"]);
        assert!(config.output_file.is_absolute());
        assert!(config.output_file.ends_with("o.zip"));

        let result = ArchiveConfig::from_raw(["\n", ""], Path::new("o.zip"));
        assert!(matches!(result, Err(ArchiveError::EmptyInput)));
    }

    #[test]
    fn test_from_inputs_defaults_auto_create_to_false() {
        let config =
            ArchiveConfig::from_inputs(&inputs(&[("paths", "a"), ("outputFile", "/tmp/o.zip")]))
                .unwrap();
        assert!(!config.auto_create_output_dir);
        assert_eq!(config.output_file, PathBuf::from("/tmp/o.zip"));
    }
}
