//! Configuration for the linkage pipeline.

use std::fmt;
use std::path::PathBuf;

use crate::error::{LinkageError, Result};
use crate::error::util::validate_directory;

/// Default file extension of clinic letters in the letter tree
pub const DEFAULT_LETTER_EXTENSION: &str = "pdf";

/// Configuration for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Headerless file with one raw patient identifier per line
    pub roster_path: PathBuf,
    /// Root of the letter tree; letters live in one folder per patient
    pub letters_dir: PathBuf,
    /// JSON-lines export of the NLP stage, one record per letter
    pub records_path: PathBuf,
    /// Directory receiving the matrix, id lists, summary and cache
    pub output_dir: PathBuf,
    /// Extension (without dot) of files counted as letters
    pub letter_extension: String,
    /// Reuse a cached directory listing when one exists in the output dir
    pub use_cache: bool,
    /// Process patients in parallel
    pub use_parallel: bool,
    /// Worker threads for the parallel pass
    pub num_threads: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from("roster.txt"),
            letters_dir: PathBuf::from("letters"),
            records_path: PathBuf::from("records.json"),
            output_dir: PathBuf::from("output"),
            letter_extension: DEFAULT_LETTER_EXTENSION.to_string(),
            use_cache: true,
            use_parallel: true,
            num_threads: num_cpus::get(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for constructing a configuration
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Build a configuration from `LINKER_*` environment variables over the defaults
    ///
    /// Boolean variables accept `1/0`, `true/false`, `yes/no`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build a configuration from `LINKER_*` values returned by `lookup`
    ///
    /// Blank values are treated as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = var("LINKER_ROSTER") {
            config.roster_path = PathBuf::from(path);
        }
        if let Some(path) = var("LINKER_LETTERS_DIR") {
            config.letters_dir = PathBuf::from(path);
        }
        if let Some(path) = var("LINKER_RECORDS") {
            config.records_path = PathBuf::from(path);
        }
        if let Some(path) = var("LINKER_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(path);
        }
        if let Some(ext) = var("LINKER_EXTENSION") {
            config.letter_extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(value) = var("LINKER_USE_CACHE") {
            config.use_cache = parse_flag("LINKER_USE_CACHE", &value)?;
        }
        if let Some(value) = var("LINKER_PARALLEL") {
            config.use_parallel = parse_flag("LINKER_PARALLEL", &value)?;
        }
        if let Some(value) = var("LINKER_THREADS") {
            config.num_threads = value.trim().parse::<usize>().map_err(|e| {
                LinkageError::Config(format!("LINKER_THREADS must be a number: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Check that every input exists before any work starts
    pub fn validate(&self) -> Result<()> {
        if !self.roster_path.is_file() {
            return Err(LinkageError::Config(format!(
                "Roster file not found: {}",
                self.roster_path.display()
            )));
        }
        if !self.records_path.is_file() {
            return Err(LinkageError::Config(format!(
                "NLP record export not found: {}",
                self.records_path.display()
            )));
        }
        validate_directory(&self.letters_dir, "letter tree")?;
        if self.letter_extension.is_empty() {
            return Err(LinkageError::Config(
                "Letter extension must not be empty".to_string(),
            ));
        }
        if self.num_threads == 0 {
            return Err(LinkageError::Config(
                "Thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(LinkageError::Config(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Configuration:")?;
        writeln!(f, "  Roster: {}", self.roster_path.display())?;
        writeln!(f, "  Letter Tree: {}", self.letters_dir.display())?;
        writeln!(f, "  NLP Records: {}", self.records_path.display())?;
        writeln!(f, "  Output Dir: {}", self.output_dir.display())?;
        writeln!(f, "  Letter Extension: .{}", self.letter_extension)?;
        writeln!(f, "  Use Cache: {}", self.use_cache)?;
        write!(
            f,
            "  Parallel: {} ({} threads)",
            self.use_parallel, self.num_threads
        )
    }
}

/// Builder for constructing a pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the roster file
    #[must_use]
    pub fn roster_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.roster_path = path.into();
        self
    }

    /// Set the root of the letter tree
    #[must_use]
    pub fn letters_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.letters_dir = path.into();
        self
    }

    /// Set the NLP record export
    #[must_use]
    pub fn records_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.records_path = path.into();
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = path.into();
        self
    }

    /// Set the letter file extension
    #[must_use]
    pub fn letter_extension(mut self, extension: &str) -> Self {
        self.config.letter_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Set whether the directory listing cache is used
    #[must_use]
    pub const fn use_cache(mut self, use_cache: bool) -> Self {
        self.config.use_cache = use_cache;
        self
    }

    /// Set whether patients are processed in parallel
    #[must_use]
    pub const fn use_parallel(mut self, parallel: bool) -> Self {
        self.config.use_parallel = parallel;
        self
    }

    /// Set the number of worker threads
    #[must_use]
    pub const fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = PipelineConfig::builder()
            .roster_path("ids.txt")
            .letter_extension(".PDF")
            .use_cache(false)
            .num_threads(2)
            .build();

        assert_eq!(config.roster_path, PathBuf::from("ids.txt"));
        assert_eq!(config.letter_extension, "PDF");
        assert!(!config.use_cache);
        assert!(config.use_parallel);
        assert_eq!(config.num_threads, 2);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("X", "Yes").unwrap());
        assert!(!parse_flag("X", "0").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
        }
    }

    #[test]
    fn test_from_vars_overrides_defaults() {
        let vars = [
            ("LINKER_ROSTER", "/data/ids.csv"),
            ("LINKER_LETTERS_DIR", "/data/letters"),
            ("LINKER_RECORDS", "/data/export.json"),
            ("LINKER_OUTPUT_DIR", "/tmp/out"),
            ("LINKER_EXTENSION", ".PDF"),
            ("LINKER_USE_CACHE", "no"),
            ("LINKER_PARALLEL", "false"),
            ("LINKER_THREADS", " 3 "),
        ];
        let config = PipelineConfig::from_vars(lookup(&vars)).unwrap();

        assert_eq!(config.roster_path, PathBuf::from("/data/ids.csv"));
        assert_eq!(config.letters_dir, PathBuf::from("/data/letters"));
        assert_eq!(config.records_path, PathBuf::from("/data/export.json"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.letter_extension, "PDF");
        assert!(!config.use_cache);
        assert!(!config.use_parallel);
        assert_eq!(config.num_threads, 3);
    }

    #[test]
    fn test_from_vars_keeps_defaults_for_blank_values() {
        let vars = [("LINKER_ROSTER", "  "), ("LINKER_USE_CACHE", "")];
        let config = PipelineConfig::from_vars(lookup(&vars)).unwrap();
        let defaults = PipelineConfig::default();

        assert_eq!(config.roster_path, defaults.roster_path);
        assert_eq!(config.use_cache, defaults.use_cache);
    }

    #[test]
    fn test_from_vars_rejects_bad_values() {
        let threads = [("LINKER_THREADS", "many")];
        assert!(matches!(
            PipelineConfig::from_vars(lookup(&threads)),
            Err(LinkageError::Config(message)) if message.contains("LINKER_THREADS")
        ));

        let parallel = [("LINKER_PARALLEL", "sometimes")];
        assert!(PipelineConfig::from_vars(lookup(&parallel)).is_err());
    }

    #[test]
    fn test_validate_rejects_missing_inputs() {
        let config = PipelineConfig::builder()
            .roster_path("/no/such/roster.txt")
            .build();
        assert!(matches!(config.validate(), Err(LinkageError::Config(_))));
    }
}
