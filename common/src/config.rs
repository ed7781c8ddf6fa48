use std::time::Duration;

/// Group tag stamped on every rule this tool creates.
pub const DEFAULT_GROUP: &str = "PS-SetProgramRule";

/// Extensions treated as executable when none are given.
pub const DEFAULT_EXTENSIONS: &[&str] = &["exe"];

/// Upper bound for a single rule store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Pseudo extension selecting Unix permission bits instead of a file suffix.
pub const EXEC_BIT: &str = "+x";

/// Which rules `unblock` is allowed to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnblockScope {
    /// Only rules carrying the owner group tag.
    #[default]
    Owned,
    /// Every rule keyed by the program path, whatever created it.
    AnyGroup,
}

pub struct Config {
    /// Owner tag used to scope purge, list and (by default) unblock.
    pub group: String,

    /// Lower-cased extensions without the leading dot, or [`EXEC_BIT`].
    pub extensions: Vec<String>,

    /// Per-call deadline for the rule store.
    ///
    /// Calls exceeding it are abandoned and reported as failed outcomes.
    pub store_timeout: Duration,

    pub unblock_scope: UnblockScope,

    pub quiet: u8,
    pub verbose: bool,
    pub no_banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            unblock_scope: UnblockScope::Owned,
            quiet: 0,
            verbose: false,
            no_banner: false,
        }
    }
}

impl Config {
    /// Replaces the extension filter, normalising case and stripping dots.
    ///
    /// An empty list keeps the defaults.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();

        if !normalized.is_empty() {
            self.extensions = normalized;
        }
        self
    }
}

pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim();
    if trimmed == EXEC_BIT {
        return trimmed.to_string();
    }
    trimmed.trim_start_matches('.').to_ascii_lowercase()
}
