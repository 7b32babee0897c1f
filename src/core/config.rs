//! Configuration loading and option resolution
//!
//! Configuration comes from INI files layered on top of an embedded default
//! file. For one command invocation the layers are flattened into a single
//! immutable [`EffectiveOptions`], with this precedence (highest first):
//!
//! 1. options given on the command line
//! 2. the command's section, walking dotted templates (`[ls.mine]`, `[ls]`)
//! 3. the `[default]` section
//! 4. the hard-coded default of each option

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use config::{FileFormat, Format};
use directories::BaseDirs;
use miette::Diagnostic;
use rust_embed::Embed;
use thiserror::Error;

use crate::core::entity::DEFAULT_TYPES;

#[derive(Embed)]
#[folder = "defaults/"]
struct EmbeddedDefaults;

/// Name of the embedded default file
const DEFAULTS_FILE: &str = "tp.conf";

/// Section every command falls back to
pub const DEFAULT_SECTION: &str = "default";

/// Commands that resolve options even without a section of their own
pub const KNOWN_COMMANDS: &[&str] = &["ls", "show"];

/// System-wide configuration files, read in this order
const SYSTEM_FILES: &[&str] = &[
    "/etc/tp.conf",
    "/etc/tp/tp.conf",
    "/usr/local/etc/tp.conf",
    "/usr/local/etc/tp/tp.conf",
];

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {message}")]
    #[diagnostic(code(tp::config::read))]
    Read { path: String, message: String },

    #[error("Invalid config file {path}: {message}")]
    #[diagnostic(code(tp::config::parse))]
    Parse { path: String, message: String },

    #[error("Option '{option}' from {origin} must be {expected}, got '{value}'")]
    #[diagnostic(code(tp::config::coercion))]
    Coercion {
        option: String,
        value: String,
        expected: &'static str,
        origin: Origin,
    },

    #[error("{fields} field template(s) configured but {headers} header(s)")]
    #[diagnostic(
        code(tp::config::fields_headers),
        help("`fields` and `headers` are comma-separated lists and must have the same length")
    )]
    FieldHeaderMismatch { fields: usize, headers: usize },

    #[error("Unknown command section [{0}]")]
    #[diagnostic(code(tp::config::unknown_section))]
    UnknownSection(String),

    #[error("Unknown option '{0}'")]
    #[diagnostic(code(tp::config::unknown_option), help("run `tp config` to list options"))]
    UnknownOption(String),

    #[error("Invalid option override '{0}'")]
    #[diagnostic(code(tp::config::invalid_override), help("use --set <option>=<value>"))]
    InvalidOverride(String),

    #[error("More than one template in the filter: {0}")]
    #[diagnostic(code(tp::config::templates))]
    MultipleTemplates(String),

    #[error("More than one number in the filter: {0}")]
    #[diagnostic(
        code(tp::config::numbers),
        help("a bare number sets how many entities to list; give at most one")
    )]
    MultipleNumbers(String),

    #[error("Unknown table style '{0}'")]
    #[diagnostic(
        code(tp::config::table),
        help("available styles: tp_table, plain, simple, pipe")
    )]
    UnknownTableStyle(String),

    #[error("Missing [auth] {0}")]
    #[diagnostic(
        code(tp::config::auth),
        help("set it in the [auth] section of ~/.config/tp/tp.conf")
    )]
    MissingAuth(&'static str),

    #[error("Cannot prompt for [auth] {field}: {message}")]
    #[diagnostic(code(tp::config::prompt))]
    Prompt { field: &'static str, message: String },
}

// =========================================================================
// Option declarations
// =========================================================================

/// Declared type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Str,
    Int,
    Bool,
    List,
}

impl OptionKind {
    fn expected(&self) -> &'static str {
        match self {
            OptionKind::Str => "a string",
            OptionKind::Int => "a non-negative integer",
            OptionKind::Bool => "a boolean (yes/no, true/false, on/off, 1/0)",
            OptionKind::List => "a comma-separated list",
        }
    }
}

/// A recognized option with its hard-coded default
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionKind,
    pub default: &'static str,
}

/// All options that commands can resolve
pub const OPTIONS: &[OptionSpec] = &[
    OptionSpec { name: "date", kind: OptionKind::Str, default: "%Y-%m-%d %H:%M:%S" },
    OptionSpec { name: "indent", kind: OptionKind::Int, default: "4" },
    OptionSpec { name: "pager", kind: OptionKind::Bool, default: "false" },
    OptionSpec {
        name: "types",
        kind: OptionKind::List,
        default: "Bug, Epic, Feature, Request, Task, TestPlan, TestPlanRun, UserStory, Impediment",
    },
    OptionSpec { name: "entities", kind: OptionKind::List, default: "Bug, Task, UserStory" },
    OptionSpec {
        name: "fields",
        kind: OptionKind::List,
        default: "{Id}, {EntityType.Name}, {Name}, {EntityState.Name}",
    },
    OptionSpec { name: "headers", kind: OptionKind::List, default: "Id, Type, Name, State" },
    OptionSpec { name: "number", kind: OptionKind::Int, default: "25" },
    OptionSpec { name: "offset", kind: OptionKind::Int, default: "0" },
    OptionSpec { name: "sort", kind: OptionKind::Str, default: "Id" },
    OptionSpec { name: "reverse", kind: OptionKind::Bool, default: "false" },
    OptionSpec { name: "table", kind: OptionKind::Str, default: "tp_table" },
    OptionSpec { name: "filter", kind: OptionKind::List, default: "" },
    OptionSpec { name: "comments", kind: OptionKind::Bool, default: "false" },
];

/// Find the declaration of an option
pub fn option_spec(name: &str) -> Option<&'static OptionSpec> {
    OPTIONS.iter().find(|spec| spec.name == name)
}

/// Parse an INI-style boolean
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Split a comma-separated list, trimming items and dropping empty ones
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

// =========================================================================
// Layered files
// =========================================================================

/// Sections read from all configuration files, merged key by key
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    sections: BTreeMap<String, BTreeMap<String, String>>,
    files: Vec<PathBuf>,
}

impl FileConfig {
    /// Only the embedded defaults
    pub fn builtin() -> Result<Self, ConfigError> {
        let file = EmbeddedDefaults::get(DEFAULTS_FILE).ok_or_else(|| ConfigError::Read {
            path: DEFAULTS_FILE.to_string(),
            message: "embedded defaults missing".to_string(),
        })?;
        let text = String::from_utf8_lossy(&file.data);
        Self::from_ini(&text, "<built-in defaults>")
    }

    /// Embedded defaults, then system files, then user files, then `explicit`
    ///
    /// Missing system and user files are skipped. A missing `explicit` file
    /// is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::builtin()?;

        let candidates = SYSTEM_FILES
            .iter()
            .map(PathBuf::from)
            .chain(user_config_paths());

        for path in candidates {
            if path.is_file() {
                config.merge(Self::from_file(&path)?);
            }
        }

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    message: "file not found".to_string(),
                });
            }
            config.merge(Self::from_file(path)?);
        }

        tracing::debug!(files = ?config.files, "loaded configuration");
        Ok(config)
    }

    /// Parse one INI file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut config = Self::from_ini(&text, &path.display().to_string())?;
        config.files.push(path.to_path_buf());
        Ok(config)
    }

    /// Parse INI text; keys outside any section belong to `[default]`
    pub fn from_ini(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let parse_error = |message: String| ConfigError::Parse {
            path: origin.to_string(),
            message,
        };

        // the INI parser unescapes backslashes; values are taken literally
        let text = text.replace('\\', "\\\\");
        let uri = origin.to_string();
        let parsed = FileFormat::Ini
            .parse(Some(&uri), &text)
            .map_err(|e| parse_error(e.to_string()))?;

        let mut config = Self::default();
        for (name, value) in parsed {
            match value.clone().into_table() {
                Ok(table) => {
                    let section = config.sections.entry(name.to_lowercase()).or_default();
                    for (key, value) in table {
                        let value = value.into_string().map_err(|e| parse_error(e.to_string()))?;
                        section.insert(key.to_lowercase(), value.trim().to_string());
                    }
                }
                Err(_) => {
                    let value = value.into_string().map_err(|e| parse_error(e.to_string()))?;
                    config
                        .sections
                        .entry(DEFAULT_SECTION.to_string())
                        .or_default()
                        .insert(name.to_lowercase(), value.trim().to_string());
                }
            }
        }

        Ok(config)
    }

    /// Overlay `other` on top of this configuration
    pub fn merge(&mut self, other: FileConfig) {
        for (name, entries) in other.sections {
            self.sections.entry(name).or_default().extend(entries);
        }
        self.files.extend(other.files);
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_lowercase())
            .and_then(|entries| entries.get(&key.to_lowercase()))
            .map(String::as_str)
    }

    /// Like [`get`](Self::get) but treats empty values as unset
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|value| !value.is_empty())
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&section.to_lowercase())
    }

    /// Template names defined for `command`, e.g. `mine` for `[ls.mine]`
    pub fn templates(&self, command: &str) -> Vec<String> {
        let prefix = format!("{}.", command.to_lowercase());
        self.sections
            .keys()
            .filter_map(|name| name.strip_prefix(&prefix))
            .map(str::to_string)
            .collect()
    }

    /// Files that were read, in merge order (embedded defaults excluded)
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// Per-user configuration files, read in this order
fn user_config_paths() -> Vec<PathBuf> {
    let Some(dirs) = BaseDirs::new() else {
        return Vec::new();
    };
    let home = dirs.home_dir();
    vec![
        dirs.config_dir().join("tp").join("tp.conf"),
        dirs.config_dir().join("tp.conf"),
        home.join(".tp.conf"),
        home.join(".tp").join("tp.conf"),
    ]
}

/// Replace a leading `~` with the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest.trim_start_matches(['/', '\\']));
        }
    }
    PathBuf::from(path)
}

// =========================================================================
// Command-line overrides
// =========================================================================

/// Option values given for this invocation only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    values: BTreeMap<String, String>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any earlier value
    pub fn set(mut self, option: &str, value: impl Into<String>) -> Self {
        self.values.insert(option.to_lowercase(), value.into());
        self
    }

    /// Set an option if a value was given
    pub fn set_opt<T: ToString>(self, option: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(option, value.to_string()),
            None => self,
        }
    }

    /// Apply `option=value` assignments from `--set`
    pub fn assignments<S: AsRef<str>>(mut self, assignments: &[S]) -> Result<Self, ConfigError> {
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (option, value) = assignment
                .split_once('=')
                .filter(|(option, _)| !option.trim().is_empty())
                .ok_or_else(|| ConfigError::InvalidOverride(assignment.to_string()))?;
            self = self.set(option.trim(), value.trim());
        }
        Ok(self)
    }

    pub fn get(&self, option: &str) -> Option<&str> {
        self.values.get(option).map(String::as_str)
    }

    fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }
}

// =========================================================================
// Effective options
// =========================================================================

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    CommandLine,
    Section(String),
    BuiltIn,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::CommandLine => write!(f, "the command line"),
            Origin::Section(name) => write!(f, "[{}]", name),
            Origin::BuiltIn => write!(f, "built-in default"),
        }
    }
}

/// A raw option value and its origin, kept for `tp config`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOption {
    pub name: &'static str,
    pub raw: String,
    pub origin: Origin,
}

/// Fully merged, type-checked options for one command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveOptions {
    /// Section the options were resolved for, e.g. `ls` or `ls.mine`
    pub command: String,
    pub date: String,
    pub indent: usize,
    pub pager: bool,
    pub types: Vec<String>,
    pub entities: Vec<String>,
    pub fields: Vec<String>,
    pub headers: Vec<String>,
    pub number: u32,
    pub offset: u32,
    pub sort: String,
    pub reverse: bool,
    pub table: String,
    pub filter: Vec<String>,
    pub comments: bool,
    resolved: Vec<ResolvedOption>,
}

impl EffectiveOptions {
    /// Resolve every declared option for `command`
    pub fn resolve(
        command: &str,
        overrides: &Overrides,
        files: &FileConfig,
    ) -> Result<Self, ConfigError> {
        let command = command.to_lowercase();
        let root = command.split('.').next().unwrap_or_default();
        let known = KNOWN_COMMANDS.contains(&root) && !command.contains('.');
        if !known && !files.has_section(&command) {
            return Err(ConfigError::UnknownSection(command));
        }

        if let Some(unknown) = overrides.keys().find(|key| option_spec(key).is_none()) {
            return Err(ConfigError::UnknownOption(unknown.clone()));
        }

        let chain = section_chain(&command);
        let mut values = RawValues::default();
        for spec in OPTIONS {
            let (raw, origin) = lookup_raw(spec, overrides, files, &chain);
            values.resolved.push(ResolvedOption {
                name: spec.name,
                raw,
                origin,
            });
        }

        let options = Self {
            date: values.string("date")?,
            indent: values.int("indent")? as usize,
            pager: values.boolean("pager")?,
            types: values.list("types")?,
            entities: values.list("entities")?,
            fields: values.list("fields")?,
            headers: values.list("headers")?,
            number: values.int("number")?,
            offset: values.int("offset")?,
            sort: values.string("sort")?,
            reverse: values.boolean("reverse")?,
            table: values.string("table")?,
            filter: values.list("filter")?,
            comments: values.boolean("comments")?,
            resolved: values.resolved,
            command,
        };

        if options.fields.len() != options.headers.len() {
            return Err(ConfigError::FieldHeaderMismatch {
                fields: options.fields.len(),
                headers: options.headers.len(),
            });
        }

        tracing::debug!(command = %options.command, "resolved options");
        Ok(options)
    }

    /// Raw values and origins in declaration order
    pub fn resolved(&self) -> &[ResolvedOption] {
        &self.resolved
    }

    /// Known entity type names, never empty
    pub fn known_types(&self) -> Vec<String> {
        if self.types.is_empty() {
            DEFAULT_TYPES.iter().map(|t| t.to_string()).collect()
        } else {
            self.types.clone()
        }
    }
}

/// Sections consulted for `command`, most specific first
fn section_chain(command: &str) -> Vec<String> {
    let parts: Vec<&str> = command.split('.').collect();
    let mut chain: Vec<String> = (1..=parts.len())
        .rev()
        .map(|n| parts[..n].join("."))
        .collect();
    chain.push(DEFAULT_SECTION.to_string());
    chain
}

fn lookup_raw(
    spec: &OptionSpec,
    overrides: &Overrides,
    files: &FileConfig,
    chain: &[String],
) -> (String, Origin) {
    if let Some(value) = overrides.get(spec.name) {
        return (value.to_string(), Origin::CommandLine);
    }
    for section in chain {
        if let Some(value) = files.get(section, spec.name) {
            return (value.to_string(), Origin::Section(section.clone()));
        }
    }
    (spec.default.to_string(), Origin::BuiltIn)
}

/// Raw values being coerced into their declared types
#[derive(Default)]
struct RawValues {
    resolved: Vec<ResolvedOption>,
}

impl RawValues {
    fn get(&self, name: &str) -> Result<&ResolvedOption, ConfigError> {
        self.resolved
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))
    }

    fn error(option: &ResolvedOption, kind: OptionKind) -> ConfigError {
        ConfigError::Coercion {
            option: option.name.to_string(),
            value: option.raw.clone(),
            expected: kind.expected(),
            origin: option.origin.clone(),
        }
    }

    fn string(&self, name: &str) -> Result<String, ConfigError> {
        Ok(self.get(name)?.raw.clone())
    }

    fn int(&self, name: &str) -> Result<u32, ConfigError> {
        let option = self.get(name)?;
        option
            .raw
            .trim()
            .parse()
            .map_err(|_| Self::error(option, OptionKind::Int))
    }

    fn boolean(&self, name: &str) -> Result<bool, ConfigError> {
        let option = self.get(name)?;
        parse_bool(&option.raw).ok_or_else(|| Self::error(option, OptionKind::Bool))
    }

    fn list(&self, name: &str) -> Result<Vec<String>, ConfigError> {
        Ok(parse_list(&self.get(name)?.raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(ini: &str) -> FileConfig {
        let mut config = FileConfig::builtin().unwrap();
        config.merge(FileConfig::from_ini(ini, "test.conf").unwrap());
        config
    }

    #[test]
    fn test_builtin_defaults() {
        let options = EffectiveOptions::resolve("ls", &Overrides::new(), &files("")).unwrap();

        assert_eq!(options.number, 25);
        assert_eq!(options.offset, 0);
        assert_eq!(options.sort, "Id");
        assert!(!options.reverse);
        assert_eq!(options.entities, vec!["Bug", "Task", "UserStory"]);
        assert_eq!(options.fields.len(), options.headers.len());
        assert_eq!(options.table, "tp_table");
    }

    #[test]
    fn test_precedence() {
        let config = files(
            "[default]\nnumber = 10\nsort = Name\nindent = 2\n\
             [ls]\nnumber = 15\n\
             [ls.mine]\nnumber = 5\n",
        );

        let ls = EffectiveOptions::resolve("ls", &Overrides::new(), &config).unwrap();
        assert_eq!(ls.number, 15);
        assert_eq!(ls.sort, "Name");
        assert_eq!(ls.indent, 2);

        let mine = EffectiveOptions::resolve("ls.mine", &Overrides::new(), &config).unwrap();
        assert_eq!(mine.number, 5);
        assert_eq!(mine.sort, "Name");

        let cli = Overrides::new().set("number", "3");
        let mine = EffectiveOptions::resolve("ls.mine", &cli, &config).unwrap();
        assert_eq!(mine.number, 3);

        // [show] has no number; falls through [default]
        let show = EffectiveOptions::resolve("show", &Overrides::new(), &config).unwrap();
        assert_eq!(show.number, 10);
    }

    #[test]
    fn test_origins() {
        let config = files("[ls]\nsort = Name\n");
        let cli = Overrides::new().set("reverse", "yes");
        let options = EffectiveOptions::resolve("ls", &cli, &config).unwrap();

        let origin = |name: &str| {
            options
                .resolved()
                .iter()
                .find(|r| r.name == name)
                .map(|r| r.origin.clone())
                .unwrap()
        };
        assert_eq!(origin("sort"), Origin::Section("ls".to_string()));
        assert_eq!(origin("reverse"), Origin::CommandLine);
        assert_eq!(origin("filter"), Origin::BuiltIn);
        assert!(options.reverse);
    }

    #[test]
    fn test_coercion_failures() {
        for ini in [
            "[ls]\nnumber = lots\n",
            "[ls]\noffset = -1\n",
            "[ls]\nreverse = maybe\n",
            "[default]\nindent = 2.5\n",
        ] {
            let result = EffectiveOptions::resolve("ls", &Overrides::new(), &files(ini));
            assert!(
                matches!(result, Err(ConfigError::Coercion { .. })),
                "config {:?} gave {:?}",
                ini,
                result
            );
        }
    }

    #[test]
    fn test_coercion_error_names_origin() {
        let err = EffectiveOptions::resolve(
            "ls",
            &Overrides::new().set("number", "x"),
            &files(""),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Option 'number' from the command line must be a non-negative integer, got 'x'"
        );
    }

    #[test]
    fn test_fields_headers_mismatch() {
        let config = files("[ls]\nfields = {Id}, {Name}\nheaders = Id\n");
        let result = EffectiveOptions::resolve("ls", &Overrides::new(), &config);

        assert!(matches!(
            result,
            Err(ConfigError::FieldHeaderMismatch { fields: 2, headers: 1 })
        ));
    }

    #[test]
    fn test_unknown_section_and_option() {
        let config = files("[ls.mine]\nnumber = 1\n");

        assert!(matches!(
            EffectiveOptions::resolve("ls.theirs", &Overrides::new(), &config),
            Err(ConfigError::UnknownSection(_))
        ));
        assert!(matches!(
            EffectiveOptions::resolve("frobnicate", &Overrides::new(), &config),
            Err(ConfigError::UnknownSection(_))
        ));
        assert!(matches!(
            EffectiveOptions::resolve("ls", &Overrides::new().set("colour", "red"), &config),
            Err(ConfigError::UnknownOption(_))
        ));
    }

    #[test]
    fn test_assignments() {
        let overrides = Overrides::new()
            .assignments(&["number=3", " sort = Name "])
            .unwrap();
        assert_eq!(overrides.get("number"), Some("3"));
        assert_eq!(overrides.get("sort"), Some("Name"));

        assert!(Overrides::new().assignments(&["number"]).is_err());
        assert!(Overrides::new().assignments(&["=3"]).is_err());
    }

    #[test]
    fn test_templates_and_case() {
        let config = files("[LS.Mine]\nNumber = 2\n[ls.team.open]\nsort = Name\n");

        let mut templates = config.templates("ls");
        templates.sort();
        assert_eq!(templates, vec!["mine", "team.open"]);
        assert_eq!(config.get("ls.mine", "number"), Some("2"));
    }

    #[test]
    fn test_merge_overrides_keys_not_sections() {
        let mut config = FileConfig::from_ini("[ls]\nnumber = 1\nsort = Name\n", "a").unwrap();
        config.merge(FileConfig::from_ini("[ls]\nnumber = 2\n", "b").unwrap());

        assert_eq!(config.get("ls", "number"), Some("2"));
        assert_eq!(config.get("ls", "sort"), Some("Name"));
    }

    #[test]
    fn test_backslashes_are_literal() {
        let config = FileConfig::from_ini(
            "[app]\nlog_file = C:\\Users\\ada\\tp.log\n[ls.mine]\nfilter = name:C:\\tmp\\x\n",
            "test.conf",
        )
        .unwrap();

        assert_eq!(config.get("app", "log_file"), Some("C:\\Users\\ada\\tp.log"));
        assert_eq!(config.get("ls.mine", "filter"), Some("name:C:\\tmp\\x"));
    }

    #[test]
    fn test_empty_values() {
        let config = files("[auth]\nsubdomain =\n");
        assert_eq!(config.get("auth", "subdomain"), Some(""));
        assert_eq!(config.get_non_empty("auth", "subdomain"), None);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("2"), None);
        assert_eq!(parse_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_section_chain() {
        assert_eq!(section_chain("ls.team.open"), vec!["ls.team.open", "ls.team", "ls", "default"]);
        assert_eq!(section_chain("show"), vec!["show", "default"]);
    }
}
