// Configuration management for netstate-diff
// Supports CLI arguments (with environment variable fallbacks) and a
// templated config file (YAML, or TOML by extension)

use clap::{Parser, ValueEnum};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::Level;

use crate::error::{AppError, AppResult};

/// Cross-check control-plane state tables between two environments
#[derive(Parser, Debug, Clone)]
#[command(name = "netstate-diff")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the config template
    #[arg(short, long, env = "NSD_CONFIG")]
    pub config: Option<PathBuf>,

    /// State table to compare
    #[arg(short, long, value_enum, env = "NSD_TABLE")]
    pub table: TableKind,

    /// Target network
    #[arg(short, long, env = "NSD_NETWORK")]
    pub network: String,

    /// Target node (case-insensitive); all nodes when omitted
    #[arg(short = 'd', long, env = "NSD_NODE")]
    pub node: Option<String>,

    /// Source environment
    #[arg(long, value_enum, env = "NSD_SRC_ENV")]
    pub src_env: EnvType,

    /// Source snapshot name
    #[arg(long, env = "NSD_SRC_SNAPSHOT")]
    pub src_snapshot: String,

    /// Destination environment
    #[arg(long, value_enum, env = "NSD_DST_ENV")]
    pub dst_env: EnvType,

    /// Destination snapshot name
    #[arg(long, env = "NSD_DST_SNAPSHOT")]
    pub dst_snapshot: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml", env = "NSD_OUTPUT")]
    pub output: OutputFormat,

    /// Print both tables instead of the diff
    #[arg(long, env = "NSD_DEBUG")]
    pub debug: bool,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "warn", env = "NSD_LOG_LEVEL")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableKind {
    #[value(name = "route")]
    Route,
    #[value(name = "ospf_neighbor")]
    OspfNeighbor,
}

/// Kind of environment a state snapshot was captured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvType {
    /// Simulation engine
    Batfish,
    /// Physical devices
    Original,
    /// Emulated routers
    Emulated,
}

impl EnvType {
    /// Section name of this environment in the config file
    pub fn section(self) -> &'static str {
        match self {
            EnvType::Batfish => "batfish",
            EnvType::Original => "original",
            EnvType::Emulated => "emulated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// One entry of `original_node_params`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeParam {
    pub name: String,

    /// Device family, e.g. "juniper", "cisco", "arista"
    #[serde(rename = "type", default)]
    pub node_type: String,

    /// Whether the node speaks OSPF
    #[serde(default = "default_true")]
    pub ospf: bool,

    /// Any other keys, passed through to the report
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Per-environment file layout
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvConfig {
    #[serde(rename = "type")]
    pub env_type: EnvType,

    pub state_dir: String,

    #[serde(default)]
    pub routes_dir: String,

    /// Suffix appended to the node name
    pub routes_file: String,

    #[serde(default)]
    pub ospf_neighbors_dir: String,

    /// Suffix appended to the node name
    pub ospf_neighbors_file: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

const DEFAULT_CONFIG_PATHS: [&str; 2] = ["config.tmpl.yaml", "netstate-diff.toml"];

impl NodeParam {
    pub fn is_juniper(&self) -> bool {
        self.node_type.eq_ignore_ascii_case("juniper")
    }
}

impl EnvConfig {
    /// Node names keep their case only on physical devices
    pub fn node_file_stem(&self, node: &NodeParam) -> String {
        match self.env_type {
            EnvType::Original => node.name.clone(),
            EnvType::Batfish | EnvType::Emulated => node.name.to_lowercase(),
        }
    }

    pub fn routes_path(&self, node: &NodeParam) -> PathBuf {
        expand_home(&self.state_dir)
            .join(&self.routes_dir)
            .join(format!("{}{}", self.node_file_stem(node), self.routes_file))
    }

    pub fn ospf_neighbors_path(&self, node: &NodeParam) -> PathBuf {
        expand_home(&self.state_dir)
            .join(&self.ospf_neighbors_dir)
            .join(format!("{}{}", self.node_file_stem(node), self.ospf_neighbors_file))
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("static regex"));

/// Jinja blocks and filtered placeholders, which `render_template` cannot expand
static UNSUPPORTED_TEMPLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%.*?%\}|\{\{[^}]*\|[^}]*\}\}").expect("static regex"));

/// Substitute `{{ network_name }}` and `{{ snapshot_name }}`; other
/// placeholders are left untouched. Only bare `{{ name }}` placeholders are
/// rendered: `{% ... %}` blocks and `{{ name | filter }}` are not, and
/// `ConfigTemplate::render` rejects them.
pub fn render_template(template: &str, network: &str, snapshot: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "network_name" => network.to_string(),
            "snapshot_name" => snapshot.to_string(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// A rendered and parsed config file
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: serde_yaml::Value,
}

impl ConfigDocument {
    pub fn parse(text: &str, is_toml: bool) -> AppResult<Self> {
        let root = if is_toml {
            toml::from_str::<serde_yaml::Value>(text)?
        } else {
            serde_yaml::from_str::<serde_yaml::Value>(text)?
        };
        Ok(ConfigDocument { root })
    }

    fn section(&self, key: &str) -> AppResult<serde_yaml::Value> {
        self.root
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::Config(format!("section `{}` is not found", key)))
    }

    pub fn node_params(&self) -> AppResult<Vec<NodeParam>> {
        Ok(serde_yaml::from_value(self.section("original_node_params")?)?)
    }

    pub fn environment(&self, env: EnvType) -> AppResult<EnvConfig> {
        let config: EnvConfig = serde_yaml::from_value(self.section(env.section())?)?;
        if config.env_type != env {
            tracing::warn!(
                "section `{}` declares type {:?}, which decides the file layout",
                env.section(),
                config.env_type
            );
        }
        Ok(config)
    }
}

/// Template source for the config file
#[derive(Debug, Clone)]
pub struct ConfigTemplate {
    path: PathBuf,
    text: String,
}

impl ConfigTemplate {
    pub fn read(path: &Path) -> AppResult<Self> {
        tracing::info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| AppError::read(path, e))?;
        Ok(ConfigTemplate {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Find the template: the given path, or the first default location that exists
    pub fn locate(path: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = path {
            return Self::read(&expand_home(&path.to_string_lossy()));
        }
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .map(|p| Self::read(&p))
            .unwrap_or_else(|| {
                Err(AppError::Config(format!(
                    "config file not found (tried {})",
                    DEFAULT_CONFIG_PATHS.join(", ")
                )))
            })
    }

    fn is_toml(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "toml")
    }

    pub fn render(&self, network: &str, snapshot: &str) -> AppResult<ConfigDocument> {
        if let Some(found) = UNSUPPORTED_TEMPLATE_RE.find(&self.text) {
            return Err(AppError::Config(format!(
                "{}: unsupported template construct `{}`",
                self.path.display(),
                found.as_str()
            )));
        }
        ConfigDocument::parse(&render_template(&self.text, network, snapshot), self.is_toml())
    }
}

/// Selected environment with its snapshot
#[derive(Debug, Clone)]
pub struct Environment {
    pub env_type: EnvType,
    pub snapshot: String,
    pub config: EnvConfig,
}

/// Merged configuration from CLI args and the config file
#[derive(Debug, Clone)]
pub struct Config {
    pub table: TableKind,
    pub network: String,
    pub node: Option<String>,
    pub debug: bool,
    pub output: OutputFormat,
    pub node_params: Vec<NodeParam>,
    pub src: Environment,
    pub dst: Environment,
}

impl Config {
    /// The template is rendered once per snapshot; node params come from the
    /// source rendering
    pub fn from_args(args: CliArgs) -> AppResult<Self> {
        let template = ConfigTemplate::locate(args.config.as_deref())?;

        let src_doc = template.render(&args.network, &args.src_snapshot)?;
        let dst_doc = template.render(&args.network, &args.dst_snapshot)?;

        let node_params = src_doc.node_params()?;
        let src = Environment {
            env_type: args.src_env,
            snapshot: args.src_snapshot,
            config: src_doc.environment(args.src_env)?,
        };
        let dst = Environment {
            env_type: args.dst_env,
            snapshot: args.dst_snapshot,
            config: dst_doc.environment(args.dst_env)?,
        };

        tracing::debug!("src_config: {:?}", src);
        tracing::debug!("dst_config: {:?}", dst);
        tracing::debug!("original_node_params: {:?}", node_params);

        Ok(Config {
            table: args.table,
            network: args.network,
            node: args.node,
            debug: args.debug,
            output: args.output,
            node_params,
            src,
            dst,
        })
    }
}

pub fn parse_log_level(level_str: &str) -> anyhow::Result<Level> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        _ => Err(anyhow::anyhow!("Invalid log level: {}", level_str)),
    }
}
