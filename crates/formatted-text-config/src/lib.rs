use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use formatted_text_engine::{BlockType, FormatType, ModelError};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// How a block type is rendered: the element tag and an optional class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStyle {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl BlockStyle {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            class: None,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }
}

/// Lookup table from block types and formats to the markup that renders
/// them.
///
/// Every type always has an entry: the built-in defaults are overridden by
/// whatever a config file provides.
///
/// ```toml
/// [styles.blocks.HEADING1]
/// tag = "h1"
/// class = "title"
///
/// [styles.formats]
/// BOLD = "b"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StyleEntries", into = "StyleEntries")]
pub struct StyleTable {
    blocks: BTreeMap<BlockType, BlockStyle>,
    formats: BTreeMap<FormatType, String>,
}

impl Default for StyleTable {
    fn default() -> Self {
        let blocks = BlockType::ALL
            .into_iter()
            .map(|kind| {
                let style = match kind {
                    BlockType::Paragraph => BlockStyle::new("p"),
                    BlockType::Heading1 => BlockStyle::new("h1"),
                    BlockType::Heading2 => BlockStyle::new("h2"),
                    BlockType::Heading3 => BlockStyle::new("h3"),
                    BlockType::NumberedList => BlockStyle::new("li"),
                    BlockType::Equation => BlockStyle::new("div").with_class("equation"),
                    BlockType::Diagram => BlockStyle::new("figure").with_class("diagram"),
                };
                (kind, style)
            })
            .collect();
        let formats = FormatType::ALL
            .into_iter()
            .map(|flag| {
                let tag = match flag {
                    FormatType::Bold => "strong",
                    FormatType::Underline => "u",
                    FormatType::Italic => "em",
                    FormatType::Strike => "s",
                    FormatType::Superscript => "sup",
                    FormatType::Subscript => "sub",
                    FormatType::Code => "code",
                    FormatType::Highlight => "mark",
                };
                (flag, tag.to_string())
            })
            .collect();
        Self { blocks, formats }
    }
}

impl StyleTable {
    pub fn block(&self, kind: BlockType) -> &BlockStyle {
        &self.blocks[&kind]
    }

    pub fn format_tag(&self, flag: FormatType) -> &str {
        &self.formats[&flag]
    }

    pub fn set_block(&mut self, kind: BlockType, style: BlockStyle) {
        self.blocks.insert(kind, style);
    }

    pub fn set_format_tag(&mut self, flag: FormatType, tag: &str) {
        self.formats.insert(flag, tag.to_string());
    }
}

/// File representation of a [`StyleTable`], keyed by wire names.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StyleEntries {
    #[serde(default)]
    blocks: BTreeMap<String, BlockStyle>,
    #[serde(default)]
    formats: BTreeMap<String, String>,
}

impl TryFrom<StyleEntries> for StyleTable {
    type Error = ModelError;

    fn try_from(entries: StyleEntries) -> Result<Self, Self::Error> {
        let mut table = StyleTable::default();
        for (name, style) in entries.blocks {
            table.set_block(name.parse()?, style);
        }
        for (name, tag) in entries.formats {
            table.set_format_tag(name.parse()?, &tag);
        }
        Ok(table)
    }
}

impl From<StyleTable> for StyleEntries {
    fn from(table: StyleTable) -> Self {
        Self {
            blocks: table
                .blocks
                .into_iter()
                .map(|(kind, style)| (kind.name().to_string(), style))
                .collect(),
            formats: table
                .formats
                .into_iter()
                .map(|(flag, tag)| (flag.name().to_string(), tag))
                .collect(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Stylesheet linked from rendered output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<PathBuf>,
    #[serde(default)]
    pub styles: StyleTable,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            debug!("no config at {}", config_path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the stylesheet path
        config.stylesheet = config
            .stylesheet
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/formatted-text");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
