mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use formatted_text_config::Config;
use formatted_text_engine::{BlockType, Document, io};
use log::{LevelFilter, debug, info};

#[derive(Parser)]
#[command(name = "ftext", version, about = "Inspect, render and edit formatted-text documents")]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print each block in debug notation
    Show {
        /// Document JSON file
        file: PathBuf,
    },

    /// Render the document as HTML
    Render {
        /// Document JSON file
        file: PathBuf,

        /// Config file to take styles from instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Apply one edit to a block and print the resulting document
    Edit {
        /// Document JSON file
        file: PathBuf,

        /// Index of the block to edit
        #[arg(short, long)]
        block: usize,

        /// Write the result back to the file instead of printing it
        #[arg(long)]
        in_place: bool,

        #[command(subcommand)]
        edit: Edit,
    },

    /// Print the length of each block
    Length {
        /// Document JSON file
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum Edit {
    /// Insert plain text at a block offset
    Insert {
        #[arg(allow_negative_numbers = true)]
        offset: isize,
        text: String,
    },
    /// Remove a range of the block
    Remove {
        #[arg(allow_negative_numbers = true)]
        offset: isize,
        #[arg(allow_negative_numbers = true)]
        len: isize,
    },
    /// Split the block in two at an offset
    Split {
        #[arg(allow_negative_numbers = true)]
        offset: isize,
    },
    /// Merge the following block into this one
    Merge,
    /// Change the block type (formatting is dropped unless the new type keeps it)
    Transform { kind: BlockType },
    /// Set the indent level
    Indent {
        #[arg(allow_negative_numbers = true)]
        level: isize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Show { file } => {
            let document = load(&file)?;
            for (i, block) in document.blocks().iter().enumerate() {
                println!("{i}: {} {block}", block.kind().name());
            }
        }
        Command::Render { file, config } => {
            let document = load(&file)?;
            let config = load_config(config.as_deref())?;
            let html =
                render::render_document(&document, &config.styles, config.stylesheet.as_deref())?;
            print!("{html}");
        }
        Command::Edit {
            file,
            block,
            in_place,
            edit,
        } => {
            let mut document = load(&file)?;
            apply_edit(&mut document, block, edit)?;
            if in_place {
                io::write_document(&file, &document)
                    .with_context(|| format!("Failed to write {}", file.display()))?;
                info!("updated {}", file.display());
            } else {
                println!("{}", io::document_to_json(&document)?);
            }
        }
        Command::Length { file } => {
            let document = load(&file)?;
            for (i, block) in document.blocks().iter().enumerate() {
                println!("{i}\t{}", block.length());
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load(file: &Path) -> Result<Document> {
    io::read_document(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let loaded = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {} does not exist", path.display());
            }
            Config::load_from_path(path)?
        }
        None => Config::load()?,
    };
    Ok(loaded.unwrap_or_else(|| {
        debug!("no config file, using default styles");
        Config::default()
    }))
}

fn apply_edit(document: &mut Document, index: usize, edit: Edit) -> Result<()> {
    let blocks = document.len();
    let Some(block) = document.block_mut(index) else {
        bail!("Block {index} does not exist, the document has {blocks} blocks");
    };
    debug!("applying {edit:?} to block {index}");

    match edit {
        Edit::Insert { offset, text } => {
            block.insert(offset, &text);
        }
        Edit::Remove { offset, len } => {
            block.remove(offset, len);
        }
        Edit::Split { offset } => {
            let right = block.split(offset);
            document.insert(index + 1, right);
        }
        Edit::Merge => {
            let Some(next) = document.blocks().get(index + 1).cloned() else {
                bail!("Block {index} is the last block, there is nothing to merge");
            };
            let kind = document.blocks()[index].kind();
            if next.kind() != kind {
                bail!(
                    "Cannot merge a {} block into a {} block",
                    next.kind().name(),
                    kind.name()
                );
            }
            if let Some(block) = document.block_mut(index) {
                block.merge(&next);
            }
            document.remove(index + 1);
        }
        Edit::Transform { kind } => {
            document.transform(index, kind);
        }
        Edit::Indent { level } => {
            block.set_indent(level);
        }
    }
    Ok(())
}
