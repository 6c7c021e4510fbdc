mod config;
mod page;

use std::env;
use std::fs::{read_to_string, write};
use std::io;
use std::path::{Path, PathBuf};

use bough_resource::ResourceSet;
use bough_tree::{FormData, NodeKey, StateSnapshot, TreeError, WidgetTree};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use thiserror::Error;
use tracing::{info, warn};

pub use crate::config::{Config, ConfigError};
pub use crate::page::{Page, PageError};

#[derive(Parser, Debug)]
#[command(name = "bough", version, about = "Bough CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Cmd,

    #[arg(long = "config", env = "BOUGH_CONFIG", global = true)]
    pub config_path: Option<PathBuf>,

    #[arg(long = "log", env = "BOUGH_LOG", global = true)]
    pub log: Option<String>,

    #[arg(long = "auto-id-prefix", env = "BOUGH_AUTO_ID_PREFIX", global = true)]
    pub auto_id_prefix: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    #[doc = " Run a page through init, process and display, and print the HTML"]
    Render {
        #[doc = " Page file (TOML)"]
        #[arg(long)]
        page: PathBuf,

        #[doc = " Submitted form values (JSON object)"]
        #[arg(long)]
        form: Option<PathBuf>,

        #[doc = " Widget state to restore (JSON object)"]
        #[arg(long)]
        state: Option<PathBuf>,

        #[doc = " Where to write the widget state after processing"]
        #[arg(long = "state-out")]
        state_out: Option<PathBuf>,

        #[arg(long)]
        title: Option<String>,
    },
    #[doc = " List the nodes of a page"]
    Inspect {
        #[arg(long)]
        page: PathBuf,
    },
    #[doc = " List the resources a page uses when displayed"]
    Resources {
        #[arg(long)]
        page: PathBuf,

        #[doc = " Include resources of hidden widgets"]
        #[arg(long)]
        all: bool,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse form data from {path}: {source}")]
    ParseForm {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse state from {path}: {source}")]
    ParseState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize state: {0}")]
    SerializeState(#[source] serde_json::Error),
}

pub fn get_config(cli: &Cli) -> Result<Config, AppError> {
    let config_path = cli
        .config_path
        .clone()
        .or_else(|| env::var("BOUGH_CONFIG").ok().map(PathBuf::from))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let config = Config::load(&config_path, cli)?;
    Ok(config)
}

pub fn run(cli: Cli, config: Config) -> Result<(), AppError> {
    match cli.command {
        Cmd::Render {
            page,
            form,
            state,
            state_out,
            title,
        } => cmd_render(config, page, form, state, state_out, title),
        Cmd::Inspect { page } => cmd_inspect(config, page),
        Cmd::Resources { page, all } => cmd_resources(config, page, all),
    }
}

fn cmd_render(
    config: Config,
    page_path: PathBuf,
    form_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
    state_out: Option<PathBuf>,
    title: Option<String>,
) -> Result<(), AppError> {
    let mut page = Page::load(&page_path, &config)?;
    page.tree.init(page.root)?;

    if let Some(path) = state_path {
        let json = read(&path)?;
        let snapshot = StateSnapshot::from_json(&json)
            .map_err(|source| AppError::ParseState { path, source })?;
        let restored = page.tree.restore_descendants(page.root, &snapshot)?;
        info!(restored, "restored state");
    }

    if let Some(path) = form_path {
        let json = read(&path)?;
        let data: FormData =
            serde_json::from_str(&json).map_err(|source| AppError::ParseForm { path, source })?;
        if page.submit(&data) == 0 {
            warn!("form data given, but the page has no form");
        }
    }

    page.tree.process(page.root)?;
    for (key, message) in page.tree.messages(page.root)? {
        info!(%key, "{message}");
    }

    let title = title
        .or_else(|| page.title.clone())
        .unwrap_or_else(|| config.title.clone());
    let html = page.render(&title)?;
    print!("{html}");

    if let Some(path) = state_out {
        let snapshot = page.tree.snapshot_descendants(page.root)?;
        let json = snapshot.to_json().map_err(AppError::SerializeState)?;
        write(&path, json).map_err(|source| AppError::Write { path, source })?;
    }
    Ok(())
}

fn cmd_inspect(config: Config, page_path: PathBuf) -> Result<(), AppError> {
    let mut page = Page::load(&page_path, &config)?;
    page.tree.init(page.root)?;

    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic)
        .set_header(vec!["key", "id", "kind", "parent", "visible", "resources"]);
    for row in node_rows(&page.tree, page.root)? {
        table.add_row(row);
    }

    println!("{table}");
    Ok(())
}

fn cmd_resources(config: Config, page_path: PathBuf, all: bool) -> Result<(), AppError> {
    let mut page = Page::load(&page_path, &config)?;
    page.tree.init(page.root)?;

    let resources = page_resources(&page, all)?;
    for resource in resources.iter() {
        println!("{resource}");
    }
    Ok(())
}

fn page_resources(page: &Page, all: bool) -> Result<ResourceSet, AppError> {
    if all {
        return Ok(page.tree.collect(page.root)?);
    }
    let mut sink = String::new();
    Ok(page.tree.display(page.root, &mut sink)?)
}

/// One row per node: the node itself, then its composites (marked with the
/// name they are registered under), then its children.
fn node_rows(tree: &WidgetTree, root: NodeKey) -> Result<Vec<Vec<String>>, TreeError> {
    let mut rows = Vec::new();
    push_rows(tree, root, 0, None, &mut rows)?;
    Ok(rows)
}

fn push_rows(
    tree: &WidgetTree,
    key: NodeKey,
    depth: usize,
    composite: Option<&str>,
    rows: &mut Vec<Vec<String>>,
) -> Result<(), TreeError> {
    let indent = "  ".repeat(depth);
    let kind = match composite {
        Some(name) => format!("{indent}{} ({name})", tree.kind(key)?),
        None => format!("{indent}{}", tree.kind(key)?),
    };
    rows.push(vec![
        key.to_string(),
        tree.id(key)?.unwrap_or("-").to_string(),
        kind,
        tree.parent(key)?
            .map(|parent| parent.to_string())
            .unwrap_or("-".into()),
        tree.is_visible(key)?.to_string(),
        tree.resources(key)?.len().to_string(),
    ]);

    for (name, composite) in tree.composites(key)? {
        push_rows(tree, composite, depth + 1, Some(name), rows)?;
    }
    for &child in tree.children(key)? {
        push_rows(tree, child, depth + 1, None, rows)?;
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, AppError> {
    read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bough_resource::Resource;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"
        [root]
        type = "form"
        id = "f"

        [[root.children]]
        type = "search-box"
        id = "q"

        [[root.children]]
        type = "frame"
        visible = false
        resources = [{ type = "script", value = "/hidden.js" }]
    "#;

    fn page() -> Page {
        let cli = Cli::parse_from(["bough", "inspect", "--page", "page.toml"]);
        let config = Config::from_toml(
            r#"stylesheets = ["/site.css"]"#,
            Path::new("bough.toml"),
            &cli,
        )
        .unwrap();
        let mut page = Page::from_toml(PAGE, Path::new("page.toml"), &config).unwrap();
        page.tree.init(page.root).unwrap();
        page
    }

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::parse_from([
            "bough",
            "render",
            "--page",
            "page.toml",
            "--form",
            "form.json",
            "--state-out",
            "state.json",
        ]);
        let Cmd::Render {
            page,
            form,
            state,
            state_out,
            title,
        } = cli.command
        else {
            panic!("expected render");
        };
        assert_eq!(page, PathBuf::from("page.toml"));
        assert_eq!(form, Some(PathBuf::from("form.json")));
        assert_eq!(state, None);
        assert_eq!(state_out, Some(PathBuf::from("state.json")));
        assert_eq!(title, None);
    }

    #[test]
    fn test_node_rows_include_composites() {
        let page = page();
        let rows = node_rows(&page.tree, page.root).unwrap();

        let kinds: Vec<&str> = rows.iter().map(|row| row[2].as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "form",
                "  search-box",
                "    entry (entry)",
                "    button (button)",
                "  frame",
            ]
        );
        assert_eq!(rows[2][1], "q_entry");
        assert_eq!(rows[4][4], "false");
    }

    #[test]
    fn test_page_resources_used_and_all() {
        let page = page();

        let used = page_resources(&page, false).unwrap();
        assert_eq!(
            used.iter().cloned().collect::<Vec<_>>(),
            vec![Resource::style_sheet("/site.css")]
        );

        let all = page_resources(&page, true).unwrap();
        assert!(all.contains(&Resource::script("/hidden.js")));
        assert_eq!(all.len(), 2);
    }
}
