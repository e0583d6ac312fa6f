use std::io::{self, BufRead};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::application::{
    ApplicationError, Charset, HierarchyReport, HierarchyView, RenderStyle, Rendered,
};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat, SourceArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{DomainError, ForestBuilder, NodeId, ToTermTree};
use crate::infrastructure::{
    demo_records, unwrap_field, DemoSource, FileSource, InfraError, RecordSource, StdinSource,
};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => _completion(*shell),
        Some(Commands::Demo) => _demo(),
        Some(Commands::Config { command }) => _config(cli.config.as_deref(), command),
        Some(Commands::Show {
            source,
            collapse,
            ascii,
            format,
            max_depth,
        }) => {
            let mut settings = load_settings(cli)?;
            if *ascii {
                settings.charset = Charset::Ascii;
            }
            if let Some(depth) = max_depth {
                settings.max_depth = *depth;
            }
            _show(&settings, source, collapse, *format)
        }
        Some(Commands::Browse { source, ascii }) => {
            let mut settings = load_settings(cli)?;
            if *ascii {
                settings.charset = Charset::Ascii;
            }
            _browse(&settings, source)
        }
        Some(Commands::Check { source }) => _check(&load_settings(cli)?, source),
        None => Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e).into()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = Settings::load(cli.config.as_deref())?;
    if !settings.color {
        colored::control::set_override(false);
    }
    debug!(?settings, "settings loaded");
    Ok(settings)
}

/// `-` reads stdin, no path falls back to the demo records.
fn open_source(path: Option<&Path>) -> Box<dyn RecordSource> {
    match path {
        None => Box::new(DemoSource),
        Some(p) if p == Path::new("-") => Box::new(StdinSource),
        Some(p) => Box::new(FileSource::new(p)),
    }
}

/// Wrapper field in effect: `--raw` disables, `--field` overrides config.
fn wrapper_field<'a>(args: &'a SourceArgs, settings: &'a Settings) -> &'a str {
    if args.raw {
        ""
    } else {
        args.field.as_deref().unwrap_or(&settings.wrapper_field)
    }
}

fn load_value(args: &SourceArgs, settings: &Settings) -> CliResult<Option<Value>> {
    let source = open_source(args.source.as_deref());
    debug!(source = %source.describe(), "loading records");
    let value = source.load()?;
    Ok(unwrap_field(value, wrapper_field(args, settings)))
}

fn print_rendered(rendered: &Rendered, style: &RenderStyle, title: &str) {
    match rendered {
        Rendered::Empty { message } => output::placeholder(message),
        Rendered::Tree(tree) => {
            output::header(title);
            for row in &tree.rows {
                output::tree_row(&style.row_text(row));
            }
            for fault in &tree.faults {
                output::warning(fault);
            }
        }
    }
}

#[instrument(skip(settings))]
fn _show(
    settings: &Settings,
    source: &SourceArgs,
    collapse: &[i64],
    format: OutputFormat,
) -> CliResult<()> {
    let value = load_value(source, settings)?;
    let style = settings.render_style();

    match format {
        OutputFormat::Plain => {
            let forest = ForestBuilder::build_from_value(value.as_ref());
            if forest.is_empty() {
                output::placeholder(&settings.empty_message);
                return Ok(());
            }
            output::header(&settings.title);
            let label = |id: NodeId| style.label(id);
            for tree in forest.to_term_trees(&label, settings.max_depth, settings.max_rows) {
                print!("{}", tree);
            }
        }
        OutputFormat::Tree => {
            let mut view = HierarchyView::new(settings.renderer(), settings.empty_message.clone());
            view.update(value.as_ref());
            for &id in collapse {
                let id = NodeId(id);
                if !view.state().get(id).is_expanded() {
                    continue;
                }
                match view.toggle(id) {
                    Ok(_) => {}
                    // an earlier id already collapsed an ancestor
                    Err(ApplicationError::Domain(e @ DomainError::HiddenNode(_))) => {
                        debug!("{}, not collapsing", e)
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            print_rendered(&view.render(), &style, &settings.title);
        }
    }
    Ok(())
}

/// One line of input to the interactive browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseCommand {
    Toggle(NodeId),
    ExpandAll,
    CollapseAll,
    Redraw,
    Quit,
}

fn parse_browse_command(line: &str) -> CliResult<BrowseCommand> {
    let mut words = line.split_whitespace();
    let command = match (words.next(), words.next()) {
        (None, _) => BrowseCommand::Redraw,
        (Some("t" | "toggle"), Some(id)) => {
            let id = id
                .parse::<i64>()
                .map_err(|_| CliError::InvalidArgs(format!("not a node id: {id}")))?;
            BrowseCommand::Toggle(NodeId(id))
        }
        (Some("t" | "toggle"), None) => {
            return Err(CliError::InvalidArgs("usage: t <id>".to_string()))
        }
        (Some("e" | "expand"), None) => BrowseCommand::ExpandAll,
        (Some("c" | "collapse"), None) => BrowseCommand::CollapseAll,
        (Some("q" | "quit"), None) => BrowseCommand::Quit,
        _ => {
            return Err(CliError::InvalidArgs(format!(
                "unknown command: {}",
                line.trim()
            )))
        }
    };
    if words.next().is_some() {
        return Err(CliError::InvalidArgs(format!(
            "unexpected input: {}",
            line.trim()
        )));
    }
    Ok(command)
}

#[instrument(skip(settings))]
fn _browse(settings: &Settings, source: &SourceArgs) -> CliResult<()> {
    if source.source.as_deref() == Some(Path::new("-")) {
        return Err(CliError::Usage(
            "browse reads its commands from stdin, pass a file or omit SOURCE".to_string(),
        ));
    }
    let style = settings.render_style();
    let mut view = HierarchyView::new(settings.renderer(), settings.empty_message.clone());
    let mut lines = io::stdin().lock().lines();

    loop {
        // Reload every cycle; the memo skips the rebuild when nothing changed.
        let value = load_value(source, settings)?;
        if view.update(value.as_ref()) {
            info!(builds = view.builds(), "hierarchy rebuilt");
        }
        let rendered = view.render();
        print_rendered(&rendered, &style, &settings.title);
        if rendered.is_empty() {
            return Ok(());
        }

        output::prompt("[t <id> | e | c | q]>");
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|e| InfraError::io("read command", e))?;
        match parse_browse_command(&line) {
            Ok(BrowseCommand::Toggle(id)) => match view.toggle(id) {
                Ok(Some(state)) => debug!(node = %id, ?state, "toggled"),
                Ok(None) => output::warning(&format!("{} has no children", style.label(id))),
                Err(e) => output::error(&e),
            },
            Ok(BrowseCommand::ExpandAll) => view.expand_all(),
            Ok(BrowseCommand::CollapseAll) => view.collapse_all(),
            Ok(BrowseCommand::Redraw) => {}
            Ok(BrowseCommand::Quit) => break,
            Err(e) => output::warning(&e),
        }
    }
    Ok(())
}

fn join_ids(ids: &[NodeId]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.iter().join(", ")
    }
}

fn print_report(report: &HierarchyReport) {
    output::header("Hierarchy report");
    output::field("records", &report.records);
    output::field("nodes", &report.nodes);
    output::field("roots", &join_ids(&report.roots));
    output::field("depth", &report.depth);
    output::field("leaves", &report.leaves);

    if report.is_clean() {
        output::success("no structural issues");
        return;
    }
    for id in &report.duplicates {
        output::failure(&format!("duplicate id: {id}"));
    }
    for id in &report.dual_memberships {
        output::failure(&format!("dual membership: {id} is a root and a child"));
    }
    for id in &report.detached {
        output::failure(&format!("detached: {id} is reachable from no root"));
    }
    for fault in report.dangling.iter().chain(&report.cycles) {
        output::failure(fault);
    }
}

#[instrument(skip(settings))]
fn _check(settings: &Settings, source: &SourceArgs) -> CliResult<()> {
    let value = load_value(source, settings)?;
    let records = ForestBuilder::decode(value.as_ref());
    let report = HierarchyReport::inspect(&records);
    print_report(&report);
    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::DataIssues {
            count: report.issue_count(),
        })
    }
}

fn _demo() -> CliResult<()> {
    let json = serde_json::to_string_pretty(&demo_records())
        .map_err(|e| InfraError::json("encode demo records", e))?;
    output::info(&json);
    Ok(())
}

fn _config(config_file: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config_file)?;
            print!("{}", settings.to_toml()?);
        }
        ConfigCommands::Init => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let marker = if path.exists() { "" } else { " (not found)" };
                    output::field("global", &format!("{}{}", path.display(), marker));
                }
                None => output::field("global", "no config directory on this platform"),
            }
            if let Some(path) = config_file {
                output::field("explicit", &path.display());
            }
        }
    }
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
