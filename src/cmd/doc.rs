/*!
`doc.rs`

Markdown documentation for the command tree (hidden `--doc` root flag).

  doc_command(root)              -> detached copy: root about + visible flags + top-level subcommands
  generate_markdown_tree(cmd, d) -> one page per command node, `d/tidb-ctl_mvcc_key.md` style

Pages carry: title, short description, synopsis (long about + usage),
options, inherited options, SEE ALSO links (parent + children). Nothing here
runs subcommand logic; it only reads clap metadata.
*/

use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cmd::ROOT_NAME;

/// Relative directory `--doc` writes into.
pub const DOC_DIR: &str = "./doc";

/// Detached tree for rendering: same names and help texts as `root`, no
/// dispatch attached.
pub fn doc_command(root: &Command) -> Command {
    let mut doc = Command::new(ROOT_NAME)
        .bin_name(ROOT_NAME)
        .disable_help_subcommand(true);
    if let Some(about) = root.get_about() {
        doc = doc.about(about.clone());
    }
    if let Some(long) = root.get_long_about() {
        doc = doc.long_about(long.clone());
    }
    for arg in root.get_arguments().filter(|a| !a.is_hide_set()) {
        doc = doc.arg(arg.clone());
    }
    doc.subcommands(root.get_subcommands().cloned())
}

/// Write one Markdown file per visible command node under `dir`, creating
/// it if needed. Returns the written paths in tree order.
pub fn generate_markdown_tree(cmd: &Command, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create doc directory: {}", dir.display()))?;

    let mut cmd = cmd.clone();
    cmd.build();

    let mut written = Vec::new();
    walk(&cmd, &mut Vec::new(), dir, &mut written)?;
    Ok(written)
}

fn walk<'a>(
    cmd: &'a Command,
    ancestors: &mut Vec<&'a Command>,
    dir: &Path,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let page = render_page(cmd, ancestors);
    let path = dir.join(file_name(&command_path(ancestors, cmd)));
    fs::write(&path, page).with_context(|| format!("failed to write {}", path.display()))?;
    crate::log_debug!("wrote {}", path.display());
    written.push(path);

    ancestors.push(cmd);
    for sub in visible_subcommands(cmd) {
        walk(sub, ancestors, dir, written)?;
    }
    ancestors.pop();
    Ok(())
}

fn visible_subcommands(cmd: &Command) -> Vec<&Command> {
    let mut subs: Vec<&Command> = cmd
        .get_subcommands()
        .filter(|c| !c.is_hide_set() && c.get_name() != "help")
        .collect();
    subs.sort_by(|a, b| a.get_name().cmp(b.get_name()));
    subs
}

fn command_path(ancestors: &[&Command], cmd: &Command) -> Vec<String> {
    ancestors
        .iter()
        .map(|c| c.get_name().to_string())
        .chain(std::iter::once(cmd.get_name().to_string()))
        .collect()
}

fn file_name(path: &[String]) -> String {
    format!("{}.md", path.join("_"))
}

fn short(cmd: &Command) -> String {
    cmd.get_about().map(|s| s.to_string()).unwrap_or_default()
}

fn render_page(cmd: &Command, ancestors: &[&Command]) -> String {
    let path = command_path(ancestors, cmd);
    let title = path.join(" ");
    let mut out = String::new();

    let _ = writeln!(out, "## {title}\n");
    let about = short(cmd);
    if !about.is_empty() {
        let _ = writeln!(out, "{about}\n");
    }

    let _ = writeln!(out, "### Synopsis\n");
    let synopsis = cmd
        .get_long_about()
        .map(|s| s.to_string())
        .unwrap_or_else(|| about.clone());
    if !synopsis.is_empty() {
        let _ = writeln!(out, "{synopsis}\n");
    }
    let usage = cmd.clone().render_usage().to_string();
    let usage = usage.trim().trim_start_matches("Usage:").trim();
    let _ = writeln!(out, "```\n{usage}\n```\n");

    let (positionals, options): (Vec<&Arg>, Vec<&Arg>) = cmd
        .get_arguments()
        .filter(|a| !a.is_hide_set())
        .partition(|a| a.is_positional());
    let is_root = ancestors.is_empty();
    let (inherited, own): (Vec<&Arg>, Vec<&Arg>) = options
        .into_iter()
        .partition(|a| !is_root && a.is_global_set());

    write_arg_block(&mut out, "Arguments", &positionals);
    write_arg_block(&mut out, "Options", &own);
    write_arg_block(&mut out, "Options inherited from parent commands", &inherited);

    let children = visible_subcommands(cmd);
    if !is_root || !children.is_empty() {
        let _ = writeln!(out, "### SEE ALSO\n");
        if let Some(parent) = ancestors.last() {
            let parent_path = command_path(&ancestors[..ancestors.len() - 1], parent);
            let _ = writeln!(
                out,
                "* [{}]({})\t - {}",
                parent_path.join(" "),
                file_name(&parent_path),
                short(parent)
            );
        }
        for child in children {
            let mut child_path = path.clone();
            child_path.push(child.get_name().to_string());
            let _ = writeln!(
                out,
                "* [{}]({})\t - {}",
                child_path.join(" "),
                file_name(&child_path),
                short(child)
            );
        }
    }
    out
}

fn write_arg_block(out: &mut String, heading: &str, args: &[&Arg]) {
    if args.is_empty() {
        return;
    }
    let rows: Vec<(String, String)> = args.iter().map(|a| (arg_spec(a), arg_help(a))).collect();
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

    let _ = writeln!(out, "### {heading}\n\n```");
    for (left, help) in rows {
        let line = format!("  {left:<width$}   {help}");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    let _ = writeln!(out, "```\n");
}

fn value_name(arg: &Arg) -> String {
    arg.get_value_names()
        .and_then(|names| names.first())
        .map(|n| n.to_string())
        .unwrap_or_else(|| arg.get_id().as_str().to_uppercase())
}

fn arg_spec(arg: &Arg) -> String {
    if arg.is_positional() {
        return format!("<{}>", value_name(arg));
    }
    let mut spec = match (arg.get_short(), arg.get_long()) {
        (Some(s), Some(l)) => format!("-{s}, --{l}"),
        (Some(s), None) => format!("-{s}"),
        (None, Some(l)) => format!("    --{l}"),
        (None, None) => value_name(arg),
    };
    if arg.get_action().takes_values() {
        let _ = write!(spec, " <{}>", value_name(arg));
    }
    spec
}

fn arg_help(arg: &Arg) -> String {
    let mut help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
    let defaults: Vec<String> = arg
        .get_default_values()
        .iter()
        .map(|v| v.to_string_lossy().into_owned())
        .collect();
    if !defaults.is_empty() && arg.get_action().takes_values() {
        let _ = write!(help, " (default {})", defaults.join(","));
    }
    help
}
