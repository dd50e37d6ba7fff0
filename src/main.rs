use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use std::io::{self, Write};
use std::net::IpAddr;
use std::path::Path;

mod cmd;
#[cfg(test)]
mod testutil;
mod tidb;
mod utils;

use cmd::{MvccArgs, RegionArgs, SchemaArgs};
use tidb::{DebugClient, FetchOptions, Target};

/// TiDB Controller (tidb-ctl): query tidb-server's HTTP status port.
///
/// Command layout:
///   tidb-ctl -H <ip> -P <port> mvcc   <key|txn|hex|index> ...
///   tidb-ctl -H <ip> -P <port> region <list|id|hot|table> ...
///   tidb-ctl -H <ip> -P <port> schema <all|in|tid> ...
///
/// Global flags:
///   -H / --host       TiDB server IP (required)
///   -P / --port       TiDB server status port (required)
///   --timeout         Request timeout in seconds, 0 waits forever
///   --max-body-bytes  Response size limit
///   -v / -vv          Increase verbosity (stderr)
///   -q / --quiet      Errors only
///
/// Every query prints the server's JSON reply with 4-space indentation.
/// The hidden `--doc` flag writes Markdown for the command tree to ./doc.
#[derive(Parser, Debug)]
#[command(
    name = "tidb-ctl",
    version,
    about = "TiDB Controller",
    long_about = "TiDB Controller (tidb-ctl) is a command line tool for TiDB Server (tidb-server).",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// TiDB server host (default 127.0.0.1)
    #[arg(short = 'H', long, global = true, value_name = "HOST")]
    host: Option<IpAddr>,

    /// TiDB server port (default 10080)
    #[arg(short = 'P', long, global = true, value_name = "PORT")]
    port: Option<u16>,

    /// Request timeout in seconds, 0 waits forever
    #[arg(long, global = true, value_name = "SECS", default_value_t = tidb::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Largest response body accepted, in bytes
    #[arg(long = "max-body-bytes", global = true, value_name = "BYTES", default_value_t = tidb::DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: u64,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// generate doc file
    #[arg(long, hide = true)]
    doc: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// MVCC Information
    ///
    /// Show MVCC information of a record key, an index entry, a raw hex key or a transaction.
    Mvcc(MvccArgs),

    /// Region information
    ///
    /// Show region metadata, a single region, hot regions, or the regions of a table.
    Region(RegionArgs),

    /// Schema Information
    ///
    /// Show schema information of all databases, one database, one table, or a table id.
    Schema(SchemaArgs),
}

/// Host and port must both be given explicitly; anything else is a usage
/// error raised before dispatch.
fn resolve_target(cli: &Cli) -> Result<Target, clap::Error> {
    Target::resolve(cli.host, cli.port)
        .map_err(|e| Cli::command().error(ErrorKind::MissingRequiredArgument, e))
}

fn run<W: Write>(cli: Cli, target: Target, doc_dir: &Path, out: &mut W) -> Result<()> {
    if cli.doc {
        let tree = cmd::doc::doc_command(&Cli::command());
        let written = cmd::doc::generate_markdown_tree(&tree, doc_dir)?;
        log_info!("wrote {} doc files to {}", written.len(), doc_dir.display());
        return Ok(());
    }

    let client = DebugClient::new(
        target,
        FetchOptions::from_flags(cli.timeout, cli.max_body_bytes),
    );
    log_trace!("target={} timeout={}s", client.target(), cli.timeout);

    match cli.command {
        None => Ok(()),
        Some(Commands::Mvcc(args)) => cmd::execute_mvcc(&client, args, out),
        Some(Commands::Region(args)) => cmd::execute_region(&client, args, out),
        Some(Commands::Schema(args)) => cmd::execute_schema(&client, args, out),
    }
}

fn main() {
    let cli = Cli::parse();

    utils::init_logging(utils::LogLevel::from_flags(cli.verbose, cli.quiet));

    let target = match resolve_target(&cli) {
        Ok(t) => t,
        Err(e) => e.exit(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = run(cli, target, Path::new(cmd::doc::DOC_DIR), &mut out) {
        log_error!("{e:#}");
        match e.downcast_ref::<tidb::FetchError>() {
            Some(f) if f.is_timeout() => {
                log_info!("no answer in time; raise --timeout or pass 0 to wait forever")
            }
            Some(f) if f.is_network() => {
                log_info!("is the tidb-server status port reachable at {target}?")
            }
            _ => {}
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockServer;
    use std::fs;

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn root_name_matches_doc_tree() {
        assert_eq!(Cli::command().get_name(), cmd::ROOT_NAME);
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_anywhere() {
        let cli = parse(&["tidb-ctl", "region", "hot", "-H", "10.0.0.1", "-P", "10081"]);
        let target = resolve_target(&cli).unwrap();
        assert_eq!(target.to_string(), "10.0.0.1:10081");
    }

    #[test]
    fn missing_host_or_port_is_usage_error() {
        for argv in [
            &["tidb-ctl", "-P", "10080", "region", "hot"][..],
            &["tidb-ctl", "-H", "127.0.0.1", "region", "hot"][..],
            &["tidb-ctl"][..],
            &["tidb-ctl", "--doc"][..],
        ] {
            let err = resolve_target(&parse(argv)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument, "{argv:?}");
        }
    }

    #[test]
    fn missing_host_never_connects() {
        let server = MockServer::start(200, "{}");
        let port = server.target().port.to_string();
        let cli = parse(&["tidb-ctl", "-P", &port, "schema", "all"]);
        assert!(resolve_target(&cli).is_err());
        assert_eq!(server.hits(), 0);
    }

    #[test]
    fn bad_flag_values_rejected() {
        assert!(Cli::try_parse_from(["tidb-ctl", "-H", "localhost", "-P", "1"]).is_err());
        assert!(Cli::try_parse_from(["tidb-ctl", "-H", "127.0.0.1", "-P", "70000"]).is_err());
        assert!(Cli::try_parse_from(["tidb-ctl", "-H", "127.0.0.1", "-P", "-1"]).is_err());
    }

    #[test]
    fn bare_invocation_does_nothing() {
        let server = MockServer::start(200, "{}");
        let t = server.target();
        let (host, port) = (t.host.to_string(), t.port.to_string());
        let cli = parse(&["tidb-ctl", "-H", &host, "-P", &port]);
        let tmp = tempfile::tempdir().unwrap();
        let mut out = Vec::new();

        run(cli, t, &tmp.path().join("doc"), &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(server.hits(), 0);
        assert!(!tmp.path().join("doc").exists());
    }

    #[test]
    fn dispatches_to_subcommand() {
        let server = MockServer::start(200, r#"{"a":1,"b":[2,3]}"#);
        let t = server.target();
        let (host, port) = (t.host.to_string(), t.port.to_string());
        let cli = parse(&[
            "tidb-ctl", "-H", &host, "-P", &port, "mvcc", "key", "-d", "test", "-t", "t1", "1",
        ]);
        let target = resolve_target(&cli).unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let mut out = Vec::new();

        run(cli, target, tmp.path(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n    \"a\": 1,\n    \"b\": [\n        2,\n        3\n    ]\n}\n"
        );
        assert_eq!(server.paths(), vec!["/mvcc/key/test/t1/1".to_string()]);
    }

    #[test]
    fn server_errors_propagate() {
        let server = MockServer::start(500, "internal error");
        let t = server.target();
        let (host, port) = (t.host.to_string(), t.port.to_string());
        let cli = parse(&["tidb-ctl", "-H", &host, "-P", &port, "region", "id", "9"]);
        let tmp = tempfile::tempdir().unwrap();
        let mut out = Vec::new();

        let err = run(cli, t, tmp.path(), &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("not valid JSON"));
        assert!(out.is_empty());
    }

    #[test]
    fn doc_mode_skips_fetch() {
        let server = MockServer::start(200, "{}");
        let t = server.target();
        let (host, port) = (t.host.to_string(), t.port.to_string());
        let cli = parse(&["tidb-ctl", "-H", &host, "-P", &port, "--doc", "region", "hot"]);
        let tmp = tempfile::tempdir().unwrap();
        let doc_dir = tmp.path().join("doc");
        let mut out = Vec::new();

        run(cli, t, &doc_dir, &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(server.hits(), 0);
        assert!(doc_dir.join("tidb-ctl.md").is_file());
        assert_eq!(fs::read_dir(&doc_dir).unwrap().count(), 15);
    }
}
