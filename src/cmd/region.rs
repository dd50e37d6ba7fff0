/*!
`region.rs`

Implements the `region` subcommand: TiKV region metadata as seen by tidb-server.

  region list                -> regions/meta
  region id ID               -> regions/{id}
  region hot                 -> regions/hot
  region table -d DB -t TBL  -> tables/{db}/{table}/regions
*/

use anyhow::Result;
use clap::{Args, Subcommand};
use std::io::Write;

use crate::cmd::shared::{TableArgs, debug_path};
use crate::tidb::DebugClient;

/// CLI arguments for `tidb-ctl region <command>`
#[derive(Args, Debug)]
pub struct RegionArgs {
    #[command(subcommand)]
    pub command: RegionCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum RegionCommand {
    /// Metadata of all regions
    List,

    /// A single region, by id
    Id {
        /// Region id
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Hot read/write regions
    Hot,

    /// Record and index regions of a table
    Table(TableArgs),
}

impl RegionCommand {
    pub fn path(&self) -> String {
        match self {
            RegionCommand::List => debug_path(&["regions", "meta"], &[]),
            RegionCommand::Id { id } => debug_path(&["regions", &id.to_string()], &[]),
            RegionCommand::Hot => debug_path(&["regions", "hot"], &[]),
            RegionCommand::Table(t) => debug_path(&["tables", &t.database, &t.table, "regions"], &[]),
        }
    }
}

/// Entry point for the region subcommand.
pub fn execute_region<W: Write>(client: &DebugClient, args: RegionArgs, out: &mut W) -> Result<()> {
    let path = args.command.path();
    client.fetch_to(&path, out)?;
    Ok(())
}
