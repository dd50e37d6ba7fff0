/*!
`schema.rs`

Implements the `schema` subcommand: schema (database / table info) as held
by tidb-server's info schema.

  schema all                  -> schema
  schema db DB                -> schema/{db}
  schema db DB -n TABLE       -> schema/{db}/{table}
  schema tid TABLE_ID         -> schema?table_id={id}
*/

use anyhow::Result;
use clap::{Args, Subcommand};
use std::io::Write;

use crate::cmd::shared::debug_path;
use crate::tidb::DebugClient;

/// CLI arguments for `tidb-ctl schema <command>`
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SchemaCommand {
    /// Every database and its tables
    All,

    /// Tables of one database, or a single table with --name
    #[command(name = "in")]
    In {
        /// Database name
        #[arg(value_name = "DB")]
        database: String,

        /// Table name
        #[arg(short = 'n', long = "name", value_name = "TABLE")]
        table: Option<String>,
    },

    /// Table info by table id
    Tid {
        /// Table id
        #[arg(value_name = "TABLE_ID")]
        table_id: i64,
    },
}

impl SchemaCommand {
    pub fn path(&self) -> String {
        match self {
            SchemaCommand::All => debug_path(&["schema"], &[]),
            SchemaCommand::In {
                database,
                table: None,
            } => debug_path(&["schema", database], &[]),
            SchemaCommand::In {
                database,
                table: Some(table),
            } => debug_path(&["schema", database, table], &[]),
            SchemaCommand::Tid { table_id } => {
                let id = table_id.to_string();
                debug_path(&["schema"], &[("table_id", id.as_str())])
            }
        }
    }
}

/// Entry point for the schema subcommand.
pub fn execute_schema<W: Write>(client: &DebugClient, args: SchemaArgs, out: &mut W) -> Result<()> {
    let path = args.command.path();
    client.fetch_to(&path, out)?;
    Ok(())
}
