/*!
`mvcc.rs`

Implements the `mvcc` subcommand: MVCC version history of keys stored by
tidb-server, fetched from its status port.

  mvcc key   -d DB -t TABLE HANDLE            -> mvcc/key/{db}/{table}/{handle}
  mvcc txn   -d DB -t TABLE START_TS          -> mvcc/txn/{start_ts}/{db}/{table}
  mvcc hex   HEX_KEY                          -> mvcc/hex/{hex_key}
  mvcc index -d DB -t TABLE -i INDEX --handle HANDLE [--value COL=VAL ...]
                                              -> mvcc/index/{db}/{table}/{index}/{handle}?COL=VAL&...
*/

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use std::io::Write;

use crate::cmd::shared::{TableArgs, debug_path, parse_key_value};
use crate::tidb::DebugClient;

/// CLI arguments for `tidb-ctl mvcc <command>`
#[derive(Args, Debug)]
pub struct MvccArgs {
    #[command(subcommand)]
    pub command: MvccCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum MvccCommand {
    /// MVCC info of a table record, by row handle
    Key {
        #[command(flatten)]
        table: TableArgs,

        /// Row handle (int64 row id)
        #[arg(value_name = "HANDLE", allow_negative_numbers = true)]
        handle: i64,
    },

    /// MVCC info of the keys a transaction wrote to a table
    Txn {
        #[command(flatten)]
        table: TableArgs,

        /// Transaction start timestamp
        #[arg(value_name = "START_TS")]
        start_ts: u64,
    },

    /// MVCC info of a raw key, hex encoded
    Hex {
        /// Hex encoded key
        #[arg(value_name = "HEX_KEY")]
        key: String,
    },

    /// MVCC info of an index entry
    Index {
        #[command(flatten)]
        table: TableArgs,

        /// Index name
        #[arg(short = 'i', long, value_name = "INDEX")]
        index: String,

        /// Row handle the index entry points to
        #[arg(long, value_name = "HANDLE", allow_negative_numbers = true)]
        handle: i64,

        /// Indexed column value (COL=VALUE), repeatable
        #[arg(long = "value", value_name = "COL=VALUE")]
        values: Vec<String>,
    },
}

impl MvccCommand {
    /// Debug path this command queries.
    pub fn path(&self) -> Result<String> {
        match self {
            MvccCommand::Key { table, handle } => {
                let handle = handle.to_string();
                Ok(debug_path(&["mvcc", "key", &table.database, &table.table, &handle], &[]))
            }
            MvccCommand::Txn { table, start_ts } => {
                let ts = start_ts.to_string();
                Ok(debug_path(&["mvcc", "txn", &ts, &table.database, &table.table], &[]))
            }
            MvccCommand::Hex { key } => {
                validate_hex(key)?;
                Ok(debug_path(&["mvcc", "hex", key], &[]))
            }
            MvccCommand::Index {
                table,
                index,
                handle,
                values,
            } => {
                let pairs = values
                    .iter()
                    .map(|v| parse_key_value(v))
                    .collect::<Result<Vec<_>>>()?;
                let query: Vec<(&str, &str)> = pairs
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                let handle = handle.to_string();
                Ok(debug_path(
                    &["mvcc", "index", &table.database, &table.table, index, &handle],
                    &query,
                ))
            }
        }
    }
}

fn validate_hex(key: &str) -> Result<()> {
    if key.is_empty() {
        bail!("hex key is empty");
    }
    if key.len() % 2 != 0 {
        bail!("hex key has odd length: {key}");
    }
    if let Some(c) = key.chars().find(|c| !c.is_ascii_hexdigit()) {
        bail!("hex key contains non-hex character '{c}': {key}");
    }
    Ok(())
}

/// Entry point for the mvcc subcommand.
pub fn execute_mvcc<W: Write>(client: &DebugClient, args: MvccArgs, out: &mut W) -> Result<()> {
    let path = args.command.path()?;
    client.fetch_to(&path, out)?;
    Ok(())
}
