/*!
shared.rs - shared helpers for the debug subcommands.

Focus:
  - debug_path: join user-supplied segments into a percent-encoded
    relative path (+ optional query) for `DebugClient::fetch_to`
  - parse_key_value: `COL=VALUE` arguments for index lookups
  - TableArgs: the `--database/--table` pair most endpoints take
*/

use anyhow::{Result, bail};
use clap::Args;
use url::Url;

/// `-d/--database` + `-t/--table`, flattened into subcommands.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TableArgs {
    /// Database name
    #[arg(short = 'd', long = "database", value_name = "DB")]
    pub database: String,

    /// Table name
    #[arg(short = 't', long = "table", value_name = "TABLE")]
    pub table: String,
}

/// Throwaway base used only to borrow the `url` crate's segment encoding.
const PATH_BASE: &str = "http://tidb.invalid/";

/// Build `seg1/seg2/...[?k=v&...]`, encoding every segment so that a `/`,
/// `?` or space inside an identifier stays inside that segment.
pub fn debug_path(segments: &[&str], query: &[(&str, &str)]) -> String {
    let mut url = Url::parse(PATH_BASE).expect("PATH_BASE is a valid http url");
    url.path_segments_mut()
        .expect("http urls can be a base")
        .clear()
        .extend(segments);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    let mut path = url.path().trim_start_matches('/').to_string();
    if let Some(q) = url.query() {
        path.push('?');
        path.push_str(q);
    }
    path
}

/// Split `KEY=VALUE`; the key must be non-empty, the value may be.
pub fn parse_key_value(raw: &str) -> Result<(String, String)> {
    let Some((k, v)) = raw.split_once('=') else {
        bail!("invalid value (expected COLUMN=VALUE): {raw}");
    };
    let k = k.trim();
    if k.is_empty() {
        bail!("invalid value (empty column name): {raw}");
    }
    Ok((k.to_string(), v.to_string()))
}
