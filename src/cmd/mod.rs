/*!
Command dispatcher module.

Every debug subcommand follows the same contract:
  accept args -> build a debug path -> `DebugClient::fetch_to`

Layout:
  src/cmd/
    mod.rs          (this file: module declarations, re-exports, root names)
    mvcc.rs         (MvccArgs   + execute_mvcc)
    region.rs       (RegionArgs + execute_region)
    schema.rs       (SchemaArgs + execute_schema)
    shared.rs       (TableArgs, debug_path, parse_key_value)
    doc.rs          (hidden --doc Markdown tree)

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    that returns `anyhow::Result<()>` and takes the shared client by reference.
  - Path building lives on the parsed command enum (`path()`), so it is
    testable without a server.
*/

pub mod doc;
pub mod mvcc;
pub mod region;
pub mod schema;
pub mod shared;

pub use mvcc::{MvccArgs, execute_mvcc};
pub use region::{RegionArgs, execute_region};
pub use schema::{SchemaArgs, execute_schema};

/// Root command name; the doc tree and generated file names use it.
pub const ROOT_NAME: &str = "tidb-ctl";
