//! TiDB debug target + fetch-and-print primitive.
//!
//! Target { host, port } -> DebugClient::fetch_to(path, stdout)
//!   GET http://{host}:{port}/{path}, bounded body read, 4-space JSON re-render.
//!
//! One request per call, no retry, no caching. The async client runs on a
//! current-thread runtime created for the call, so callers stay synchronous.

use std::fmt;
use std::io::{self, Write};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use url::Url;

mod json;

pub use json::{JsonError, format_json};

/// Default request timeout in seconds (`--timeout`, 0 disables).
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default upper bound for a response body (`--max-body-bytes`).
pub const DEFAULT_MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Address of the tidb-server status port being inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub host: IpAddr,
    pub port: u16,
}

/// A required target flag was not supplied.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("required flag \"{0}\" not set")]
pub struct MissingFlag(pub &'static str);

impl Target {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self { host, port }
    }

    /// Build a target from the raw flag values. Both must be present;
    /// host is checked first.
    pub fn resolve(host: Option<IpAddr>, port: Option<u16>) -> Result<Self, MissingFlag> {
        let host = host.ok_or(MissingFlag("host"))?;
        let port = port.ok_or(MissingFlag("port"))?;
        Ok(Self::new(host, port))
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// `http://{host}:{port}/{path}`. The path is concatenated as-is, so
    /// callers must percent-encode any segments they interpolate.
    pub fn url(&self, path: &str) -> Result<Url, FetchError> {
        let raw = format!("http://{}/{}", self.socket_addr(), path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|source| FetchError::Url {
            path: path.to_string(),
            source,
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

/// Client-side bounds applied to the single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// None waits forever.
    pub timeout: Option<Duration>,
    pub max_body_bytes: u64,
}

impl FetchOptions {
    /// Map CLI values onto options; a zero timeout means "no timeout".
    pub fn from_flags(timeout_secs: u64, max_body_bytes: u64) -> Self {
        Self {
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            max_body_bytes,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_flags(DEFAULT_TIMEOUT_SECS, DEFAULT_MAX_BODY_BYTES)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid debug path '{path}'")]
    Url {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to start I/O runtime")]
    Runtime(#[source] io::Error),

    #[error("request to {url} failed")]
    Network {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {url} exceeds the {limit} byte limit")]
    BodyTooLarge { url: Url, limit: u64 },

    #[error("response from {url} (HTTP {status}) is not valid JSON")]
    Format {
        url: Url,
        status: u16,
        #[source]
        source: JsonError,
    },

    #[error("failed to write output")]
    Output(#[source] io::Error),
}

impl FetchError {
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Network { source, .. } if source.is_timeout())
    }
}

/// The shared fetch primitive handed to every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct DebugClient {
    target: Target,
    options: FetchOptions,
}

impl DebugClient {
    pub fn new(target: Target, options: FetchOptions) -> Self {
        Self { target, options }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Fetch `path` and write the indented JSON plus a newline to `out`.
    /// Nothing is written unless the whole body was read and parsed.
    pub fn fetch_to<W: Write>(&self, path: &str, out: &mut W) -> Result<(), FetchError> {
        let url = self.target.url(path)?;
        crate::log_debug!("GET {url}");

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(FetchError::Runtime)?;
        let (status, body) = rt.block_on(self.get(&url))?;
        crate::log_debug!("HTTP {status} from {url} ({} bytes)", body.len());

        let pretty = format_json(&body).map_err(|source| FetchError::Format {
            url: url.clone(),
            status,
            source,
        })?;

        out.write_all(&pretty)
            .and_then(|_| out.write_all(b"\n"))
            .and_then(|_| out.flush())
            .map_err(FetchError::Output)
    }

    async fn get(&self, url: &Url) -> Result<(u16, Vec<u8>), FetchError> {
        let network = |source: reqwest::Error| FetchError::Network {
            url: url.clone(),
            source,
        };

        // Proxies come from the environment; the target is flags-only.
        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(timeout) = self.options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(network)?;

        let mut resp = client.get(url.clone()).send().await.map_err(network)?;
        let status = resp.status().as_u16();

        let limit = self.options.max_body_bytes;
        let too_large = || FetchError::BodyTooLarge {
            url: url.clone(),
            limit,
        };
        if resp.content_length().is_some_and(|len| len > limit) {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(network)? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok((status, body))
    }
}
