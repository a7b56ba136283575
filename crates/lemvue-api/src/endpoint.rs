// ── Endpoint descriptor ──
//
// A request type names its own route and response. The client needs
// nothing else to perform the call, which keeps every endpoint module a
// flat list of plain data types.

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Request is sent as query parameters.
    Get,
    /// Request is sent as a JSON body.
    Post,
    /// Request is sent as a JSON body.
    Put,
}

/// A typed request/response pair on the instance API.
pub trait Endpoint: Serialize + Sync {
    /// Stable name used in logs.
    const NAME: &'static str;
    const METHOD: HttpMethod;
    /// Path relative to `/api/v4/`.
    const PATH: &'static str;

    type Response: DeserializeOwned + Send;
}

/// Implements [`Endpoint`] for a batch of request types.
macro_rules! endpoints {
    ($($req:ty => $method:ident $path:literal -> $resp:ty;)+) => {
        $(
            impl $crate::endpoint::Endpoint for $req {
                const NAME: &'static str = stringify!($req);
                const METHOD: $crate::endpoint::HttpMethod = $crate::endpoint::HttpMethod::$method;
                const PATH: &'static str = $path;
                type Response = $resp;
            }
        )+
    };
}

pub(crate) use endpoints;
