use serde::{Deserialize, Serialize};

/// The JSON-RPC version
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Version {
    /// Version 2.0
    #[serde(rename = "2.0")]
    V2_0,
}

/// A JSON-RPC request or response id
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Id {
    /// Numeric id
    Num(u64),
    /// String id
    Str(String),
}

/// A JSON-RPC request, whose method and parameters are flattened into the
/// request object.
#[derive(Debug, Serialize)]
pub struct Request<MethodT> {
    /// The JSON-RPC version
    #[serde(rename = "jsonrpc")]
    pub version: Version,
    /// The method and its parameters
    #[serde(flatten)]
    pub method: MethodT,
    /// The request id
    pub id: Id,
}

/// A JSON-RPC response
#[derive(Debug, Deserialize)]
pub struct Response<SuccessT> {
    /// The JSON-RPC version
    pub jsonrpc: Version,
    /// The id of the request this is a response to
    pub id: Id,
    /// The result or error
    #[serde(flatten)]
    pub data: ResponseData<SuccessT>,
}

/// The result or error of a JSON-RPC response
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResponseData<SuccessT> {
    /// An error response
    Error {
        /// The error
        error: Error,
    },
    /// A successful response
    Success {
        /// The result
        result: SuccessT,
    },
}

impl<SuccessT> ResponseData<SuccessT> {
    /// Converts the response data into a [`Result`].
    pub fn into_result(self) -> Result<SuccessT, Error> {
        match self {
            ResponseData::Success { result } => Ok(result),
            ResponseData::Error { error } => Err(error),
        }
    }
}

/// A JSON-RPC error object
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, thiserror::Error)]
#[error("The response reported error `{code}`: `{message}`. (optional data: {data:?})")]
pub struct Error {
    /// The error code
    pub code: i64,
    /// The error message
    pub message: String,
    /// Additional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
