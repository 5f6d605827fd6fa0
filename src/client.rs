use std::fs;
use std::io::Read;
use std::path::Path;
use std::thread;
use std::time::Duration;

use flate2::read::GzDecoder;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::decoder::Decoder;
use crate::domain::{DecodedResponse, ProteinId};
use crate::error::PocketError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureInput {
    PdbId(ProteinId),
    File { filename: String, bytes: Vec<u8> },
}

impl StructureInput {
    pub fn from_args(pdb_id: Option<&str>, pdb_file: Option<&Path>) -> Result<Self, PocketError> {
        match (pdb_id, pdb_file) {
            (Some(id), None) => Ok(Self::PdbId(id.parse()?)),
            (None, Some(path)) => Self::from_file(path),
            (None, None) => Err(PocketError::InvalidInput(
                "provide either a PDB ID or a PDB file".to_string(),
            )),
            (Some(_), Some(_)) => Err(PocketError::InvalidInput(
                "provide only one of a PDB ID or a PDB file, not both".to_string(),
            )),
        }
    }

    // `*.gz` is sent decompressed
    pub fn from_file(path: &Path) -> Result<Self, PocketError> {
        let raw = fs::read(path)
            .map_err(|err| PocketError::Filesystem(format!("read {}: {err}", path.display())))?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("protein.pdb")
            .to_string();
        match filename.strip_suffix(".gz") {
            Some(stem) => {
                let mut bytes = Vec::new();
                GzDecoder::new(raw.as_slice())
                    .read_to_end(&mut bytes)
                    .map_err(|err| {
                        PocketError::Filesystem(format!("gunzip {}: {err}", path.display()))
                    })?;
                Ok(Self::File {
                    filename: stem.to_string(),
                    bytes,
                })
            }
            None => Ok(Self::File {
                filename,
                bytes: raw,
            }),
        }
    }

    fn form(&self) -> Result<Form, PocketError> {
        let form = Form::new();
        match self {
            Self::PdbId(id) => Ok(form.text("pdb_id", id.as_str().to_string())),
            Self::File { filename, bytes } => {
                let part = Part::bytes(bytes.clone())
                    .file_name(filename.clone())
                    .mime_str("chemical/x-pdb")
                    .map_err(|err| PocketError::UpstreamHttp(err.to_string()))?;
                Ok(form.part("pdb_file", part))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub content_type: String,
    pub body: Vec<u8>,
}

pub trait PredictionClient: Send + Sync {
    fn predict(&self, input: &StructureInput) -> Result<UpstreamResponse, PocketError>;
}

#[derive(Clone)]
pub struct HttpPredictionClient {
    client: Client,
    endpoint: String,
}

impl HttpPredictionClient {
    pub fn new(config: &ClientConfig) -> Result<Self, PocketError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("pocket-decoder/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| PocketError::UpstreamHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| PocketError::UpstreamHttp(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    fn handle_status(response: Response) -> Result<Response, PocketError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("unknown error");
        let message = response
            .text()
            .ok()
            .and_then(|text| error_message(&text))
            .unwrap_or_else(|| reason.to_string());
        Err(PocketError::UpstreamStatus {
            status: status.as_u16(),
            message,
        })
    }

    fn send_with_retries<F>(&self, mut make_req: F) -> Result<Response, PocketError>
    where
        F: FnMut() -> Result<RequestBuilder, PocketError>,
    {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            let outcome = make_req()?.send();
            let retry = match &outcome {
                Ok(resp) => is_retryable_status(resp.status().as_u16()),
                Err(err) => is_retryable_error(err),
            };
            if retry && attempt < MAX_RETRIES {
                attempt += 1;
                tracing::warn!(attempt, "prediction request not accepted, retrying");
                thread::sleep(Duration::from_millis(BASE_DELAY_MS * attempt as u64));
                continue;
            }
            return outcome.map_err(|err| PocketError::UpstreamHttp(err.to_string()));
        }
    }
}

impl PredictionClient for HttpPredictionClient {
    fn predict(&self, input: &StructureInput) -> Result<UpstreamResponse, PocketError> {
        tracing::info!(endpoint = %self.endpoint, "requesting pocket predictions");
        let response =
            self.send_with_retries(|| Ok(self.client.post(&self.endpoint).multipart(input.form()?)))?;
        let response = Self::handle_status(response)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .bytes()
            .map_err(|err| PocketError::UpstreamHttp(err.to_string()))?;
        Ok(UpstreamResponse {
            content_type,
            body: body.to_vec(),
        })
    }
}

pub fn predict_and_decode<C: PredictionClient + ?Sized>(
    client: &C,
    input: &StructureInput,
    decoder: &Decoder,
) -> Result<DecodedResponse, PocketError> {
    let response = client.predict(input)?;
    decoder.decode(&response.content_type, &response.body)
}

/// First string among `error`, `message` and `detail` of a JSON error body,
/// or the JSON itself when none is a string. `None` for non-JSON bodies.
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let field = ["error", "message", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str));
    Some(match field {
        Some(message) => message.to_string(),
        None => value.to_string(),
    })
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
