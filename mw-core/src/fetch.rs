//! Request building and response decoding for `api.php`.
//!
//! Every request carries `format=json`, a `User-Agent`, `Accept-Encoding:
//! gzip` and, when configured, basic-auth credentials. Responses with a
//! non-2xx status become [`TransportError::HttpError`]; gzip bodies are
//! inflated and the result is decoded using the charset from
//! `Content-Type` (UTF-8 when absent).

use std::collections::BTreeMap;
use std::io::Read;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use encoding_rs::{Encoding, UTF_8};
use flate2::read::GzDecoder;

use crate::error::{DecodeError, MwResult, TransportError};
use crate::transport::{HttpAuth, HttpRequest, HttpResponse};

/// API parameters, kept sorted so the encoded form is deterministic.
pub type Params = BTreeMap<String, String>;

/// Collect string-like pairs into [`Params`].
pub fn to_params<I, K, V>(params: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Per-client request decoration.
#[derive(Debug, Clone)]
pub(crate) struct RequestOptions {
    pub user_agent: String,
    pub http_auth: Option<HttpAuth>,
}

/// Build the HTTP request for `params` against `url`.
///
/// `format` is always forced to `json`. With `force_get` the parameters go
/// into the query string of a GET; otherwise they are a form-encoded POST
/// body.
pub(crate) fn build_request(
    url: &str,
    mut params: Params,
    force_get: bool,
    options: &RequestOptions,
) -> HttpRequest {
    params.insert("format".to_string(), "json".to_string());

    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();

    let mut request = if force_get {
        let separator = if url.contains('?') { '&' } else { '?' };
        HttpRequest::get(format!("{}{}{}", url, separator, encoded))
    } else {
        HttpRequest::post(url, encoded.into_bytes())
            .header("Content-Type", "application/x-www-form-urlencoded")
    };

    request = request
        .header("User-Agent", options.user_agent.as_str())
        .header("Accept-Encoding", "gzip");

    if let Some(auth) = &options.http_auth {
        request = request.header("Authorization", basic_auth_header(auth));
    }

    request
}

/// `Basic <base64(user:pass)>` header value.
pub(crate) fn basic_auth_header(auth: &HttpAuth) -> String {
    let credentials = format!("{}:{}", auth.username, auth.password);
    format!("Basic {}", BASE64.encode(credentials.as_bytes()))
}

/// Turn a raw response into body text.
pub(crate) fn decode_response(response: HttpResponse) -> MwResult<String> {
    if !response.is_success() {
        let reason = String::from_utf8_lossy(&response.body)
            .chars()
            .take(200)
            .collect::<String>();
        return Err(TransportError::HttpError {
            status_code: response.status,
            reason,
        }
        .into());
    }

    let gzipped = response
        .header("content-encoding")
        .is_some_and(|enc| enc.trim().eq_ignore_ascii_case("gzip"));

    let bytes = if gzipped {
        let mut inflated = Vec::new();
        GzDecoder::new(&response.body[..])
            .read_to_end(&mut inflated)
            .map_err(|e| DecodeError::Gzip {
                reason: e.to_string(),
            })?;
        inflated
    } else {
        response.body.to_vec()
    };

    let encoding = response
        .header("content-type")
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            DecodeError::Charset {
                charset: encoding.name().to_string(),
            }
            .into()
        })
}

/// Extract the `charset` parameter of a `Content-Type` value.
fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}
