//! `/rsa/{generate-keys,encrypt,decrypt}` handlers, grounded in
//! `internal/handler/rsa.go`'s multipart `data`/`key` shape.
//!
//! The original base64-encodes `N || E` (or `N || D`) and splits the two
//! back apart on a hardcoded 256-byte offset, which only round-trips for
//! exactly 2048-bit keys. `rsa_primitive::PublicKey`/`PrivateKey` instead
//! length-prefix `N`, so `?bits=` can be anything.

use crate::error::ApiError;
use axum::extract::{Multipart, Query};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rsa_primitive::{PrivateKey, PublicKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GenerateKeysQuery {
    bits: Option<usize>,
}

#[derive(Serialize)]
struct KeyPairResponse {
    public: String,
    private: String,
}

pub async fn generate_keys(Query(query): Query<GenerateKeysQuery>) -> Result<Json<KeyPairResponse>, ApiError> {
    let bits = query
        .bits
        .unwrap_or_else(|| codec_core::config::Config::default().rsa_key_bits as usize);
    let (public_key, private_key) = rsa_primitive::generate_keys(bits)?;
    Ok(Json(KeyPairResponse {
        public: public_key.to_base64(),
        private: private_key.to_base64(),
    }))
}

struct MultipartFields {
    data: Vec<u8>,
    key: String,
}

async fn read_data_and_key(mut multipart: Multipart) -> Result<MultipartFields, ApiError> {
    let mut data = None;
    let mut key = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "data" => {
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("failed to read \"data\" field: {e}")))?
                        .to_vec(),
                );
            }
            "key" => {
                key = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("failed to read \"key\" field: {e}")))?,
                );
            }
            _ => {}
        }
    }

    Ok(MultipartFields {
        data: data.ok_or_else(|| ApiError::bad_request("missing multipart field \"data\""))?,
        key: key.ok_or_else(|| ApiError::bad_request("missing multipart field \"key\""))?,
    })
}

pub async fn encrypt(multipart: Multipart) -> Result<Response, ApiError> {
    let fields = read_data_and_key(multipart).await?;
    let public_key = PublicKey::from_base64(&fields.key)?;
    let ciphertext = rsa_primitive::encrypt(&public_key, &fields.data)?;
    Ok(([(axum::http::header::CONTENT_TYPE, "application/octet-stream")], ciphertext).into_response())
}

pub async fn decrypt(multipart: Multipart) -> Result<Response, ApiError> {
    let fields = read_data_and_key(multipart).await?;
    let private_key = PrivateKey::from_base64(&fields.key)?;
    let message = rsa_primitive::decrypt(&private_key, &fields.data)?;
    Ok(([(axum::http::header::CONTENT_TYPE, "application/octet-stream")], message).into_response())
}
