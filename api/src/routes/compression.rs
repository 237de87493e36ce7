//! `/compression/{algo}/{compress,decompress}` handlers.
//!
//! One route per algorithm in the original service
//! (`internal/handler/compression.go`) collapses here into a single path
//! parameter, the same generalization the CLI binaries already make over
//! `codec_core::cli::validate_paths` — one handler body instead of four
//! near-identical ones.

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    details: Option<String>,
}

impl DetailsQuery {
    fn wants_details(&self) -> bool {
        matches!(self.details.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Serialize)]
struct DataEnvelope {
    data: String,
}

#[derive(Serialize)]
struct DetailsEnvelope {
    data: String,
    details: serde_json::Value,
}

fn run_compress(algo: &str, data: &[u8]) -> Result<Vec<u8>, ApiError> {
    match algo {
        "rle" => Ok(rle_codec::compress(data)),
        "huffman" => Ok(huffman_codec::compress(data)?),
        "arithmetic" => Ok(arithmetic_codec::compress(data)?),
        "lzw" => Ok(lzw_codec::compress(data)?),
        other => Err(ApiError::bad_request(format!("unknown codec {other:?}"))),
    }
}

fn run_compress_with_details(algo: &str, data: &[u8]) -> Result<(Vec<u8>, serde_json::Value), ApiError> {
    match algo {
        "rle" => {
            let (out, details) = rle_codec::compress_with_details(data);
            Ok((out, serde_json::to_value(details).expect("RleDetails always serializes")))
        }
        "huffman" => {
            let (out, details) = huffman_codec::compress_with_details(data)?;
            Ok((out, serde_json::to_value(details).expect("HuffmanDetails always serializes")))
        }
        "arithmetic" => {
            let (out, details) = arithmetic_codec::compress_with_details(data)?;
            Ok((out, serde_json::to_value(details).expect("ArithmeticDetails always serializes")))
        }
        "lzw" => {
            let (out, details) = lzw_codec::compress_with_details(data)?;
            Ok((out, serde_json::to_value(details).expect("LzwDetails always serializes")))
        }
        other => Err(ApiError::bad_request(format!("unknown codec {other:?}"))),
    }
}

fn run_decompress(algo: &str, data: &[u8]) -> Result<Vec<u8>, ApiError> {
    match algo {
        "rle" => Ok(rle_codec::decompress(data)?),
        "huffman" => Ok(huffman_codec::decompress(data)?),
        "arithmetic" => Ok(arithmetic_codec::decompress(data)?),
        "lzw" => Ok(lzw_codec::decompress(data)?),
        other => Err(ApiError::bad_request(format!("unknown codec {other:?}"))),
    }
}

fn run_decompress_with_details(algo: &str, data: &[u8]) -> Result<(Vec<u8>, serde_json::Value), ApiError> {
    match algo {
        "rle" => {
            let (out, details) = rle_codec::decompress_with_details(data)?;
            Ok((out, serde_json::to_value(details).expect("RleDetails always serializes")))
        }
        "huffman" => {
            let (out, details) = huffman_codec::decompress_with_details(data)?;
            Ok((out, serde_json::to_value(details).expect("HuffmanDetails always serializes")))
        }
        "arithmetic" => {
            let (out, details) = arithmetic_codec::decompress_with_details(data)?;
            Ok((out, serde_json::to_value(details).expect("ArithmeticDetails always serializes")))
        }
        "lzw" => {
            let (out, details) = lzw_codec::decompress_with_details(data)?;
            Ok((out, serde_json::to_value(details).expect("LzwDetails always serializes")))
        }
        other => Err(ApiError::bad_request(format!("unknown codec {other:?}"))),
    }
}

pub async fn compress(
    Path(algo): Path<String>,
    Query(query): Query<DetailsQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    if query.wants_details() {
        let (out, details) = run_compress_with_details(&algo, &body)?;
        Ok(Json(DetailsEnvelope {
            data: BASE64.encode(out),
            details,
        })
        .into_response())
    } else {
        let out = run_compress(&algo, &body)?;
        Ok(Json(DataEnvelope { data: BASE64.encode(out) }).into_response())
    }
}

pub async fn decompress(
    Path(algo): Path<String>,
    Query(query): Query<DetailsQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    if query.wants_details() {
        let (out, details) = run_decompress_with_details(&algo, &body)?;
        Ok(Json(DetailsEnvelope {
            data: BASE64.encode(out),
            details,
        })
        .into_response())
    } else {
        let out = run_decompress(&algo, &body)?;
        Ok(Json(DataEnvelope { data: BASE64.encode(out) }).into_response())
    }
}
