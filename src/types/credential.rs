//! Credential records submitted for fraud scoring

use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A digital credential with issuer/holder metadata.
///
/// Every field is optional. Absent numeric fields read as 0 and absent
/// signatures as the empty string. Loosely typed JSON is coerced once, when
/// the record is built, so extraction downstream never sees raw values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Credential {
    /// Caller-supplied identifier, used only for reporting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Issue date (numeric, e.g. unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<f64>,

    /// Expiry date (numeric, e.g. unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<f64>,

    /// Issuer signature; only its length is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_signature: Option<String>,

    /// Holder signature; only its length is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_signature: Option<String>,

    /// Numeric credential type code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<f64>,

    /// Number of times the credential has been verified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_count: Option<f64>,

    /// Revocation status code (0 = active)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_status: Option<f64>,

    /// Issuer trust score, nominally 0.0 - 1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_trust_score: Option<f64>,

    /// Holder trust score, nominally 0.0 - 1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_trust_score: Option<f64>,

    /// Credential age
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_age: Option<f64>,
}

impl Credential {
    /// Build a credential from a JSON value, which must be an object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::try_from(map),
            other => Err(DetectorError::malformed(
                "<credential>",
                format!("expected an object, got {}", kind(&other)),
            )),
        }
    }

    /// Character length of the issuer signature (0 when absent)
    pub fn issuer_signature_len(&self) -> usize {
        signature_len(&self.issuer_signature)
    }

    /// Character length of the holder signature (0 when absent)
    pub fn holder_signature_len(&self) -> usize {
        signature_len(&self.holder_signature)
    }
}

impl TryFrom<Map<String, Value>> for Credential {
    type Error = DetectorError;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        Ok(Self {
            id: id_field(&map)?,
            issue_date: numeric_field(&map, "issue_date")?,
            expiry_date: numeric_field(&map, "expiry_date")?,
            issuer_signature: signature_field(&map, "issuer_signature")?,
            holder_signature: signature_field(&map, "holder_signature")?,
            credential_type: numeric_field(&map, "credential_type")?,
            verification_count: numeric_field(&map, "verification_count")?,
            revocation_status: numeric_field(&map, "revocation_status")?,
            issuer_trust_score: numeric_field(&map, "issuer_trust_score")?,
            holder_trust_score: numeric_field(&map, "holder_trust_score")?,
            credential_age: numeric_field(&map, "credential_age")?,
        })
    }
}

/// A credential paired with its fraud label (1 = fraudulent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledCredential {
    pub credential: Credential,
    pub label: u8,
}

fn signature_len(signature: &Option<String>) -> usize {
    signature.as_deref().map_or(0, |s| s.chars().count())
}

fn numeric_field(map: &Map<String, Value>, field: &str) -> Result<Option<f64>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| DetectorError::malformed(field, "number is not representable as f64")),
        Some(Value::Bool(b)) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| {
                DetectorError::malformed(field, format!("expected a number, got string {:?}", s))
            }),
        Some(other) => Err(DetectorError::malformed(
            field,
            format!("expected a number, got {}", kind(other)),
        )),
    }
}

fn signature_field(map: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DetectorError::malformed(
            field,
            format!("expected a string, got {}", kind(other)),
        )),
    }
}

fn id_field(map: &Map<String, Value>) -> Result<Option<String>> {
    let value = map.get("id").or_else(|| map.get("credential_id"));
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(DetectorError::malformed(
            "id",
            format!("expected a string or number, got {}", kind(other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
