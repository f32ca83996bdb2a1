// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entry codec: converts request bodies to their storable form and back.
//!
//! JSON bodies are stored unchanged. Multipart bodies are stored as a tagged
//! structure so they can be told apart from plain JSON on the way back:
//!
//! ```text
//! {"__type": "FormData", "parts": [["name", "Alice"], ["photo", {"uri": "file:///a.jpg", "type": "image/jpeg"}]]}
//! ```
//!
//! Part values are carried through verbatim: text stays text, file
//! references stay references, and in-memory bytes are base64 encoded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

/// Tag value marking a serialized multipart body.
pub const FORM_DATA_TAG: &str = "FormData";

const TAG_FIELD: &str = "__type";
const PARTS_FIELD: &str = "parts";
const URI_FIELD: &str = "uri";
const BASE64_FIELD: &str = "base64";
const NAME_FIELD: &str = "name";
const TYPE_FIELD: &str = "type";

/// The body of a mutation request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A JSON-serializable value.
    Json(Value),
    /// A multipart/form-data upload.
    Multipart(Multipart),
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<Multipart> for RequestBody {
    fn from(form: Multipart) -> Self {
        RequestBody::Multipart(form)
    }
}

/// An ordered list of multipart fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multipart {
    parts: Vec<(String, PartValue)>,
}

impl Multipart {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, keeping insertion order. Repeated names are allowed.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<PartValue>) {
        self.parts.push((name.into(), value.into()));
    }

    /// Builder form of [`append`](Self::append).
    pub fn part(mut self, name: impl Into<String>, value: impl Into<PartValue>) -> Self {
        self.append(name, value);
        self
    }

    /// Returns the fields in insertion order.
    pub fn parts(&self) -> &[(String, PartValue)] {
        &self.parts
    }

    /// Consumes the form, returning its fields.
    pub fn into_parts(self) -> Vec<(String, PartValue)> {
        self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl FromIterator<(String, PartValue)> for Multipart {
    fn from_iter<I: IntoIterator<Item = (String, PartValue)>>(iter: I) -> Self {
        Multipart { parts: iter.into_iter().collect() }
    }
}

/// The value of a single multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum PartValue {
    /// A plain text field.
    Text(String),
    /// A reference to a file on the device, read when the request is sent.
    File(FileRef),
    /// In-memory binary content.
    Bytes(BinaryPart),
    /// Any other JSON value, stored as-is.
    Other(Value),
}

impl From<String> for PartValue {
    fn from(text: String) -> Self {
        PartValue::Text(text)
    }
}

impl From<&str> for PartValue {
    fn from(text: &str) -> Self {
        PartValue::Text(text.to_string())
    }
}

impl From<FileRef> for PartValue {
    fn from(file: FileRef) -> Self {
        PartValue::File(file)
    }
}

impl From<BinaryPart> for PartValue {
    fn from(part: BinaryPart) -> Self {
        PartValue::Bytes(part)
    }
}

/// A file reference (`file://` URI or local path) plus upload metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub uri: String,
    pub name: Option<String>,
    pub mime_type: Option<String>,
}

impl FileRef {
    pub fn new(uri: impl Into<String>) -> Self {
        FileRef { uri: uri.into(), name: None, mime_type: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Binary content held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPart {
    pub data: Vec<u8>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
}

impl BinaryPart {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        BinaryPart { data: data.into(), name: None, mime_type: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Converts a body into its storable JSON representation.
pub fn encode(body: &RequestBody) -> Value {
    match body {
        RequestBody::Json(value) => value.clone(),
        RequestBody::Multipart(form) => {
            let parts = form
                .parts
                .iter()
                .map(|(name, value)| Value::Array(vec![Value::String(name.clone()), encode_part(value)]))
                .collect();

            let mut tagged = Map::new();
            tagged.insert(TAG_FIELD.to_string(), Value::String(FORM_DATA_TAG.to_string()));
            tagged.insert(PARTS_FIELD.to_string(), Value::Array(parts));
            Value::Object(tagged)
        }
    }
}

/// Converts a stored value back into a body.
///
/// Anything that does not exactly match the tagged multipart shape is
/// returned as a JSON body unchanged.
pub fn decode(stored: Value) -> RequestBody {
    match decode_form_data(&stored) {
        Some(form) => RequestBody::Multipart(form),
        None => RequestBody::Json(stored),
    }
}

fn decode_form_data(value: &Value) -> Option<Multipart> {
    let object = value.as_object()?;
    if object.get(TAG_FIELD)?.as_str()? != FORM_DATA_TAG {
        return None;
    }

    object
        .get(PARTS_FIELD)?
        .as_array()?
        .iter()
        .map(|pair| match pair.as_array()?.as_slice() {
            [Value::String(name), value] => Some((name.clone(), decode_part(value))),
            _ => None,
        })
        .collect()
}

fn encode_part(value: &PartValue) -> Value {
    match value {
        PartValue::Text(text) => Value::String(text.clone()),
        PartValue::File(file) => {
            let mut object = Map::new();
            object.insert(URI_FIELD.to_string(), Value::String(file.uri.clone()));
            insert_metadata(&mut object, &file.name, &file.mime_type);
            Value::Object(object)
        }
        PartValue::Bytes(part) => {
            let mut object = Map::new();
            object.insert(BASE64_FIELD.to_string(), Value::String(STANDARD.encode(&part.data)));
            insert_metadata(&mut object, &part.name, &part.mime_type);
            Value::Object(object)
        }
        PartValue::Other(value) => value.clone(),
    }
}

fn insert_metadata(object: &mut Map<String, Value>, name: &Option<String>, mime_type: &Option<String>) {
    if let Some(name) = name {
        object.insert(NAME_FIELD.to_string(), Value::String(name.clone()));
    }
    if let Some(mime_type) = mime_type {
        object.insert(TYPE_FIELD.to_string(), Value::String(mime_type.clone()));
    }
}

fn decode_part(value: &Value) -> PartValue {
    match value {
        Value::String(text) => PartValue::Text(text.clone()),
        Value::Object(object) => decode_file(object)
            .or_else(|| decode_binary(object))
            .unwrap_or_else(|| PartValue::Other(value.clone())),
        other => PartValue::Other(other.clone()),
    }
}

fn decode_file(object: &Map<String, Value>) -> Option<PartValue> {
    let (uri, name, mime_type) = decode_described(object, URI_FIELD)?;
    Some(PartValue::File(FileRef { uri, name, mime_type }))
}

fn decode_binary(object: &Map<String, Value>) -> Option<PartValue> {
    let (encoded, name, mime_type) = decode_described(object, BASE64_FIELD)?;
    let data = STANDARD.decode(encoded).ok()?;
    Some(PartValue::Bytes(BinaryPart { data, name, mime_type }))
}

/// Matches `{<payload>: string, name?: string, type?: string}` and nothing else.
fn decode_described(
    object: &Map<String, Value>,
    payload_field: &str,
) -> Option<(String, Option<String>, Option<String>)> {
    if object
        .keys()
        .any(|key| key != payload_field && key != NAME_FIELD && key != TYPE_FIELD)
    {
        return None;
    }
    let payload = object.get(payload_field)?.as_str()?.to_string();
    let name = optional_string(object.get(NAME_FIELD))?;
    let mime_type = optional_string(object.get(TYPE_FIELD))?;
    Some((payload, name, mime_type))
}

/// `Some(None)` when absent, `None` when present but not a string.
fn optional_string(value: Option<&Value>) -> Option<Option<String>> {
    match value {
        None => Some(None),
        Some(Value::String(text)) => Some(Some(text.clone())),
        Some(_) => None,
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
