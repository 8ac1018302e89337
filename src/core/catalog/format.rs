use std::{fmt, io, marker::PhantomData, path::Path};

use clap::ValueEnum;
use enum_dispatch::enum_dispatch;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{DeserializeOwned, MapAccess, Visitor},
    ser::SerializeMap,
};
use serde_json::{Value, ser::Formatter};

use super::{Catalog, KeyedJson, XcStrings, malformed};
use crate::core::{TranslationKey, error::Result};

/// Parse bytes into a catalog and serialize it back.
///
/// Implementations must be deterministic: serializing an unmodified parsed
/// catalog reproduces the canonical layout of the input.
#[enum_dispatch]
pub trait CatalogFormat {
    /// Parse `bytes` read from `path` (used for diagnostics only).
    fn parse(&self, path: &Path, bytes: &[u8]) -> Result<Catalog>;

    /// Serialize without a trailing newline; the caller restores it.
    fn serialize(&self, catalog: &Catalog, path: &Path) -> Result<Vec<u8>>;

    /// How a new entry for `key` is spelled in this format. The result must
    /// normalize back to `key`.
    fn native_key(&self, key: &TranslationKey) -> String {
        key.as_str().to_string()
    }
}

/// All supported catalog formats.
#[enum_dispatch(CatalogFormat)]
#[derive(Debug, Clone)]
pub enum CatalogCodec {
    XcStrings,
    KeyedJson,
}

/// User-facing name of a catalog format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormatKind {
    /// Apple String Catalog (`.xcstrings`).
    Xcstrings,
    /// Keyed locale map: `{ "<key>": { "<locale>": "<value>" } }`.
    Json,
}

impl CatalogFormatKind {
    /// Guess the format from the file extension.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xcstrings") => CatalogFormatKind::Xcstrings,
            _ => CatalogFormatKind::Json,
        }
    }

    pub fn codec(self) -> CatalogCodec {
        match self {
            CatalogFormatKind::Xcstrings => XcStrings.into(),
            CatalogFormatKind::Json => KeyedJson.into(),
        }
    }
}

/// Parse `bytes` as JSON, mapping every failure to a format error.
pub(crate) fn parse_document<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| malformed(path, format!("not valid UTF-8: {}", e)))?;
    serde_json::from_str(text).map_err(|e| malformed(path, e.to_string()))
}

/// The members of a JSON object in file order.
///
/// `serde_json::Map` keeps only the last of two members with the same name;
/// here both survive, so a repeated catalog key can be reported and written
/// back instead of vanishing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Members<V = Value>(pub(crate) Vec<(String, V)>);

impl<V> Default for Members<V> {
    fn default() -> Self {
        Members(Vec::new())
    }
}

impl<V> Members<V> {
    /// The last member called `name`, matching how a JSON reader resolves it.
    pub(crate) fn last(&self, name: &str) -> Option<&V> {
        self.0.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Members<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct MembersVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for MembersVisitor<V> {
            type Value = Members<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut members = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(member) = map.next_entry::<String, V>()? {
                    members.push(member);
                }
                Ok(Members(members))
            }
        }

        deserializer.deserialize_map(MembersVisitor(PhantomData))
    }
}

impl<V: Serialize> Serialize for Members<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serialize `value` with the given layout.
pub(crate) fn to_bytes<T: Serialize + ?Sized>(value: &T, layout: Layout) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, layout.formatter());
    value.serialize(&mut serializer).map_err(io::Error::other)?;
    Ok(out)
}

/// Pretty-printing layouts of the supported formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    /// Xcode: `"key" : value`, empty objects as `{\n\n<indent>}`.
    Xcode,
    /// `serde_json::to_string_pretty`: `"key": value`, empty objects as `{}`.
    Pretty,
}

impl Layout {
    fn formatter(self) -> CatalogFormatter {
        match self {
            Layout::Xcode => CatalogFormatter {
                separator: b" : ",
                spaced_empty_object: true,
                ..Default::default()
            },
            Layout::Pretty => CatalogFormatter {
                separator: b": ",
                spaced_empty_object: false,
                ..Default::default()
            },
        }
    }
}

/// Two-space pretty formatter with a configurable key separator.
#[derive(Debug, Default)]
struct CatalogFormatter {
    separator: &'static [u8],
    spaced_empty_object: bool,
    current_indent: usize,
    has_value: bool,
}

impl CatalogFormatter {
    fn indent<W: ?Sized + io::Write>(&self, writer: &mut W) -> io::Result<()> {
        for _ in 0..self.current_indent {
            writer.write_all(b"  ")?;
        }
        Ok(())
    }
}

impl Formatter for CatalogFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent += 1;
        self.has_value = false;
        writer.write_all(b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent -= 1;
        if self.has_value {
            writer.write_all(b"\n")?;
            self.indent(writer)?;
        }
        writer.write_all(b"]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        writer.write_all(if first { b"\n" } else { b",\n" })?;
        self.indent(writer)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent += 1;
        self.has_value = false;
        writer.write_all(b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent -= 1;
        if self.has_value {
            writer.write_all(b"\n")?;
            self.indent(writer)?;
        } else if self.spaced_empty_object {
            writer.write_all(b"\n\n")?;
            self.indent(writer)?;
        }
        writer.write_all(b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        writer.write_all(if first { b"\n" } else { b",\n" })?;
        self.indent(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.separator)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }
}
