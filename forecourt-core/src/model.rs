//! Wire shapes returned by the CMS and the normalised asset type.
//!
//! Entries and assets share the same `{ sys, fields }` envelope on the wire, so
//! both deserialize into [`Entry`]. Field values stay as `serde_json::Value`
//! because the content model mixes scalars, rich-text documents, arrays and
//! links freely; the accessors on [`Entry`] do the typed reads.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ResolveError;

/// `sys.contentType` on an entry: a link to the content type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub sys: TypeRefSys,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRefSys {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sys {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<TypeRef>,
}

/// Content-type tag attached to every entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentType {
    Page,
    Service,
    HeroBanner,
    ListingDynamic,
    ListingContent,
    RichText,
    Feature,
    Person,
    Partner,
    Testimonial,
    Pricing,
    Cta,
    Navigation,
    NavigationItem,
    Media,
    Other(String),
}

impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Page => "page",
            ContentType::Service => "service",
            ContentType::HeroBanner => "heroBanner",
            ContentType::ListingDynamic => "listingDynamic",
            ContentType::ListingContent => "listingContent",
            ContentType::RichText => "richText",
            ContentType::Feature => "feature",
            ContentType::Person => "person",
            ContentType::Partner => "partner",
            ContentType::Testimonial => "testimonial",
            ContentType::Pricing => "pricing",
            ContentType::Cta => "cta",
            ContentType::Navigation => "navigation",
            ContentType::NavigationItem => "navigationItem",
            ContentType::Media => "media",
            ContentType::Other(other) => other,
        }
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        match s {
            "page" => ContentType::Page,
            "service" => ContentType::Service,
            "heroBanner" => ContentType::HeroBanner,
            "listingDynamic" => ContentType::ListingDynamic,
            "listingContent" => ContentType::ListingContent,
            "richText" => ContentType::RichText,
            "feature" => ContentType::Feature,
            "person" => ContentType::Person,
            "partner" => ContentType::Partner,
            "testimonial" => ContentType::Testimonial,
            "pricing" | "pricingPackage" | "package" => ContentType::Pricing,
            "cta" => ContentType::Cta,
            "navigation" => ContentType::Navigation,
            "navigationItem" => ContentType::NavigationItem,
            "media" | "image" => ContentType::Media,
            other => ContentType::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    Entry,
    Asset,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Entry => "Entry",
            LinkType::Asset => "Asset",
        }
    }
}

/// An unresolved reference to another entry or asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub id: String,
    pub link_type: LinkType,
}

impl Link {
    pub fn entry(id: impl Into<String>) -> Self {
        Link {
            id: id.into(),
            link_type: LinkType::Entry,
        }
    }

    pub fn asset(id: impl Into<String>) -> Self {
        Link {
            id: id.into(),
            link_type: LinkType::Asset,
        }
    }

    /// Reads a `{ "sys": { "type": "Link", ... } }` value. Anything else,
    /// including an already embedded entry, is `None`.
    pub fn from_value(value: &Value) -> Option<Link> {
        let sys = value.get("sys")?;
        if sys.get("type").and_then(Value::as_str) != Some("Link") {
            return None;
        }
        let id = sys.get("id").and_then(Value::as_str)?.to_string();
        let link_type = match sys.get("linkType").and_then(Value::as_str)? {
            "Entry" => LinkType::Entry,
            "Asset" => LinkType::Asset,
            _ => return None,
        };
        Some(Link { id, link_type })
    }

    pub fn to_value(&self) -> Value {
        json!({
            "sys": {
                "type": "Link",
                "linkType": self.link_type.as_str(),
                "id": self.id,
            }
        })
    }
}

/// The `{ sys, fields }` envelope shared by entries and delivery assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub sys: Sys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Entry {
    /// Reads an embedded entry or asset. Links and other shapes are `None`.
    pub fn from_value(value: &Value) -> Option<Entry> {
        let kind = value.get("sys")?.get("type")?.as_str()?;
        if kind != "Entry" && kind != "Asset" {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn is_asset(&self) -> bool {
        self.sys.kind == "Asset"
    }

    pub fn content_type_id(&self) -> Option<&str> {
        self.sys.content_type.as_ref().map(|ct| ct.sys.id.as_str())
    }

    pub fn tag(&self) -> Option<ContentType> {
        self.content_type_id().map(ContentType::from)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn text_or_default(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(Value::as_f64)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.field(name).and_then(Value::as_bool)
    }

    /// The embedded entry behind a link field, if hydration found it.
    pub fn entry(&self, name: &str) -> Option<Entry> {
        self.field(name)
            .and_then(Entry::from_value)
            .filter(|e| !e.is_asset())
    }

    /// Embedded entries of an array field, skipping unresolved links.
    pub fn entries(&self, name: &str) -> Vec<Entry> {
        match self.field(name) {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Entry::from_value)
                .filter(|e| !e.is_asset())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn link(&self, name: &str) -> Option<Link> {
        self.field(name).and_then(Link::from_value)
    }

    /// The embedded asset behind a field, normalised.
    pub fn asset(&self, name: &str) -> Option<Asset> {
        self.field(name)
            .and_then(Entry::from_value)
            .filter(Entry::is_asset)
            .map(|raw| Asset::from_delivery(&raw))
    }
}

/// Response-scoped side-table of linked entries and assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Includes {
    #[serde(rename = "Entry", default)]
    pub entries: Vec<Entry>,
    #[serde(rename = "Asset", default)]
    pub assets: Vec<Entry>,
}

impl Includes {
    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.sys.id == id)
    }

    pub fn asset(&self, id: &str) -> Option<&Entry> {
        self.assets.iter().find(|a| a.sys.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.assets.is_empty()
    }
}

/// One page of results from an entries query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryCollection {
    #[serde(default)]
    pub items: Vec<Entry>,
    #[serde(default)]
    pub includes: Includes,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

/// Asset as returned by the management API: every field is keyed by locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementAsset {
    pub sys: ManagementSys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementSys {
    pub id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_version: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFile {
    pub url: String,
    pub content_type: String,
    pub file_name: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
}

/// A binary resource (usually an image) in delivery shape. Missing
/// sub-fields are empty strings or zero, never absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub title: String,
    pub description: String,
    pub file: AssetFile,
}

impl Asset {
    pub fn from_delivery(raw: &Entry) -> Asset {
        Asset {
            id: raw.sys.id.clone(),
            title: raw.text_or_default("title"),
            description: raw.text_or_default("description"),
            file: file_from_value(raw.field("file")),
        }
    }

    /// Unwraps the configured locale of a management asset.
    pub fn from_management(raw: &ManagementAsset, locale: &str) -> Result<Asset, ResolveError> {
        let title = localized(&raw.fields, "title", locale)?;
        let description = localized(&raw.fields, "description", locale)?;
        let file = localized(&raw.fields, "file", locale)?;

        Ok(Asset {
            id: raw.sys.id.clone(),
            title: title.and_then(Value::as_str).unwrap_or_default().to_string(),
            description: description
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            file: file_from_value(file),
        })
    }

    pub fn has_file(&self) -> bool {
        !self.file.url.is_empty()
    }

    /// Absolute URL. The CMS hands out protocol-relative `//host/path` URLs.
    pub fn https_url(&self) -> String {
        let url = &self.file.url;
        if url.starts_with("//") {
            format!("https:{url}")
        } else {
            url.clone()
        }
    }

    /// Delivery-shaped envelope, used to embed a resolved asset back into a
    /// hydrated entry tree.
    pub fn to_delivery_value(&self) -> Value {
        json!({
            "sys": { "id": self.id, "type": "Asset" },
            "fields": {
                "title": self.title,
                "description": self.description,
                "file": {
                    "url": self.file.url,
                    "contentType": self.file.content_type,
                    "fileName": self.file.file_name,
                    "details": {
                        "size": self.file.size,
                        "image": {
                            "width": self.file.width,
                            "height": self.file.height,
                        }
                    }
                }
            }
        })
    }
}

fn localized<'a>(
    fields: &'a Map<String, Value>,
    field: &str,
    locale: &str,
) -> Result<Option<&'a Value>, ResolveError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(by_locale)) if by_locale.contains_key(locale) => {
            Ok(by_locale.get(locale))
        }
        Some(_) => Err(ResolveError::LocaleMissing {
            field: field.to_string(),
            locale: locale.to_string(),
        }),
    }
}

fn file_from_value(file: Option<&Value>) -> AssetFile {
    let Some(file) = file else {
        return AssetFile::default();
    };
    let text = |key: &str| {
        file.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let dimension = |pointer: &str| {
        file.pointer(pointer)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0)
    };
    AssetFile {
        url: text("url"),
        content_type: text("contentType"),
        file_name: text("fileName"),
        size: file
            .pointer("/details/size")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        width: dimension("/details/image/width"),
        height: dimension("/details/image/height"),
    }
}
