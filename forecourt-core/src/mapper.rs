//! Content-to-props mapping.
//!
//! Dispatch is on the entry's content-type tag. Listing items fall back to
//! the listing's style hint and then to field sniffing only when their tag is
//! missing or unknown; both fallbacks log a warning so untagged content can
//! be found and fixed in the CMS.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::model::{ContentType, Entry};
use crate::path::{entry_href, PathPolicy};
use crate::props::*;
use crate::rich_text::{document_or_empty, is_document, label_text};

pub const DEFAULT_LISTING_LIMIT: u32 = 8;

#[derive(Debug, Clone, Default)]
pub struct Mapper {
    paths: PathPolicy,
}

impl Mapper {
    pub fn new(paths: PathPolicy) -> Self {
        Mapper { paths }
    }

    pub fn map_body_item(&self, entry: &Entry) -> Option<ComponentProps> {
        let Some(tag) = entry.tag() else {
            warn!(entry_id = %entry.id(), "Body item has no content type, skipping");
            return None;
        };
        debug!(entry_id = %entry.id(), content_type = tag.as_str(), "Mapping body item");

        let props = match tag {
            ContentType::HeroBanner => ComponentProps::HeroBanner(self.hero_banner(entry)),
            ContentType::ListingDynamic => ComponentProps::ListingDynamic(listing_dynamic(entry)),
            ContentType::RichText => ComponentProps::RichText(rich_text(entry, "richText")),
            ContentType::Feature => ComponentProps::Feature(feature(entry)),
            ContentType::ListingContent => {
                ComponentProps::ListingContent(self.listing_content(entry))
            }
            ContentType::Pricing => ComponentProps::Pricing(package(entry)),
            ContentType::Testimonial => ComponentProps::Testimonial(testimonial(entry)),
            ContentType::Partner => ComponentProps::Partner(partner(entry)),
            ContentType::Person => ComponentProps::Person(person(entry)),
            ContentType::Page
            | ContentType::Service
            | ContentType::Cta
            | ContentType::Navigation
            | ContentType::NavigationItem
            | ContentType::Media
            | ContentType::Other(_) => {
                warn!(
                    entry_id = %entry.id(),
                    content_type = tag.as_str(),
                    "Unhandled content type in body"
                );
                return None;
            }
        };
        Some(props)
    }

    /// Props for a service page that has no body array of its own: a header
    /// hero built from the service, then its description.
    pub fn map_service_layout(&self, service: &Entry) -> Vec<ComponentProps> {
        let hero = HeroBannerProps {
            id: service.id().to_string(),
            title: service.text_or_default("name"),
            sub_title: service.text_or_default("shortDescription"),
            image: ImageProps::from_field(service, "featuredImage"),
            icon: ImageProps::from_field(service, "icon"),
            ctas: self.ctas(service, "ctaGroup"),
            variant: HeroVariant::Header,
        };

        let document = match service.field("body").or_else(|| service.field("description")) {
            Some(v) if is_document(v) => v.clone(),
            Some(Value::String(text)) => paragraph_document(text),
            _ => document_or_empty(None),
        };

        vec![
            ComponentProps::HeroBanner(hero),
            ComponentProps::RichText(RichTextProps {
                id: format!("{}-description", service.id()),
                document,
                background: Background::default(),
                alignment: Alignment::default(),
            }),
        ]
    }

    /// Builds a call-to-action; `None` when it links nowhere.
    pub fn cta(&self, entry: &Entry) -> Option<CtaProps> {
        let linked = entry
            .entry("link")
            .and_then(|target| entry_href(&target, &self.paths));
        let href = match linked {
            Some(href) => href,
            None => match entry.text("url").filter(|u| !u.is_empty()) {
                Some(url) => url.to_string(),
                None => {
                    debug!(entry_id = %entry.id(), "CTA has no link target, skipping");
                    return None;
                }
            },
        };
        Some(CtaProps {
            label: label_text(entry.field("label")),
            href,
            style: CtaStyle::from_field(entry, "type"),
            icon: entry.text_or_default("icon"),
            icon_position: IconPosition::from_field(entry, "iconPosition"),
        })
    }

    fn ctas(&self, entry: &Entry, field: &str) -> Vec<CtaProps> {
        entry
            .entries(field)
            .iter()
            .filter_map(|cta| self.cta(cta))
            .collect()
    }

    fn hero_banner(&self, entry: &Entry) -> HeroBannerProps {
        HeroBannerProps {
            id: entry.id().to_string(),
            title: entry.text_or_default("title"),
            sub_title: entry.text_or_default("subTitle"),
            image: ImageProps::from_field(entry, "image"),
            icon: ImageProps::from_field(entry, "icon"),
            ctas: self.ctas(entry, "ctaGroup"),
            variant: HeroVariant::from_field(entry, "type"),
        }
    }

    fn listing_content(&self, entry: &Entry) -> ListingContentProps {
        let style = ListingStyle::from_field(entry, "style");
        let items = entry
            .entries("items")
            .iter()
            .filter_map(|item| classify_listing_item(item, style))
            .collect();
        ListingContentProps {
            id: entry.id().to_string(),
            title: entry.text_or_default("title"),
            sub_title: entry.text_or_default("subTitle"),
            background: Background::from_field(entry, "background"),
            style,
            items,
        }
    }
}

/// Maps one body item with the default path policy.
pub fn map_body_item(entry: &Entry) -> Option<ComponentProps> {
    Mapper::default().map_body_item(entry)
}

fn classify_listing_item(item: &Entry, style: ListingStyle) -> Option<ListingItem> {
    match item.tag() {
        Some(ContentType::Person) => return Some(ListingItem::Person(person(item))),
        Some(ContentType::Pricing) => return Some(ListingItem::Package(package(item))),
        Some(ContentType::Partner) => return Some(ListingItem::Partner(partner(item))),
        Some(ContentType::Testimonial) => {
            return Some(ListingItem::Testimonial(testimonial(item)))
        }
        Some(ContentType::Page)
        | Some(ContentType::Service)
        | Some(ContentType::HeroBanner)
        | Some(ContentType::ListingDynamic)
        | Some(ContentType::ListingContent)
        | Some(ContentType::RichText)
        | Some(ContentType::Feature)
        | Some(ContentType::Cta)
        | Some(ContentType::Navigation)
        | Some(ContentType::NavigationItem)
        | Some(ContentType::Media)
        | Some(ContentType::Other(_))
        | None => {}
    }

    let declared = item.content_type_id().unwrap_or("<none>");
    match style {
        ListingStyle::Pricing => {
            warn!(entry_id = %item.id(), declared, "Listing item classified by listing style");
            return Some(ListingItem::Package(package(item)));
        }
        ListingStyle::Testimonial => {
            warn!(entry_id = %item.id(), declared, "Listing item classified by listing style");
            return Some(ListingItem::Testimonial(testimonial(item)));
        }
        ListingStyle::Card | ListingStyle::Carousel => {}
    }

    let sniffed = if item.has_field("firstName") && item.has_field("lastName") && item.has_field("role")
    {
        Some(ListingItem::Person(person(item)))
    } else if item.has_field("packageName") || item.has_field("price") {
        Some(ListingItem::Package(package(item)))
    } else if item.has_field("name") && item.has_field("logo") {
        Some(ListingItem::Partner(partner(item)))
    } else {
        None
    };

    match &sniffed {
        Some(_) => warn!(entry_id = %item.id(), declared, "Listing item classified by its fields"),
        None => warn!(entry_id = %item.id(), declared, "Unclassifiable listing item dropped"),
    }
    sniffed
}

fn listing_dynamic(entry: &Entry) -> ListingDynamicProps {
    ListingDynamicProps {
        id: entry.id().to_string(),
        title: entry.text_or_default("title"),
        sub_title: entry.text_or_default("subTitle"),
        listing: DynamicListing::from_field(entry, "listingContent"),
        limit: entry
            .number("limit")
            .filter(|n| *n >= 1.0)
            .map(|n| n as u32)
            .unwrap_or(DEFAULT_LISTING_LIMIT),
        pagination: entry.flag("pagination").unwrap_or(false),
        cards: Vec::new(),
    }
}

fn rich_text(entry: &Entry, field: &str) -> RichTextProps {
    RichTextProps {
        id: entry.id().to_string(),
        document: document_or_empty(entry.field(field)),
        background: Background::from_field(entry, "background"),
        alignment: Alignment::from_field(entry, "alignment"),
    }
}

fn feature(entry: &Entry) -> FeatureProps {
    FeatureProps {
        id: entry.id().to_string(),
        title: entry.text_or_default("title"),
        body: document_or_empty(entry.field("body")),
        media: ImageProps::from_field(entry, "media"),
        alignment: Alignment::from_field(entry, "alignment"),
        background: Background::from_field(entry, "background"),
        media_size: MediaSize::from_field(entry, "mediaSize"),
    }
}

fn person(entry: &Entry) -> PersonProps {
    PersonProps {
        id: entry.id().to_string(),
        first_name: entry.text_or_default("firstName"),
        last_name: entry.text_or_default("lastName"),
        role: entry.text_or_default("role"),
        internal: entry.flag("internal").unwrap_or(false),
        linked_in: entry.text_or_default("linkedIn"),
        bio: document_or_empty(entry.field("bio")),
        image: ImageProps::from_field(entry, "image"),
    }
}

fn package(entry: &Entry) -> PackageProps {
    let items = match entry.field("items") {
        Some(Value::Array(lines)) => lines.iter().filter_map(package_line).collect(),
        _ => Vec::new(),
    };
    PackageProps {
        id: entry.id().to_string(),
        package_name: entry.text_or_default("packageName"),
        tagline: entry.text_or_default("tagline"),
        price: scalar_text(entry.field("price")),
        items,
    }
}

/// Package lines are authored as JSON objects, plain strings or linked
/// entries with the same fields.
fn package_line(value: &Value) -> Option<PackageLine> {
    if let Some(line) = Entry::from_value(value) {
        return Some(PackageLine {
            label: line.text_or_default("label"),
            value: scalar_text(line.field("value")),
            value_type: PackageValueType::from_field(&line, "valueType"),
        });
    }
    match value {
        Value::String(label) => Some(PackageLine {
            label: label.clone(),
            value: String::new(),
            value_type: PackageValueType::default(),
        }),
        Value::Object(map) => Some(PackageLine {
            label: scalar_text(map.get("label")),
            value: scalar_text(map.get("value")),
            value_type: map
                .get("valueType")
                .or_else(|| map.get("type"))
                .and_then(Value::as_str)
                .map(PackageValueType::from)
                .unwrap_or_default(),
        }),
        _ => None,
    }
}

fn partner(entry: &Entry) -> PartnerProps {
    PartnerProps {
        id: entry.id().to_string(),
        name: entry.text_or_default("name"),
        logo: ImageProps::from_field(entry, "logo"),
        logo_light: ImageProps::from_field(entry, "logoLight"),
        url: entry.text_or_default("url"),
    }
}

pub(crate) fn testimonial(entry: &Entry) -> TestimonialProps {
    TestimonialProps {
        id: entry.id().to_string(),
        name: entry.text_or_default("name"),
        role: entry.text_or_default("role"),
        organisation: entry.text_or_default("organisation"),
        quote: document_or_empty(entry.field("quote")),
        rating: entry
            .number("rating")
            .map(|r| r.clamp(0.0, 5.0) as u8)
            .unwrap_or(0),
        person_image: ImageProps::from_field(entry, "personImage"),
        organisation_image: ImageProps::from_field(entry, "organisationImage"),
        active: entry.flag("active").unwrap_or(true),
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn paragraph_document(text: &str) -> Value {
    json!({
        "nodeType": "document",
        "data": {},
        "content": [{
            "nodeType": "paragraph",
            "data": {},
            "content": [{ "nodeType": "text", "value": text, "marks": [], "data": {} }]
        }]
    })
}
