//! Typed component props handed to the presentation layer as JSON.
//!
//! Every field has a concrete value after mapping: strings default to `""`,
//! lists to `[]`, documents to the empty rich-text document, and enums to a
//! named default. Images are the only optional values and are left out of the
//! serialised output when absent, so no prop ever carries a `null`.

use serde::Serialize;
use serde_json::Value;

use crate::listing::ListingCard;
use crate::model::{Asset, Entry};

/// Parses a CMS select value, falling back to the enum default.
macro_rules! select_field {
    ($name:ident { $($value:literal => $variant:ident),+ $(,)? }) => {
        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $($value => $name::$variant,)+
                    _ => $name::default(),
                }
            }
        }

        impl $name {
            pub fn from_field(entry: &Entry, field: &str) -> Self {
                entry.text(field).map($name::from).unwrap_or_default()
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Background {
    #[default]
    Light,
    Dark,
}
select_field!(Background { "Light" => Light, "Dark" => Dark });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}
select_field!(Alignment { "Left" => Left, "Center" => Center, "Centre" => Center, "Right" => Right });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MediaSize {
    Small,
    #[default]
    Medium,
    Large,
}
select_field!(MediaSize { "Small" => Small, "Medium" => Medium, "Large" => Large });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum HeroVariant {
    #[default]
    FullPage,
    Header,
}
select_field!(HeroVariant { "Full Page" => FullPage, "FullPage" => FullPage, "Header" => Header });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CtaStyle {
    #[default]
    Primary,
    Secondary,
    Link,
}
select_field!(CtaStyle { "Primary" => Primary, "Secondary" => Secondary, "Link" => Link });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum IconPosition {
    #[default]
    Left,
    Right,
}
select_field!(IconPosition { "Left" => Left, "Right" => Right });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ListingStyle {
    #[default]
    Card,
    Carousel,
    Pricing,
    Testimonial,
}
select_field!(ListingStyle {
    "Card" => Card,
    "Carousel" => Carousel,
    "Pricing" => Pricing,
    "Testimonial" => Testimonial,
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DynamicListing {
    #[default]
    Services,
    Articles,
    Testimonials,
}
select_field!(DynamicListing {
    "Services" => Services,
    "Articles" => Articles,
    "Testimonials" => Testimonials,
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PackageValueType {
    #[default]
    Text,
    Icon,
}
select_field!(PackageValueType { "Text" => Text, "Icon" => Icon });

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    pub url: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
    pub content_type: String,
}

impl ImageProps {
    pub fn from_asset(asset: &Asset, alt: Option<&str>) -> Option<ImageProps> {
        if !asset.has_file() {
            return None;
        }
        let fallback = if asset.description.is_empty() {
            asset.title.as_str()
        } else {
            asset.description.as_str()
        };
        let alt = alt.filter(|a| !a.is_empty()).unwrap_or(fallback);
        Some(ImageProps {
            url: asset.https_url(),
            alt: alt.to_string(),
            width: asset.file.width,
            height: asset.file.height,
            content_type: asset.file.content_type.clone(),
        })
    }

    /// Reads an image field that holds either an asset directly or a media
    /// entry wrapping one (`altText` + `image`).
    pub fn from_field(entry: &Entry, field: &str) -> Option<ImageProps> {
        if let Some(asset) = entry.asset(field) {
            return ImageProps::from_asset(&asset, None);
        }
        let media = entry.entry(field)?;
        let asset = media.asset("image")?;
        ImageProps::from_asset(&asset, media.text("altText"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaProps {
    pub label: String,
    pub href: String,
    pub style: CtaStyle,
    pub icon: String,
    pub icon_position: IconPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroBannerProps {
    pub id: String,
    pub title: String,
    pub sub_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageProps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<ImageProps>,
    pub ctas: Vec<CtaProps>,
    pub variant: HeroVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDynamicProps {
    pub id: String,
    pub title: String,
    pub sub_title: String,
    pub listing: DynamicListing,
    pub limit: u32,
    pub pagination: bool,
    /// Filled in when the page is resolved; empty straight out of the mapper.
    pub cards: Vec<ListingCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RichTextProps {
    pub id: String,
    pub document: Value,
    pub background: Background,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProps {
    pub id: String,
    pub title: String,
    pub body: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<ImageProps>,
    pub alignment: Alignment,
    pub background: Background,
    pub media_size: MediaSize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonProps {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub internal: bool,
    pub linked_in: String,
    pub bio: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageProps>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageLine {
    pub label: String,
    pub value: String,
    pub value_type: PackageValueType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageProps {
    pub id: String,
    pub package_name: String,
    pub tagline: String,
    pub price: String,
    pub items: Vec<PackageLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerProps {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<ImageProps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_light: Option<ImageProps>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialProps {
    pub id: String,
    pub name: String,
    pub role: String,
    pub organisation: String,
    pub quote: Value,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_image: Option<ImageProps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organisation_image: Option<ImageProps>,
    pub active: bool,
}

/// One item of a content listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ListingItem {
    Person(PersonProps),
    Package(PackageProps),
    Partner(PartnerProps),
    Testimonial(TestimonialProps),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingContentProps {
    pub id: String,
    pub title: String,
    pub sub_title: String,
    pub background: Background,
    pub style: ListingStyle,
    pub items: Vec<ListingItem>,
}

/// A body item ready to render, tagged with the component that renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "component", rename_all = "camelCase")]
pub enum ComponentProps {
    HeroBanner(HeroBannerProps),
    ListingDynamic(ListingDynamicProps),
    RichText(RichTextProps),
    Feature(FeatureProps),
    ListingContent(ListingContentProps),
    Pricing(PackageProps),
    Testimonial(TestimonialProps),
    Partner(PartnerProps),
    Person(PersonProps),
}

impl ComponentProps {
    pub fn component(&self) -> &'static str {
        match self {
            ComponentProps::HeroBanner(_) => "heroBanner",
            ComponentProps::ListingDynamic(_) => "listingDynamic",
            ComponentProps::RichText(_) => "richText",
            ComponentProps::Feature(_) => "feature",
            ComponentProps::ListingContent(_) => "listingContent",
            ComponentProps::Pricing(_) => "pricing",
            ComponentProps::Testimonial(_) => "testimonial",
            ComponentProps::Partner(_) => "partner",
            ComponentProps::Person(_) => "person",
        }
    }
}
