#![doc = "forecourt-core: content resolution pipeline for the forecourt site."]

//! Fetches entry graphs from the CMS, repairs missing asset links, rebuilds
//! hierarchical paths and maps entries into the props the site renders.
//!
//! # Usage
//! Build a [`client::ContentClient`] from [`config::Credentials`] and
//! [`config::SiteSettings`], then call [`page::serve_page`] per request, or
//! [`sitemap::generate_sitemap`] and [`navigation::fetch_site_navigation`]
//! for the site-wide pieces.

pub mod client;
pub mod config;
pub mod contract;
pub mod delivery;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod listing;
pub mod management;
pub mod mapper;
pub mod model;
pub mod navigation;
pub mod page;
pub mod path;
pub mod props;
pub mod resolve;
pub mod rich_text;
pub mod sitemap;
