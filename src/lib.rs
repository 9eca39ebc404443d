//! Scrapes sponsored listings from a retail search-results page, cleans
//! them into typed records and summarizes them.
//!
//! Flow: [`pipeline::Scraper`] fetches pages through a [`fetcher::Fetch`]
//! and extracts [`models::SponsoredRecord`]s with [`parser::ListingParser`];
//! [`cleaner::clean`] turns those into [`models::CleanedRecord`]s, which
//! [`analysis`] and [`report`] consume.

pub mod analysis;
pub mod archiver;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod pacing;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod selectors;
