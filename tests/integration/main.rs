//! Integration tests for Flickr-Harvest

mod common;
mod harvest_tests;
