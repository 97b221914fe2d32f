//! Folio renders structured blog content (headings, prose, lists, code and
//! link lists) into sanitised documents and serves them through a small
//! preview shell.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
