//! Watches a GitHub user's repositories and reports when watcher, open issue
//! or fork counts rise or fall between polls.

pub mod app_init;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod event;
pub mod id;
pub mod logging;
pub mod notice_service;
pub mod result;
pub mod stores;
