pub mod auth;
pub mod query_cache;
pub mod roster_service;
pub mod sector_form;
pub mod sector_service;
pub mod sector_tree;
pub mod session;
pub mod tree_view;

#[cfg(test)]
mod fixtures;
