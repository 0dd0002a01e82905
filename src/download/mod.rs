// src/download/mod.rs
// =============================================================================
// This module saves the resolved ebook files into the target directory.
//
// Currently implements:
// - Local filename from the file URL, with optional kepub renaming
// - A sorted download plan, one file per local path (also printed by --dry-run)
// - Sequential, rate-limited downloads
// =============================================================================

mod files;

pub use files::{download_all, plan_downloads, resolve_dir, write_plan};
