// src/types/mod.rs
pub mod document;
pub mod response;
