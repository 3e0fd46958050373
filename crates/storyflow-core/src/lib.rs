//! Storyflow Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Storyflow layout
//! pipeline and its tooling:
//!
//! - **Identifiers**: String-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Points, sizes and bounding boxes ([`geometry`] module)
//! - **Story**: The story document model ([`story`] module)

pub mod geometry;
pub mod identifier;
pub mod story;
