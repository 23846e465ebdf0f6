//! Core state and geometry for the signcraft signage composer.
//!
//! This crate owns the non-drawing half of the composition engine:
//! - catalog configuration loaded once per session ([`config`]),
//! - the coordinate spaces and fitting math ([`geometry`]),
//! - the live layout model with its two-mode font scaling ([`layout`]),
//! - pointer gesture handling with board clamping ([`gesture`]),
//! - session wiring and the boundary types exchanged with the storefront
//!   backend and cart subsystem ([`session`]).
//!
//! Rendering lives in `signcraft-raster`, which consumes the
//! [`session::DesignSnapshot`] produced here.

pub mod config;
pub mod error;
pub mod gesture;
pub mod geometry;
pub mod layout;
pub mod net;
pub mod session;

pub use config::{FontChoice, SignageConfig, SizeKey, SizePreset};
pub use error::{SignError, SignResult};
pub use gesture::{GestureController, LivePreview, PointerEvent};
pub use geometry::{board_bounds, contain_fit, cover_crop, ContainFit, Rect, Size2, Vec2, ViewTransform};
pub use layout::{BackgroundKind, BackgroundState, LayoutState, ScaleMode};
pub use session::{
    BackgroundSpec, CartSubmission, DesignDocument, DesignSnapshot, EditorSession, SignageData,
    TextLine, TextSpan,
};
