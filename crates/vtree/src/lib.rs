#![forbid(unsafe_code)]

//! Virtual tree engine
//!
//! Turns a nested forest into a flat, indexable list that a virtualized list
//! view can render one window at a time, and keeps the interactive state on
//! top of it: collapsed nodes, ordered path search, match navigation, and
//! scroll targeting.
//!
//! # Key Components
//!
//! - [`SourceNode`] - Input forest node (`id`, `name`, `children`)
//! - [`FlatTree`] - Pre-order arena of [`TreeData`] records with contiguous descendant ranges
//! - [`Visibility`] - Collapsed set and the visible subsequence
//! - [`search`](search::search) - Delimiter-separated regex path search
//! - [`Viewport`] - On-screen range and scroll requests
//! - [`VirtualTree`] - The session tying everything together, reporting to a [`TreeHost`]
//!
//! # How it fits together
//! The host hands a forest to [`VirtualTree`], renders [`VirtualTree::rows`]
//! for whatever window it shows, and feeds back toggles, pattern edits, and
//! range changes. The engine answers through [`TreeHost`] callbacks: toggles,
//! selections, search summaries, and scroll requests. Rendering itself stays
//! with the host.
//!
//! # Feature Flags
//!
//! - `serde`: serde derives on the public data types
//! - `state-persistence`: serializable [`TreePersistState`]
//! - `config`: load [`TreeConfig`] from TOML or JSON

pub mod config;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod navigation;
pub mod node;
pub mod persist;
pub mod search;
pub mod viewport;
pub mod visibility;

pub use config::{SearchConfig, TreeConfig, ViewportConfig};
pub use engine::{RowView, TreeHost, VirtualTree};
pub use error::{ConfigError, Result};
pub use flatten::{FlatTree, TreeData, flatten};
pub use navigation::{NavState, SearchNav, SearchSummary};
pub use node::{SourceId, SourceNode};
pub use persist::TreePersistState;
pub use search::{CompiledPattern, SearchMatch, SearchOptions};
pub use viewport::{ScrollAlign, ScrollBehavior, ScrollRequest, Viewport};
pub use visibility::Visibility;
