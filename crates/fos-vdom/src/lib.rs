//! fOS Virtual DOM
//!
//! Reconciles declarative node descriptions against a live host tree.
//!
//! # Model
//! - [`NodeDesc`]: caller-owned description (tag, attributes, children, key)
//! - [`VElement`]: live counterpart, bound 1:1 to a host element
//! - [`NodeRenderer`]: owns the virtual tree and the key → element map
//!
//! Each [`NodeRenderer::sync`] walks the description depth-first, reusing
//! elements by key, and garbage-collects every key it did not visit.
//!
//! # Example
//! ```rust
//! use fos_dom::DomTree;
//! use fos_vdom::{NodeDesc, NodeRenderer};
//!
//! let list = |keys: &[&str]| {
//!     NodeDesc::new("root", "ul")
//!         .children(keys.iter().map(|k| NodeDesc::new(*k, "li").attr("data-key", *k)))
//! };
//!
//! let mut renderer = NodeRenderer::new(DomTree::new(), &list(&["a", "b", "c"]))?;
//! let stats = renderer.sync(&list(&["c", "a"]))?;
//! assert_eq!(stats.purged, 1);
//! assert_eq!(
//!     renderer.host().to_html(renderer.html()),
//!     r#"<ul><li data-key="c"></li><li data-key="a"></li></ul>"#
//! );
//! # Ok::<(), fos_vdom::RenderError>(())
//! ```

mod arena;
mod config;
mod desc;
mod element;
mod error;
mod generation;
mod host;
mod renderer;

pub use arena::{ElementArena, ElementId};
pub use config::RendererConfig;
pub use desc::{AttrValue, Attributes, Key, NodeDesc};
pub use element::{ElementTree, VElement};
pub use error::{InvalidDescription, InvariantViolation, RenderError, RenderResult};
pub use generation::Generation;
pub use host::HostTree;
pub use renderer::{NodeRenderer, RenderState, SyncStats};
