//! mk-render: declarative HTML and CSS projection of a media-kit document.
//!
//! [`Renderer`] turns a [`mk_core::MediaKitState`] into markup; [`css`]
//! emits the matching stylesheet. Rendering never mutates the document,
//! so the same state always produces the same output.

pub mod css;
pub mod html;

pub use css::{section_css, theme_css};
pub use html::{RenderOptions, Renderer, escape_html};
