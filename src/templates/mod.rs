//! Named HTML/CSS templates and the placeholder engine that fills them.

mod engine;
mod registry;

pub use engine::{render_template, substitute, variables_from, ComponentRenderer, Variables};
pub use registry::{Template, TemplateKind, TemplateRegistry};
