use handlebars::{
    Context, Handlebars, Helper, HelperDef, Output, RenderContext, RenderError, RenderErrorReason,
};
use serde::Serialize;
use serde_json::Value;

use crate::handler::HandlerError;
use crate::python;

lazy_static::lazy_static! {
    static ref RENDERER: SnippetRenderer = SnippetRenderer::new();
}

/// Render a Python snippet template with the shared renderer.
pub fn render<T: Serialize>(template: &str, data: &T) -> Result<String, HandlerError> {
    RENDERER.render(template, data)
}

/// Handlebars renderer for Python snippets.
///
/// HTML escaping is off. Helpers: `py` (JSON value as a Python literal),
/// `ident` (checked Python identifier), `comment` (text as `# ` lines).
pub struct SnippetRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for SnippetRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SnippetRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(|s| s.to_string());
        handlebars.register_helper("py", Box::new(PyHelper));
        handlebars.register_helper("ident", Box::new(IdentHelper));
        handlebars.register_helper("comment", Box::new(CommentHelper));
        Self { handlebars }
    }

    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, HandlerError> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| HandlerError::Render {
                message: render_error_message(&e),
            })
    }
}

fn render_error_message(err: &RenderError) -> String {
    match err.reason() {
        RenderErrorReason::Other(message) => message.clone(),
        _ => err.to_string(),
    }
}

struct PyHelper;

impl HelperDef for PyHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        helper: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> std::result::Result<(), RenderError> {
        let value = helper
            .param(0)
            .map(|p| p.value().clone())
            .ok_or_else(|| helper_error("py helper expects 1 parameter"))?;
        out.write(&python::literal(&value))?;
        Ok(())
    }
}

struct IdentHelper;

impl HelperDef for IdentHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        helper: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> std::result::Result<(), RenderError> {
        let value = helper
            .param(0)
            .map(|p| p.value().clone())
            .ok_or_else(|| helper_error("ident helper expects 1 parameter"))?;
        match value {
            Value::String(name) if python::is_identifier(&name) => {
                out.write(&name)?;
                Ok(())
            }
            other => Err(helper_error(&format!(
                "{other} is not a valid Python identifier"
            ))),
        }
    }
}

struct CommentHelper;

impl HelperDef for CommentHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        helper: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> std::result::Result<(), RenderError> {
        let text = match helper.param(0).map(|p| p.value().clone()) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        out.write(&python::comment_block(&text))?;
        Ok(())
    }
}

fn helper_error(message: &str) -> RenderError {
    RenderErrorReason::Other(message.to_string()).into()
}
