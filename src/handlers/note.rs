use serde_json::json;

use crate::handler::HandlerError;
use crate::model::NodeDoc;
use crate::register_handler;
use crate::template;

/// `Sticky Note`: carries the note text over as comments.
pub fn handle_sticky_note(node: &NodeDoc) -> Result<String, HandlerError> {
    let content = node.str_or("content", "")?;
    template::render("{{comment content}}", &json!({ "content": content }))
}

register_handler!(handle_sticky_note);
