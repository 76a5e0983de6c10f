use crate::handler::HandlerError;
use crate::model::NodeDoc;
use crate::register_handler;

/// `Code`: user-supplied Python from `pythonCode` (or `code`), emitted as is.
pub fn handle_code(node: &NodeDoc) -> Result<String, HandlerError> {
    let key = if node.param("pythonCode").is_some() {
        "pythonCode"
    } else {
        "code"
    };
    let code = node.require_str(key)?;
    if code.trim().is_empty() {
        return Err(HandlerError::invalid(key, "non-empty Python source"));
    }
    Ok(code.trim_matches('\n').to_string())
}

register_handler!(handle_code);
