use serde_json::json;

use crate::handler::HandlerError;
use crate::model::NodeDoc;
use crate::register_handler;
use crate::template;

const ASSIGN: &str = "{{ident variable}} = {{py value}}";

/// `Set`: assigns `value` to `variable` (default `name`), or every entry of a
/// `values` object in authored order.
pub fn handle_set(node: &NodeDoc) -> Result<String, HandlerError> {
    if let Some(values) = node.param("values") {
        let map = values
            .as_object()
            .filter(|map| !map.is_empty())
            .ok_or_else(|| HandlerError::invalid("values", "a non-empty object"))?;
        let lines = map
            .iter()
            .map(|(variable, value)| {
                template::render(ASSIGN, &json!({ "variable": variable, "value": value }))
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(lines.join("\n"));
    }
    let value = node.require("value")?;
    let variable = node.str_or("variable", "name")?;
    template::render(ASSIGN, &json!({ "variable": variable, "value": value }))
}

register_handler!(handle_set);
