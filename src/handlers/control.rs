use serde_json::json;

use crate::handler::HandlerError;
use crate::model::NodeDoc;
use crate::python;
use crate::register_handler;
use crate::template;

const BRANCH: &str = r#"if {{condition}}:
    print({{py on_true}})
else:
    print({{py on_false}})"#;

fn condition(variable: &str, operator: &str, value: &str) -> Result<String, HandlerError> {
    let condition = match operator {
        "equals" | "==" => format!("{variable} == {value}"),
        "notEquals" | "!=" => format!("{variable} != {value}"),
        "larger" | ">" => format!("{variable} > {value}"),
        "largerEqual" | ">=" => format!("{variable} >= {value}"),
        "smaller" | "<" => format!("{variable} < {value}"),
        "smallerEqual" | "<=" => format!("{variable} <= {value}"),
        "contains" => format!("{value} in {variable}"),
        "notContains" => format!("{value} not in {variable}"),
        _ => {
            return Err(HandlerError::invalid(
                "operator",
                "one of equals, notEquals, larger, largerEqual, smaller, smallerEqual, contains, notContains",
            ));
        }
    };
    Ok(condition)
}

/// `If`: compares `variable` against `value` and prints which branch ran.
pub fn handle_if(node: &NodeDoc) -> Result<String, HandlerError> {
    let variable = node.require_str("variable")?;
    if !python::is_identifier(variable) {
        return Err(HandlerError::invalid("variable", "a Python identifier"));
    }
    let value = python::literal(node.require("value")?);
    let operator = node.str_or("operator", "equals")?;
    let condition = condition(variable, operator, &value)?;
    template::render(
        BRANCH,
        &json!({
            "condition": condition,
            "on_true": node.str_or("true_message", "Condition met")?,
            "on_false": node.str_or("false_message", "Condition not met")?,
        }),
    )
}

/// `No Op`: a placeholder statement.
pub fn handle_no_op(_node: &NodeDoc) -> Result<String, HandlerError> {
    Ok("pass".to_string())
}

/// `Manual Trigger`: the program entry point; announces the run.
pub fn handle_manual_trigger(node: &NodeDoc) -> Result<String, HandlerError> {
    let message = node.str_or("message", "Workflow started")?;
    Ok(format!("print({})", python::string_literal(message)))
}

register_handler!(handle_if, handle_no_op, handle_manual_trigger);
