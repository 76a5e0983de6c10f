use serde_json::json;

use crate::handler::HandlerError;
use crate::model::NodeDoc;
use crate::register_handler;
use crate::template;

const DELAY: &str = r#"import time

print("Delaying for {{label}} seconds...")
time.sleep({{seconds}})"#;

/// `Delay`: sleeps for `seconds`, or `amount` in `unit` (seconds, minutes, hours).
pub fn handle_delay(node: &NodeDoc) -> Result<String, HandlerError> {
    let seconds = if node.param("seconds").is_some() {
        node.require_number("seconds")?
    } else {
        let amount = node.require_number("amount")?;
        let factor = match node.str_or("unit", "seconds")? {
            "seconds" => 1.0,
            "minutes" => 60.0,
            "hours" => 3600.0,
            _ => return Err(HandlerError::invalid("unit", "seconds, minutes or hours")),
        };
        amount * factor
    };
    if seconds < 0.0 {
        return Err(HandlerError::invalid("seconds", "non-negative"));
    }
    let label = format_seconds(seconds);
    template::render(DELAY, &json!({ "label": label, "seconds": label }))
}

fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 && seconds < 1e15 {
        format!("{}", seconds as u64)
    } else {
        format!("{seconds}")
    }
}

register_handler!(handle_delay);
