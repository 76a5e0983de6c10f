use serde_json::json;

use crate::handler::HandlerError;
use crate::model::NodeDoc;
use crate::register_handler;
use crate::template;

const SLACK: &str = r#"import requests

payload = {{py payload}}
response = requests.post({{py webhook_url}}, json=payload)
print(response.status_code)"#;

/// `Send Slack Message`: posts `text` to an incoming-webhook URL.
pub fn handle_send_slack_message(node: &NodeDoc) -> Result<String, HandlerError> {
    let webhook_url = node.require_str("webhook_url")?;
    let text = node.require_str("text")?;
    let mut payload = json!({ "text": text });
    if let Some(channel) = node.param("channel") {
        let channel = channel
            .as_str()
            .ok_or_else(|| HandlerError::invalid("channel", "a string"))?;
        payload["channel"] = json!(channel);
    }
    template::render(
        SLACK,
        &json!({ "payload": payload, "webhook_url": webhook_url }),
    )
}

register_handler!(handle_send_slack_message);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn posts_payload_to_webhook() {
        let node = NodeDoc::new("Send Slack Message", "Send Slack Message")
            .with_param("webhook_url", json!("https://hooks.slack.com/services/T/B/X"))
            .with_param("text", json!("Hello, Alice!"));
        assert_eq!(
            handle_send_slack_message(&node).unwrap(),
            "import requests\n\n\
             payload = {\"text\": \"Hello, Alice!\"}\n\
             response = requests.post(\"https://hooks.slack.com/services/T/B/X\", json=payload)\n\
             print(response.status_code)"
        );
    }

    #[test]
    fn webhook_is_required() {
        let node = NodeDoc::new("Notify", "Send Slack Message").with_param("text", json!("hi"));
        assert_eq!(
            handle_send_slack_message(&node).unwrap_err(),
            HandlerError::missing("webhook_url")
        );
    }
}
