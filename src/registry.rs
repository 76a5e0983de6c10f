//! Node-type → handler registry.
//!
//! Handler units announce themselves with [`register_handler!`](crate::register_handler);
//! nothing lists them centrally. The dispatch key is derived from the function
//! name (`handle_send_slack_message` → `Send Slack Message`).
//!
//! Discovered entries are registered in `(module path, function name)` order.
//! When two handlers derive the same key the later registration wins and the
//! collision is recorded and logged.

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

use crate::handler::{Handler, HandlerFn};

/// A handler submitted through [`register_handler!`](crate::register_handler).
pub struct HandlerEntry {
    pub fn_name: &'static str,
    pub module: &'static str,
    pub generate: HandlerFn,
}

inventory::collect!(HandlerEntry);

/// Register one or more `handle_<type_key>` functions with the global registry.
#[macro_export]
macro_rules! register_handler {
    ($($handler:ident),+ $(,)?) => {
        $(
            $crate::inventory::submit! {
                $crate::registry::HandlerEntry {
                    fn_name: stringify!($handler),
                    module: module_path!(),
                    generate: $handler,
                }
            }
        )+
    };
}

lazy_static::lazy_static! {
    static ref GLOBAL: HandlerRegistry = HandlerRegistry::discover();
}

/// Derive a dispatch key from a handler function name.
///
/// Returns `None` when the name has no words left after dropping the prefix.
pub fn handler_key(fn_name: &str) -> Option<String> {
    let stem = fn_name.strip_prefix("handle_").unwrap_or(fn_name);
    let words: Vec<String> = stem
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Two registrations that derived the same key; `replacement` is the one kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCollision {
    pub key: String,
    pub replaced: String,
    pub replacement: String,
}

struct Registration {
    source: String,
    handler: Arc<dyn Handler>,
}

pub struct HandlerRegistry {
    handlers: IndexMap<String, Registration>,
    collisions: Vec<KeyCollision>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    /// Build a registry from every handler announced with `register_handler!`.
    pub fn discover() -> Self {
        Self::builder().discovered().build()
    }

    /// Process-wide registry of discovered handlers, built on first use.
    pub fn global() -> &'static HandlerRegistry {
        &GLOBAL
    }

    pub fn lookup(&self, node_type: &str) -> Option<&dyn Handler> {
        self.handlers
            .get(node_type)
            .map(|registration| registration.handler.as_ref())
    }

    /// Name of the function bound to `node_type`, as `module::fn_name`.
    pub fn source_of(&self, node_type: &str) -> Option<&str> {
        self.handlers
            .get(node_type)
            .map(|registration| registration.source.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: IndexMap<String, Registration>,
    collisions: Vec<KeyCollision>,
}

impl HandlerRegistryBuilder {
    /// Add every discovered entry, ordered by module path then function name.
    pub fn discovered(mut self) -> Self {
        let mut entries: Vec<&'static HandlerEntry> = inventory::iter::<HandlerEntry>
            .into_iter()
            .collect();
        entries.sort_by(|a, b| (a.module, a.fn_name).cmp(&(b.module, b.fn_name)));
        for entry in entries {
            let source = format!("{}::{}", entry.module, entry.fn_name);
            self = self.insert_named(entry.fn_name, source, Arc::new(entry.generate));
        }
        self
    }

    /// Register a handler under the key derived from `fn_name`.
    pub fn register(self, fn_name: &str, handler: impl Handler + 'static) -> Self {
        self.insert_named(fn_name, fn_name.to_string(), Arc::new(handler))
    }

    /// Register a handler under an explicit dispatch key.
    pub fn register_key(
        mut self,
        key: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> Self {
        let key = key.into();
        let source = key.clone();
        self.insert(key, source, Arc::new(handler));
        self
    }

    pub fn build(self) -> HandlerRegistry {
        tracing::debug!(
            handlers = self.handlers.len(),
            collisions = self.collisions.len(),
            "handler registry built"
        );
        HandlerRegistry {
            handlers: self.handlers,
            collisions: self.collisions,
        }
    }

    fn insert_named(mut self, fn_name: &str, source: String, handler: Arc<dyn Handler>) -> Self {
        match handler_key(fn_name) {
            Some(key) => self.insert(key, source, handler),
            None => tracing::warn!(handler = %source, "handler name yields an empty key; skipped"),
        }
        self
    }

    fn insert(&mut self, key: String, source: String, handler: Arc<dyn Handler>) {
        let registration = Registration {
            source: source.clone(),
            handler,
        };
        if let Some(previous) = self.handlers.insert(key.clone(), registration) {
            tracing::warn!(
                key = %key,
                replaced = %previous.source,
                replacement = %source,
                "handler key collision; last registration wins"
            );
            self.collisions.push(KeyCollision {
                key,
                replaced: previous.source,
                replacement: source,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerError;
    use crate::model::NodeDoc;

    fn fixed(code: &'static str) -> impl Handler {
        move |_: &NodeDoc| Ok::<_, HandlerError>(code.to_string())
    }

    #[test]
    fn keys_are_title_cased_words() {
        assert_eq!(
            handler_key("handle_send_slack_message").as_deref(),
            Some("Send Slack Message")
        );
        assert_eq!(handler_key("handle_http_request").as_deref(), Some("Http Request"));
        assert_eq!(handler_key("handle_set").as_deref(), Some("Set"));
        assert_eq!(handler_key("sticky-note").as_deref(), Some("Sticky Note"));
        assert_eq!(handler_key("handle_IF").as_deref(), Some("If"));
        assert_eq!(handler_key("handle_send__message").as_deref(), Some("Send Message"));
        assert_eq!(handler_key("handle_"), None);
        assert_eq!(handler_key("handle___"), None);
    }

    #[test]
    fn later_registration_wins_and_is_recorded() {
        let registry = HandlerRegistry::builder()
            .register("handle_send_message", fixed("first()"))
            .register("handle_Send_Message", fixed("second()"))
            .build();
        let node = NodeDoc::new("Notify", "Send Message");
        let handler = registry.lookup("Send Message").unwrap();
        assert_eq!(handler.generate(&node).unwrap(), "second()");
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.collisions(),
            &[KeyCollision {
                key: "Send Message".to_string(),
                replaced: "handle_send_message".to_string(),
                replacement: "handle_Send_Message".to_string(),
            }]
        );
    }

    #[test]
    fn missing_type_is_not_an_error() {
        let registry = HandlerRegistry::builder().build();
        assert!(registry.is_empty());
        assert!(registry.lookup("Unknown Type").is_none());
    }

    #[test]
    fn global_registry_covers_builtin_catalog() {
        let registry = HandlerRegistry::global();
        for key in [
            "Set",
            "If",
            "Delay",
            "Send Slack Message",
            "Sticky Note",
            "Http Request",
            "Code",
            "No Op",
            "Manual Trigger",
        ] {
            assert!(registry.lookup(key).is_some(), "missing builtin handler {key}");
        }
        assert!(registry.collisions().is_empty());
    }

    #[test]
    fn explicit_keys_bypass_derivation() {
        let registry = HandlerRegistry::builder()
            .register_key("n8n-nodes-base.noOp", fixed("pass"))
            .build();
        assert!(registry.lookup("n8n-nodes-base.noOp").is_some());
        assert_eq!(registry.source_of("n8n-nodes-base.noOp"), Some("n8n-nodes-base.noOp"));
    }
}
