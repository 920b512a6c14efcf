//! Config types for rule loading.
//!
//! A rules document is a list of `(pattern, namespace?, action)` entries where each action is a
//! [`TypedConfig`]: a type URL resolved through the [`ActionRegistry`](crate::ActionRegistry) plus
//! an opaque payload deserialized as that action's own config type.
//!
//! ```yaml
//! rules:
//!   - pattern: "library"
//!     action: { type_url: xbind.core.v1.ObjectCreate, config: { factory: library } }
//!   - pattern: "*/book"
//!     action: { type_url: xbind.core.v1.CallMethod, config: { method: Library.add, params: 1, call: add } }
//!   - pattern: "*/book"
//!     action: { type_url: xbind.core.v1.CallParam, config: { call: add, index: 0, from: { attribute: title } } }
//! ```
//!
//! The per-action payloads below are what [`register_core_actions`](crate::register_core_actions)
//! registers. Names (`factory`, `method`, `setter`, `constructor`) refer to entries of a
//! [`Catalog`](crate::Catalog).

use serde::Deserialize;
use std::collections::HashMap;

/// A complete rules document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesConfig {
    /// Rules in registration order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// One pattern/action binding.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    /// Element path pattern (`a/b`, `*/b`).
    pub pattern: String,
    /// Namespace URI the element must be in; absent matches any namespace.
    #[serde(default)]
    pub namespace: Option<String>,
    /// The action to bind.
    pub action: TypedConfig,
}

/// Reference to a registered type with its configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TypedConfig {
    /// The type URL identifying the registered action type.
    pub type_url: String,
    /// Type-specific configuration payload.
    #[serde(default = "default_config")]
    pub config: serde_json::Value,
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Empty configuration for action types that need none.
///
/// Accepts any JSON value (`{}`, `null`, etc.) and ignores it.
#[derive(Debug, Clone, Copy)]
pub struct UnitConfig;

impl<'de> Deserialize<'de> for UnitConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(UnitConfig)
    }
}

fn yes() -> bool {
    true
}

// ═══════════════════════════════════════════════════════════════════════════════
// Built-in action payloads
// ═══════════════════════════════════════════════════════════════════════════════

/// Payload for `xbind.core.v1.ObjectCreate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectCreateConfig {
    /// Default factory.
    pub factory: String,
    /// Attribute whose value names a different factory.
    #[serde(default)]
    pub override_attribute: Option<String>,
}

/// Payload for `xbind.core.v1.SetProperties`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetPropertiesConfig {
    /// Property setter.
    pub setter: String,
    /// Attribute → property renames.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Attributes never copied.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Skip attributes without a property instead of failing.
    #[serde(default = "yes")]
    pub ignore_missing: bool,
}

/// Payload for `xbind.core.v1.SetProperty`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetPropertyConfig {
    /// Property setter.
    pub setter: String,
    /// Attribute holding the property name.
    #[serde(default)]
    pub name_attribute: Option<String>,
    /// Attribute holding the value.
    #[serde(default)]
    pub value_attribute: Option<String>,
}

/// Payload for `xbind.core.v1.BeanPropertySetter`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeanPropertyConfig {
    /// Property setter.
    pub setter: String,
    /// Fixed property name; defaults to the element's local name.
    #[serde(default)]
    pub property: Option<String>,
    #[serde(default = "yes")]
    pub trim: bool,
}

/// Payload for `xbind.core.v1.SetNext`, `SetTop` and `SetRoot`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    /// The linking method.
    pub method: String,
}

/// Payload for `xbind.core.v1.CallMethod`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallMethodConfig {
    /// The method to call.
    pub method: String,
    /// Number of parameters supplied by `CallParam` rules.
    #[serde(default)]
    pub params: usize,
    /// Call with the body text instead of parameters.
    #[serde(default)]
    pub body_text: bool,
    /// Id that `CallParam` rules use to reach this call.
    #[serde(default)]
    pub call: Option<String>,
    /// Parameter types by name (`int`, `bool`, `string`, ...), overriding the catalog's.
    #[serde(default)]
    pub param_types: Option<Vec<String>>,
    /// Stack offset of the target; negative counts from the bottom.
    #[serde(default)]
    pub target_offset: isize,
    /// Per-parameter defaults (`null` for none).
    #[serde(default)]
    pub defaults: Vec<Option<String>>,
    #[serde(default = "yes")]
    pub trim: bool,
    /// Fire with gaps instead of skipping an incomplete call.
    #[serde(default)]
    pub fire_incomplete: bool,
}

/// Payload for `xbind.core.v1.CallParam`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallParamConfig {
    /// Id of the owning `CallMethod` or `Construct` rule.
    pub call: String,
    /// Parameter index.
    pub index: usize,
    /// Where the value comes from.
    pub from: ParamSourceConfig,
    #[serde(default = "yes")]
    pub trim: bool,
}

/// Serialized form of [`ParamSource`](crate::actions::ParamSource).
///
/// `body_text` and `match_path` are plain strings; the others are single-key maps such as
/// `{ attribute: name }` or `{ stack: 1 }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamSourceConfig {
    /// An attribute by qualified name.
    Attribute(String),
    /// The element's body text.
    BodyText,
    /// The default stack at an offset.
    Stack(usize),
    /// A fixed string.
    Literal(String),
    /// The current match path.
    MatchPath,
}

/// Payload for `xbind.core.v1.Construct`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstructConfig {
    /// The constructor.
    pub constructor: String,
    /// Id that `CallParam` rules use to supply arguments.
    #[serde(default)]
    pub call: Option<String>,
    /// Per-argument defaults (`null` for none).
    #[serde(default)]
    pub defaults: Vec<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_rules_document() {
        let json = serde_json::json!({
            "rules": [
                {
                    "pattern": "library",
                    "action": { "type_url": "xbind.core.v1.ObjectCreate", "config": { "factory": "library" } }
                },
                {
                    "pattern": "*/book",
                    "namespace": "urn:books",
                    "action": { "type_url": "test.Marker" }
                }
            ]
        });
        let config: RulesConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[1].namespace.as_deref(), Some("urn:books"));
        assert_eq!(config.rules[1].action.config, serde_json::json!({}));
    }

    #[test]
    fn unit_config_ignores_anything() {
        let _: UnitConfig = serde_json::from_value(serde_json::json!(null)).unwrap();
        let _: UnitConfig = serde_json::from_value(serde_json::json!({ "x": [1, 2] })).unwrap();
    }

    #[test]
    fn param_sources_in_both_shapes() {
        let sources: Vec<ParamSourceConfig> = serde_json::from_value(serde_json::json!([
            "body_text",
            "match_path",
            { "attribute": "id" },
            { "stack": 1 },
            { "literal": "x" }
        ]))
        .unwrap();
        assert_eq!(
            sources,
            [
                ParamSourceConfig::BodyText,
                ParamSourceConfig::MatchPath,
                ParamSourceConfig::Attribute("id".into()),
                ParamSourceConfig::Stack(1),
                ParamSourceConfig::Literal("x".into()),
            ]
        );
    }

    #[test]
    fn call_method_defaults() {
        let config: CallMethodConfig =
            serde_json::from_value(serde_json::json!({ "method": "Doc.title" })).unwrap();
        assert_eq!(config.params, 0);
        assert!(!config.body_text);
        assert!(config.trim);
        assert_eq!(config.target_offset, 0);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<LinkConfig, _> =
            serde_json::from_value(serde_json::json!({ "method": "m", "methd": "typo" }));
        assert!(result.is_err());
    }

    #[test]
    fn yaml_and_json_agree() {
        let yaml = "rules:\n  - pattern: a/b\n    action:\n      type_url: t\n      config: { k: 1 }\n";
        let from_yaml: RulesConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(from_yaml.rules[0].pattern, "a/b");
        assert_eq!(from_yaml.rules[0].action.config, serde_json::json!({ "k": 1 }));
    }
}
