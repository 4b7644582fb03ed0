//! The attributed node abstraction.
//!
//! Every configuration object is a plain struct of optional fields declared
//! through [`define_node!`]. The macro emits the field table (internal name,
//! wire key, inbound aliases), a coercing `set_field`, a `field_value`
//! getter and per-field defaults; everything else (mappings, JSON, literal
//! text, keyword construction) is provided here on top of those four items.

use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::literal;
use crate::parser;
use crate::value::{Map, Value};

/// One row of a node's name-mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Rust-side (snake_case) field name.
    pub name: &'static str,
    /// Key used by the charting library.
    pub wire: &'static str,
    /// Extra keys accepted when reading a mapping, never written.
    pub aliases: &'static [&'static str],
}

pub trait Node: Sized + Default + Clone {
    const NODE_NAME: &'static str;
    const DOT_PATH: &'static str;
    const FIELDS: &'static [FieldSpec];
    /// Fixed value of the `type` discriminator, for node types that carry one.
    const TYPE_TAG: Option<&'static str> = None;

    /// Renders one declared field, `Value::Null` when unset.
    fn field_value(&self, name: &str, trimmed: bool) -> ChartResult<Value>;

    /// Coercing setter; `Value::Null` clears the field.
    fn set_field(&mut self, name: &str, value: Value) -> ChartResult<()>;

    /// Documented default of a field. Values equal to it are trimmed.
    fn field_default(_name: &str) -> Option<Value> {
        None
    }

    fn dot_path() -> Option<&'static str> {
        if Self::DOT_PATH.is_empty() {
            None
        } else {
            Some(Self::DOT_PATH)
        }
    }

    fn has_field(name: &str) -> bool {
        Self::FIELDS.iter().any(|f| f.name == name)
    }

    fn get_field(&self, name: &str) -> ChartResult<Value> {
        self.field_value(name, false)
    }

    fn wire_name(name: &str) -> Option<&'static str> {
        Self::FIELDS.iter().find(|f| f.name == name).map(|f| f.wire)
    }

    /// Resolves a wire key (or one of its aliases) to the internal name.
    fn internal_name(wire: &str) -> Option<&'static str> {
        Self::FIELDS
            .iter()
            .find(|f| f.wire == wire)
            .or_else(|| Self::FIELDS.iter().find(|f| f.aliases.contains(&wire)))
            .map(|f| f.name)
    }

    fn from_keywords<K, I>(keywords: I) -> ChartResult<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut node = Self::default();
        for (name, value) in keywords {
            node.set_field(name.as_ref(), value)?;
        }
        Ok(node)
    }

    /// Internal keywords to an external mapping. Unknown names are rejected.
    fn keywords_to_mapping(keywords: &Map) -> ChartResult<Map> {
        let mut out = Map::with_capacity(keywords.len());
        for (name, value) in keywords {
            let wire = Self::wire_name(name).ok_or_else(|| ChartError::UnknownField {
                node: Self::NODE_NAME,
                name: name.clone(),
            })?;
            out.insert(wire.to_owned(), value.clone());
        }
        Ok(out)
    }

    /// External mapping to internal keywords. Unknown keys are skipped.
    fn mapping_to_keywords(mapping: Map) -> ChartResult<Map> {
        let mut out = Map::with_capacity(mapping.len());
        for (key, value) in mapping {
            if key == "type" {
                if let Some(tag) = Self::TYPE_TAG {
                    check_type_tag::<Self>(tag, &value)?;
                    continue;
                }
            }
            match Self::internal_name(&key) {
                Some(name) => {
                    // The canonical key wins over an alias regardless of order.
                    let canonical = Self::wire_name(name) == Some(key.as_str());
                    if canonical || !out.contains_key(name) {
                        out.insert(name.to_owned(), value);
                    }
                }
                None => debug!(node = Self::NODE_NAME, key = %key, "skipping unrecognized key"),
            }
        }
        Ok(out)
    }

    fn from_map(mapping: Map) -> ChartResult<Self> {
        Self::from_keywords(Self::mapping_to_keywords(mapping)?)
    }

    fn from_mapping(value: Value) -> ChartResult<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Self::from_map(map),
            other => Err(ChartError::invalid(
                Self::NODE_NAME,
                format!("expected a mapping, received {}", other.type_name()),
            )),
        }
    }

    /// Every declared field under its wire key, unset fields as `null`.
    fn to_untrimmed(&self) -> Map {
        let mut out = Map::with_capacity(Self::FIELDS.len() + 1);
        if let Some(tag) = Self::TYPE_TAG {
            out.insert("type".to_owned(), Value::from(tag));
        }
        for spec in Self::FIELDS {
            let value = self.field_value(spec.name, false).unwrap_or_default();
            out.insert(spec.wire.to_owned(), value);
        }
        out
    }

    /// The public external mapping: no nulls, no empty collections and no
    /// values equal to a field's documented default.
    fn to_mapping(&self) -> Map {
        let mut out = Map::new();
        if let Some(tag) = Self::TYPE_TAG {
            out.insert("type".to_owned(), Value::from(tag));
        }
        for spec in Self::FIELDS {
            let value = self.field_value(spec.name, true).unwrap_or_default();
            if value.is_empty_like() {
                continue;
            }
            if Self::field_default(spec.name).as_ref() == Some(&value) {
                continue;
            }
            out.insert(spec.wire.to_owned(), value);
        }
        out
    }

    fn to_value(&self) -> Value {
        Value::Object(self.to_mapping())
    }

    fn to_json(&self) -> ChartResult<String> {
        Ok(serde_json::to_string(&self.to_value())?)
    }

    fn to_json_pretty(&self) -> ChartResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }

    fn from_json(text: &str) -> ChartResult<Self> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Self::from_mapping(Value::from(json))
    }

    /// JavaScript object-literal text. With `careful_validation` the output
    /// is parsed back and rejected if it is not a valid literal.
    fn to_literal_text(&self, careful_validation: bool) -> ChartResult<String> {
        let text = literal::to_literal(&self.to_value());
        if careful_validation {
            literal::validate_literal(&text)?;
        }
        Ok(text)
    }

    fn from_literal_text(text: &str) -> ChartResult<Self> {
        Self::from_mapping(parser::parse_literal_text(text)?)
    }
}

fn check_type_tag<N: Node>(tag: &str, value: &Value) -> ChartResult<()> {
    match value {
        Value::Null => Ok(()),
        Value::String(s) if s.eq_ignore_ascii_case(tag) => Ok(()),
        other => Err(ChartError::invalid(
            "type",
            format!(
                "{} expects type '{tag}', received {}",
                N::NODE_NAME,
                literal::to_literal(other)
            ),
        )),
    }
}

/// Declares a node type.
///
/// ```ignore
/// define_node! {
///     pub struct Title("title") {
///         text: String => "text";
///         use_html: bool => "useHTML" = false;
///         opacity: f64 => "opacity", check coerce::unit_interval;
///         language: Language => "lang" | "language";
///     }
/// }
/// ```
///
/// Each field becomes `pub field: Option<Type>`. `= expr` declares the
/// documented default, `| "alias"` an inbound-only key, and `check path`
/// a validator run after coercion.
#[macro_export]
macro_rules! define_node {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($path:literal) $(tagged $tag:literal)? {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty => $wire:literal $(| $alias:literal)* $(= $default:expr)? $(, check $check:path)? ;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: Option<$ty>,
            )*
        }

        impl $crate::node::Node for $name {
            const NODE_NAME: &'static str = stringify!($name);
            const DOT_PATH: &'static str = $path;
            const FIELDS: &'static [$crate::node::FieldSpec] = &[
                $(
                    $crate::node::FieldSpec {
                        name: stringify!($field),
                        wire: $wire,
                        aliases: &[$($alias),*],
                    },
                )*
            ];
            $(const TYPE_TAG: Option<&'static str> = Some($tag);)?

            #[allow(unused_variables)]
            fn field_value(
                &self,
                name: &str,
                trimmed: bool,
            ) -> $crate::error::ChartResult<$crate::value::Value> {
                match name {
                    $(
                        stringify!($field) => Ok(self
                            .$field
                            .as_ref()
                            .map(|v| $crate::coerce::FieldValue::to_value(v, trimmed))
                            .unwrap_or_default()),
                    )*
                    _ => Err($crate::error::ChartError::UnknownField {
                        node: stringify!($name),
                        name: name.to_owned(),
                    }),
                }
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                name: &str,
                value: $crate::value::Value,
            ) -> $crate::error::ChartResult<()> {
                match name {
                    $(
                        stringify!($field) => {
                            let parsed = <$ty as $crate::coerce::FieldValue>::from_value(
                                value,
                                stringify!($field),
                            )?;
                            $(
                                if let Some(v) = parsed.as_ref() {
                                    $check(v, stringify!($field))?;
                                }
                            )?
                            self.$field = parsed;
                            Ok(())
                        }
                    )*
                    _ => Err($crate::error::ChartError::UnknownField {
                        node: stringify!($name),
                        name: name.to_owned(),
                    }),
                }
            }

            #[allow(unused_variables)]
            fn field_default(name: &str) -> Option<$crate::value::Value> {
                match name {
                    $(
                        stringify!($field) => {
                            None $(.or(Some($crate::value::Value::from($default))))?
                        }
                    )*
                    _ => None,
                }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                $crate::node::Node::to_mapping(self) == $crate::node::Node::to_mapping(other)
            }
        }

        impl $crate::coerce::FieldValue for $name {
            fn from_value(
                value: $crate::value::Value,
                field: &str,
            ) -> $crate::error::ChartResult<Option<Self>> {
                match value {
                    $crate::value::Value::Null => Ok(None),
                    $crate::value::Value::Object(map) => {
                        <Self as $crate::node::Node>::from_map(map).map(Some)
                    }
                    other => Err($crate::error::ChartError::InvalidValue {
                        field: field.to_owned(),
                        message: format!(
                            "expected a {} mapping, received {}",
                            stringify!($name),
                            other.type_name()
                        ),
                    }),
                }
            }

            fn to_value(&self, trimmed: bool) -> $crate::value::Value {
                if trimmed {
                    $crate::value::Value::Object($crate::node::Node::to_mapping(self))
                } else {
                    $crate::value::Value::Object($crate::node::Node::to_untrimmed(self))
                }
            }
        }
    };
}
