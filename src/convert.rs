use serde::Serialize;

use crate::splunk_utils::hec_export::SplunkHecToken;

/// Marker prepended to every migrated token's description envelope.
pub const IMPORT_MESSAGE: &str = "Imported from Splunk";

/// Payload for the Cribl `hectoken` endpoint.
///
/// Field order matches the serialized body: `token`, `description`,
/// `metadata`.
#[derive(Debug, Clone, Serialize)]
pub struct CriblHecToken {
    pub token: String,
    pub description: String,
    pub metadata: Vec<KvPair>,
}

/// One metadata entry. `value` holds a JavaScript expression which Cribl
/// evaluates per event, not a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KvPair {
    pub name: String,
    pub value: String,
}

/// Shape of the JSON stored in the Cribl description field. Serialized
/// key order is `message`, `title`, `description`.
#[derive(Serialize)]
struct DescriptionEnvelope<'a> {
    message: &'static str,
    title: &'a str,
    description: &'a str,
}

/// Quotes `value` as a JS double-quoted string literal, escaping
/// backslashes and embedded quotes.
fn js_str(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Renders `values` as a JS array literal of string literals.
fn js_string_array(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| js_str(v)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Membership test: `["a", "b"].includes(var)`.
fn js_includes(values: &[String], var: &str) -> String {
    format!("{}.includes({})", js_string_array(values), var)
}

/// Existence test for an event field: not empty string, not undefined,
/// not null, ANDed in that order.
fn js_exists(var: &str) -> String {
    format!("{0} !== \"\" && {0} !== undefined && {0} !== null", var)
}

/// Conditional with the condition parenthesized: `(cond) ? keep : fallback`.
fn js_ternary(condition: &str, keep: &str, fallback: &str) -> String {
    format!("({}) ? {} : {}", condition, keep, fallback)
}

/// An allow-list restricts the index only when it names at least one
/// index. A lone empty entry counts as no restriction.
fn index_restricted(indexes: &[String]) -> bool {
    !(indexes.is_empty() || (indexes.len() == 1 && indexes[0].is_empty()))
}

/// Expression for the `index` metadata entry: keep the event's index when
/// the allow-list admits it, else fall back to the default. Without a
/// restriction the default is pinned unconditionally.
fn index_expression(default_index: &str, indexes: &[String]) -> String {
    if index_restricted(indexes) {
        js_ternary(
            &js_includes(indexes, "index"),
            "index",
            &js_str(default_index),
        )
    } else {
        js_str(default_index)
    }
}

/// Expression for `source`/`sourcetype`: keep the event's own value when
/// the field exists, else use the token's configured literal.
fn override_expression(var: &str, literal: &str) -> String {
    js_ternary(&js_exists(var), var, &js_str(literal))
}

/// Converts one Splunk export row into a Cribl HEC token payload.
///
/// The index entry is always emitted; sourcetype and source entries only
/// when the export configured them, in that order.
pub fn convert_token(splunk: &SplunkHecToken) -> CriblHecToken {
    let mut metadata = vec![KvPair {
        name: "index".to_string(),
        value: index_expression(&splunk.index, &splunk.indexes),
    }];

    if !splunk.sourcetype.is_empty() {
        metadata.push(KvPair {
            name: "sourcetype".to_string(),
            value: override_expression("sourcetype", &splunk.sourcetype),
        });
    }

    if !splunk.source.is_empty() {
        metadata.push(KvPair {
            name: "source".to_string(),
            value: override_expression("source", &splunk.source),
        });
    }

    let envelope = DescriptionEnvelope {
        message: IMPORT_MESSAGE,
        title: &splunk.title,
        description: &splunk.description,
    };
    let description =
        serde_json::to_string(&envelope).expect("failed to serialize description envelope");

    CriblHecToken {
        token: splunk.token.clone(),
        description,
        metadata,
    }
}
