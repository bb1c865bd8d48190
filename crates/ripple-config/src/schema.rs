use schemars::schema::{RootSchema, Schema, SchemaObject};
use schemars::schema_for;
use serde_json::json;

use crate::RippleConfig;

/// JSON schema for `ripple.toml`.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(RippleConfig)
}

pub(crate) fn union_strategy_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> Schema {
    let mut schema: SchemaObject = <String as schemars::JsonSchema>::json_schema(generator).into();
    schema.enum_values = Some(vec![json!("link"), json!("by_size")]);
    schema.into()
}
