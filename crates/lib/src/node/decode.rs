use super::{NodeArena, NodeId};
use crate::{Result, doc::DocumentError, value::Value};

impl NodeArena {
    /// Parses encoded text into a detached root object.
    ///
    /// Blank input yields an empty object. A top-level scalar or array
    /// becomes a single-value root holding it as its anonymous field.
    pub(crate) fn decode(&mut self, text: &str) -> Result<NodeId> {
        if text.trim().is_empty() {
            return Ok(self.create_object(""));
        }
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| DocumentError::InvalidInput {
                reason: e.to_string(),
            })?;
        self.load_root(&json)
    }

    /// Builds a detached root object from parsed JSON.
    pub(crate) fn load_root(&mut self, json: &serde_json::Value) -> Result<NodeId> {
        match json {
            serde_json::Value::Object(fields) => self.load_object("", fields),
            other => {
                let root = self.create_object("");
                let child = self.load(other, "")?;
                self.attach(root, child)?;
                Ok(root)
            }
        }
    }

    fn load(&mut self, json: &serde_json::Value, name: &str) -> Result<NodeId> {
        match json {
            serde_json::Value::Object(fields) => self.load_object(name, fields),
            serde_json::Value::Array(items) => {
                let mut members = self.member_buffer();
                for item in items {
                    members.push(self.load_root(item)?);
                }
                self.build_list(name, members)
            }
            scalar => Ok(self.create_value(name, Value::from_json(scalar).unwrap_or_default())),
        }
    }

    fn load_object(
        &mut self,
        name: &str,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<NodeId> {
        let object = self.create_object(name);
        for (field, json) in fields {
            let child = self.load(json, field)?;
            self.attach(object, child)?;
        }
        Ok(object)
    }
}
