//! Function registry: name to typed handler and schema
//!
//! Each registration pairs a unique name with an async handler closure and a
//! declared parameter schema. Registration happens once at session
//! construction; the registry is read-only afterwards.

use std::collections::BTreeMap;

use futures::future::BoxFuture;

use crate::schema::FunctionSchema;
use crate::{Error, Result};

/// Future returned by a handler invocation
pub type HandlerFuture = BoxFuture<'static, Result<String>>;

/// A registered function handler
///
/// Takes parsed JSON arguments and produces the textual tool output. Errors
/// are converted to error results at the dispatch boundary, never
/// propagated past it.
pub type Handler = Box<dyn Fn(serde_json::Value) -> HandlerFuture + Send + Sync>;

/// One registered function
pub struct Registration {
    schema: FunctionSchema,
    handler: Handler,
}

impl Registration {
    /// The declared schema
    #[must_use]
    pub const fn schema(&self) -> &FunctionSchema {
        &self.schema
    }

    /// Invoke the handler with parsed arguments
    #[must_use]
    pub fn invoke(&self, args: serde_json::Value) -> HandlerFuture {
        (self.handler)(args)
    }
}

/// Registry of callable functions
#[derive(Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Registration>,
}

impl FunctionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under its schema's name
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRegistration` if the name is already taken.
    pub fn register(&mut self, schema: FunctionSchema, handler: Handler) -> Result<()> {
        let name = schema.name.clone();
        if self.functions.contains_key(&name) {
            return Err(Error::DuplicateRegistration(name));
        }

        tracing::debug!(name = %name, "registered function");
        self.functions.insert(name, Registration { schema, handler });
        Ok(())
    }

    /// Look up a registration by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.functions.get(name)
    }

    /// All declared schemas, in name order
    #[must_use]
    pub fn schemas(&self) -> Vec<&FunctionSchema> {
        self.functions.values().map(Registration::schema).collect()
    }

    /// The full schema set as a plain JSON document
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a schema cannot be encoded (it
    /// cannot in practice; schemas are plain data).
    pub fn schema_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.schemas())?)
    }

    /// Number of registered functions
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamSpec;

    fn echo_handler() -> Handler {
        Box::new(|args| Box::pin(async move { Ok(format!("echo: {args}")) }))
    }

    #[test]
    fn register_and_invoke() {
        let mut registry = FunctionRegistry::new();
        registry
            .register(FunctionSchema::new("echo", "Echo arguments"), echo_handler())
            .unwrap();

        assert_eq!(registry.len(), 1);
        let reg = registry.get("echo").unwrap();
        let out = tokio_test::block_on(reg.invoke(serde_json::json!({"a": 1}))).unwrap();
        assert!(out.contains("\"a\":1"));
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = FunctionRegistry::new();
        registry
            .register(FunctionSchema::new("echo", "Echo"), echo_handler())
            .unwrap();

        let err = registry
            .register(FunctionSchema::new("echo", "Echo again"), echo_handler())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn schema_document_lists_all_functions() {
        let mut registry = FunctionRegistry::new();
        registry
            .register(
                FunctionSchema::new("b_fn", "Second")
                    .param("x", ParamSpec::string("An x").required()),
                echo_handler(),
            )
            .unwrap();
        registry
            .register(FunctionSchema::new("a_fn", "First"), echo_handler())
            .unwrap();

        let doc = registry.schema_document().unwrap();
        let names: Vec<&str> = doc
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        // Name order, independent of registration order
        assert_eq!(names, ["a_fn", "b_fn"]);
    }

    #[test]
    fn unknown_name_is_none() {
        let registry = FunctionRegistry::new();
        assert!(registry.get("nope").is_none());
        assert!(registry.is_empty());
    }
}
