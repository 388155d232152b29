//! Field accessor resolution
//!
//! The mapper never knows the concrete type of the records it moves. Every
//! cell goes through [`FieldAccess`], which resolves a field *name* to a
//! read or a write on one instance.
//!
//! For ordinary structs, implement the trait by delegating to a
//! [`FieldRegistry`] built once per type:
//!
//! ```
//! use sheetmap::access::{FieldAccess, FieldRegistry};
//! use sheetmap::error::AccessError;
//! use std::sync::OnceLock;
//!
//! #[derive(Default)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! fn person_fields() -> &'static FieldRegistry<Person> {
//!     static FIELDS: OnceLock<FieldRegistry<Person>> = OnceLock::new();
//!     FIELDS.get_or_init(|| {
//!         FieldRegistry::<Person>::new("Person")
//!             .field("name", |p| Ok(Some(p.name.clone())), |p, v| {
//!                 p.name = v.to_string();
//!                 Ok(())
//!             })
//!             .field("age", |p| Ok(Some(p.age.to_string())), |p, v| {
//!                 p.age = v.parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
//!                 Ok(())
//!             })
//!     })
//! }
//!
//! impl FieldAccess for Person {
//!     fn type_name(&self) -> &str {
//!         person_fields().type_name()
//!     }
//!     fn get_field(&self, field: &str) -> Result<Option<String>, AccessError> {
//!         person_fields().get(self, field)
//!     }
//!     fn set_field(&mut self, field: &str, value: &str) -> Result<(), AccessError> {
//!         person_fields().set(self, field, value)
//!     }
//! }
//!
//! let mut ann = Person::default();
//! ann.set_field("Age", "30").unwrap();
//! assert_eq!(ann.get_field("age").unwrap(), Some("30".to_string()));
//! ```

use crate::error::AccessError;

/// Name-based read/write access to the fields of a record.
pub trait FieldAccess {
    /// Type name used in diagnostics.
    fn type_name(&self) -> &str;

    /// Read a field as text. `Ok(None)` means the value is absent and the cell stays empty.
    fn get_field(&self, field: &str) -> Result<Option<String>, AccessError>;

    /// Write a field from its cell text.
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), AccessError>;
}

pub type Getter<T> = fn(&T) -> Result<Option<String>, String>;
pub type Setter<T> = fn(&mut T, &str) -> Result<(), String>;

/// Upper-case the first character, leaving the rest untouched (`age` → `Age`).
pub fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether `field` capitalizes to `key`, without building the capitalized string.
fn capitalizes_to(field: &str, key: &str) -> bool {
    let mut rest = field.chars();
    let first = rest.next().into_iter().flat_map(char::to_uppercase);
    first.chain(rest).eq(key.chars())
}

/// Conventional accessor name for a field: `accessor_name("get", "age")` → `getAge`.
pub fn accessor_name(prefix: &str, field: &str) -> String {
    format!("{}{}", prefix, capitalize(field))
}

/// One registered field.
pub struct FieldBinding<T> {
    name: String,
    key: String,
    get: Getter<T>,
    set: Option<Setter<T>>,
}

impl<T> FieldBinding<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }
}

/// Per-type table of `field → (getter, setter)`.
///
/// Lookups follow the accessor naming convention: `age` and `Age` both
/// resolve to the same binding because both name `getAge`/`setAge`.
pub struct FieldRegistry<T> {
    type_name: String,
    fields: Vec<FieldBinding<T>>,
}

impl<T> FieldRegistry<T> {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Register a readable and writable field. Registering a name twice replaces the first binding.
    pub fn field(self, name: &str, get: Getter<T>, set: Setter<T>) -> Self {
        self.bind(name, get, Some(set))
    }

    /// Register a field that can be exported but not imported.
    pub fn read_only(self, name: &str, get: Getter<T>) -> Self {
        self.bind(name, get, None)
    }

    fn bind(mut self, name: &str, get: Getter<T>, set: Option<Setter<T>>) -> Self {
        let binding = FieldBinding {
            name: name.to_string(),
            key: capitalize(name),
            get,
            set,
        };
        match self.fields.iter_mut().find(|b| b.key == binding.key) {
            Some(existing) => *existing = binding,
            None => self.fields.push(binding),
        }
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Registered field names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|b| b.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Find the binding a field name refers to.
    pub fn resolve(&self, field: &str) -> Option<&FieldBinding<T>> {
        self.fields
            .iter()
            .find(|b| b.name == field || capitalizes_to(field, &b.key))
    }

    /// Read `field` from `target`.
    pub fn get(&self, target: &T, field: &str) -> Result<Option<String>, AccessError> {
        let binding = self
            .resolve(field)
            .ok_or_else(|| AccessError::UnknownField {
                type_name: self.type_name.clone(),
                field: field.to_string(),
                accessor: accessor_name("get", field),
            })?;

        (binding.get)(target).map_err(|message| AccessError::Get {
            field: field.to_string(),
            message,
        })
    }

    /// Write `value` into `field` on `target`.
    pub fn set(&self, target: &mut T, field: &str, value: &str) -> Result<(), AccessError> {
        let binding = self
            .resolve(field)
            .ok_or_else(|| AccessError::UnknownField {
                type_name: self.type_name.clone(),
                field: field.to_string(),
                accessor: accessor_name("set", field),
            })?;

        let set = binding.set.ok_or_else(|| AccessError::ReadOnly {
            type_name: self.type_name.clone(),
            field: field.to_string(),
            accessor: accessor_name("set", field),
        })?;

        set(target, value).map_err(|message| AccessError::Set {
            field: field.to_string(),
            value: value.to_string(),
            message,
        })
    }
}
