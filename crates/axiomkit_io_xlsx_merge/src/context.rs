//! Render-time variable bindings.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::listener::SharedAreaListener;
use crate::spec::{EnumCellValue, XlsxMergeError};

/// Value bound to a context variable.
#[derive(Debug, Clone, Default)]
pub enum EnumContextValue {
    /// Absent value.
    #[default]
    Null,
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Ordered list, iterated by `each` commands.
    List(Vec<EnumContextValue>),
    /// Named fields, addressed with dotted paths.
    Record(BTreeMap<String, EnumContextValue>),
    /// Externally supplied area listener.
    Listener(SharedAreaListener),
}

impl EnumContextValue {
    /// Record from `(field, value)` pairs.
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, EnumContextValue)>,
        K: Into<String>,
    {
        Self::Record(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// Short kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::List(_) => "list",
            Self::Record(_) => "record",
            Self::Listener(_) => "listener",
        }
    }

    /// Cell value written for this binding; lists, records and listeners render blank.
    pub fn to_cell_value(&self) -> EnumCellValue {
        match self {
            Self::Text(text) => EnumCellValue::String(text.clone()),
            Self::Number(value) => EnumCellValue::Number(*value),
            Self::Null | Self::List(_) | Self::Record(_) | Self::Listener(_) => EnumCellValue::None,
        }
    }
}

impl From<&str> for EnumContextValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EnumContextValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for EnumContextValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<EnumContextValue>> for EnumContextValue {
    fn from(value: Vec<EnumContextValue>) -> Self {
        Self::List(value)
    }
}

/// Variable bindings visible while rendering.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    dict_vars: BTreeMap<String, EnumContextValue>,
}

impl RenderContext {
    /// Empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning the previous binding.
    pub fn put_var(
        &mut self,
        name: impl Into<String>,
        value: EnumContextValue,
    ) -> Option<EnumContextValue> {
        self.dict_vars.insert(name.into(), value)
    }

    /// Undo a [`Self::put_var`] with the binding it returned.
    pub fn restore_var(&mut self, name: &str, previous: Option<EnumContextValue>) {
        match previous {
            Some(value) => {
                self.dict_vars.insert(name.to_string(), value);
            }
            None => {
                self.dict_vars.remove(name);
            }
        }
    }

    /// Top-level binding of `name`.
    pub fn get_var(&self, name: &str) -> Option<&EnumContextValue> {
        self.dict_vars.get(name)
    }

    /// Resolve a dotted path such as `row.subs` through nested records.
    pub fn resolve_path(&self, path: &str) -> Option<&EnumContextValue> {
        let mut it_parts = path.split('.');
        let mut value = self.get_var(it_parts.next()?)?;
        for c_part in it_parts {
            let EnumContextValue::Record(dict_fields) = value else {
                return None;
            };
            value = dict_fields.get(c_part)?;
        }
        Some(value)
    }

    /// List bound at `path`.
    pub fn get_list(&self, path: &str) -> Result<&[EnumContextValue], XlsxMergeError> {
        match self.resolve_path(path) {
            Some(EnumContextValue::List(l_items)) => Ok(l_items),
            Some(value) => Err(XlsxMergeError::ItemsNotList {
                name: path.to_string(),
                found: value.kind_name(),
            }),
            None => Err(XlsxMergeError::ItemsNotFound {
                name: path.to_string(),
            }),
        }
    }

    /// Listener bound at `name`.
    pub fn get_listener(&self, name: &str) -> Result<SharedAreaListener, XlsxMergeError> {
        match self.resolve_path(name) {
            Some(EnumContextValue::Listener(listener)) => Ok(Rc::clone(listener)),
            Some(value) => Err(XlsxMergeError::ListenerTypeMismatch {
                name: name.to_string(),
                found: value.kind_name(),
            }),
            None => Err(XlsxMergeError::ListenerNotFound {
                name: name.to_string(),
            }),
        }
    }
}
