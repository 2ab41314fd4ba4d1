// Resource descriptors: every collection the API exposes is one static value
// driving the shared CRUD service and handler family.

pub mod error;
pub mod service;

pub use error::ServiceError;
pub use service::ResourceService;

use serde_json::Value;

use crate::database::record::{timestamp_now, CREATED_AT_FIELD};

/// Server-assigned value for a default field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Literal(&'static str),
    Now,
}

impl DefaultValue {
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Literal(s) => Value::String((*s).to_string()),
            DefaultValue::Now => timestamp_now(),
        }
    }
}

/// Field injected on create, overwriting any submitted value
#[derive(Debug, Clone, Copy)]
pub struct DefaultField {
    pub field: &'static str,
    pub value: DefaultValue,
}

/// Field that may be set on its own through a narrow update route
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    /// `None` means free-form
    pub allowed: Option<&'static [&'static str]>,
}

#[derive(Debug)]
pub struct Resource {
    /// Capitalized singular used in messages ("Teacher")
    pub label: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    pub collection: &'static str,
    pub defaults: &'static [DefaultField],
    /// Order spec for listings; `None` keeps store-native order
    pub order: Option<&'static str>,
    /// Field checked for an existing match before insert
    pub unique_field: Option<&'static str>,
    pub field_rules: &'static [FieldRule],
}

impl Resource {
    pub fn field_rule(&self, field: &str) -> Option<&FieldRule> {
        self.field_rules.iter().find(|rule| rule.field == field)
    }
}

const STATUS_RULE: FieldRule = FieldRule { field: "status", allowed: None };

pub const USER_ROLES: &[&str] = &["admin", "user"];

pub static TEACHERS: Resource = Resource {
    label: "Teacher",
    singular: "teacher",
    plural: "teachers",
    collection: "teachers",
    defaults: &[DefaultField { field: "status", value: DefaultValue::Literal("pending") }],
    order: None,
    unique_field: None,
    field_rules: &[STATUS_RULE],
};

pub static USERS: Resource = Resource {
    label: "User",
    singular: "user",
    plural: "users",
    collection: "users",
    defaults: &[],
    order: None,
    unique_field: Some("email"),
    field_rules: &[FieldRule { field: "role", allowed: Some(USER_ROLES) }],
};

pub static CONTACTS: Resource = Resource {
    label: "Contact",
    singular: "contact",
    plural: "contacts",
    collection: "contacts",
    defaults: &[
        DefaultField { field: "status", value: DefaultValue::Literal("unread") },
        DefaultField { field: CREATED_AT_FIELD, value: DefaultValue::Now },
    ],
    order: Some("createdAt desc"),
    unique_field: None,
    field_rules: &[STATUS_RULE],
};

pub static BANNERS: Resource = Resource {
    label: "Banner",
    singular: "banner",
    plural: "banners",
    collection: "banners",
    defaults: &[DefaultField { field: CREATED_AT_FIELD, value: DefaultValue::Now }],
    order: Some("createdAt desc"),
    unique_field: None,
    field_rules: &[],
};

pub static HIGHLIGHTS: Resource = Resource {
    label: "Highlight",
    singular: "highlight",
    plural: "highlights",
    collection: "examHeroHighlights",
    defaults: &[DefaultField { field: CREATED_AT_FIELD, value: DefaultValue::Now }],
    order: Some("createdAt desc"),
    unique_field: None,
    field_rules: &[],
};
