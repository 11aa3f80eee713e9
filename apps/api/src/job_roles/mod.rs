// Tenant-scoped job postings. Cross-tenant lookups report NotFound.

pub mod fields;
pub mod handlers;
pub mod service;
