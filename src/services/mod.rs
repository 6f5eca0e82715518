pub mod attachment_service;
pub mod auth_service;
pub mod case_service;
pub mod conversation_service;
pub mod lawyer_service;

#[cfg(test)]
pub(crate) mod test_support;

use crate::models::Role;

/// The verified caller a workflow operation runs on behalf of.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub id: &'a str,
    pub role: Role,
}

impl<'a> Actor<'a> {
    pub fn new(id: &'a str, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_lawyer(&self) -> bool {
        self.role == Role::Lawyer
    }
}
