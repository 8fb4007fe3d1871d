//! Employee and organization directory.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::EngineResult;
use crate::models::{Employee, EmployeeStatus};

/// Read-only view of employees and organizations.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up an employee.
    async fn employee(&self, id: &str) -> EngineResult<Option<Employee>>;

    /// Returns true if the organization exists.
    async fn organization_exists(&self, organization_id: &str) -> EngineResult<bool>;

    /// Lists employees whose status is one of `statuses`, ordered by id.
    async fn employees_with_status(&self, statuses: &[EmployeeStatus])
    -> EngineResult<Vec<Employee>>;
}

/// A directory held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    employees: RwLock<HashMap<String, Employee>>,
    organizations: RwLock<HashSet<String>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an organization.
    pub async fn insert_organization(&self, organization_id: impl Into<String>) {
        self.organizations.write().await.insert(organization_id.into());
    }

    /// Adds or replaces an employee, registering their organization.
    pub async fn insert_employee(&self, employee: Employee) {
        self.insert_organization(employee.organization_id.clone()).await;
        self.employees
            .write()
            .await
            .insert(employee.id.clone(), employee);
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryDirectory {
    async fn employee(&self, id: &str) -> EngineResult<Option<Employee>> {
        Ok(self.employees.read().await.get(id).cloned())
    }

    async fn organization_exists(&self, organization_id: &str) -> EngineResult<bool> {
        Ok(self.organizations.read().await.contains(organization_id))
    }

    async fn employees_with_status(
        &self,
        statuses: &[EmployeeStatus],
    ) -> EngineResult<Vec<Employee>> {
        let employees = self.employees.read().await;
        let mut matching: Vec<Employee> = employees
            .values()
            .filter(|e| statuses.contains(&e.status))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matching)
    }
}
