use crate::error::OperatorError;
use crate::operator::Operator;
use core_types::{Address, OperatorName};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Maps operator names to their handles.
///
/// The list of required names is append-only: re-registering a name replaces its
/// handle but keeps its position.
#[derive(Clone)]
pub struct OperatorResolver {
    admin: Address,
    operators: HashMap<OperatorName, Arc<dyn Operator>>,
    required: Vec<OperatorName>,
}

impl OperatorResolver {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            operators: HashMap::new(),
            required: Vec::new(),
        }
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Registers `handle` under `name`, replacing any previous handle.
    pub fn add_operator(
        &mut self,
        caller: Address,
        name: OperatorName,
        handle: Arc<dyn Operator>,
    ) -> Result<(), OperatorError> {
        if caller != self.admin {
            return Err(OperatorError::Unauthorized(caller));
        }
        if !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        info!(operator = %name, "Registered operator");
        self.operators.insert(name, handle);
        Ok(())
    }

    pub fn resolve(&self, name: &OperatorName) -> Result<Arc<dyn Operator>, OperatorError> {
        self.operators
            .get(name)
            .cloned()
            .ok_or_else(|| OperatorError::UnknownOperator(name.clone()))
    }

    /// Every name ever registered, in registration order.
    pub fn required_operators(&self) -> &[OperatorName] {
        &self.required
    }

    /// True when every name in `names` currently resolves.
    pub fn are_operators_imported(&self, names: &[OperatorName]) -> bool {
        names.iter().all(|name| self.operators.contains_key(name))
    }
}

impl std::fmt::Debug for OperatorResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorResolver")
            .field("admin", &self.admin)
            .field("required", &self.required)
            .finish()
    }
}
