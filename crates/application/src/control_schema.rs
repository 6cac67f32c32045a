use grantline_core::SqlIdentifier;

const AUDIT_LOG_TABLE: &str = "AUDIT_LOG";
const AUDIT_LOG_SEQUENCE: &str = "SEQ_AUDIT_LOG";
const ROLE_HIERARCHY_LOG_TABLE: &str = "ROLE_HIERARCHY_LOG";
const ROLE_HIERARCHY_LOG_SEQUENCE: &str = "SEQ_ROLE_HIERARCHY_LOG";
const ROLE_METADATA_TABLE: &str = "FUNCTIONAL_TECHNICAL_ROLE_METADATA";
const ENVIRONMENTS_TABLE: &str = "ENVIRONMENTS";

const DEFAULT_USAGE_NAMESPACE: &str = "SNOWFLAKE.ACCOUNT_USAGE";

/// Fully qualified names for the service's own tables and sequences, plus
/// the account-usage views it reads.
#[derive(Debug, Clone)]
pub struct ControlSchema {
    database: SqlIdentifier,
    schema: SqlIdentifier,
    usage_namespace: String,
}

impl ControlSchema {
    /// Creates a control schema rooted at `database.schema`.
    #[must_use]
    pub fn new(database: SqlIdentifier, schema: SqlIdentifier) -> Self {
        Self {
            database,
            schema,
            usage_namespace: DEFAULT_USAGE_NAMESPACE.to_owned(),
        }
    }

    /// Overrides the namespace holding the account-usage views.
    #[must_use]
    pub fn with_usage_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.usage_namespace = namespace.into();
        self
    }

    fn qualify(&self, object: &str) -> String {
        format!("{}.{}.{object}", self.database, self.schema)
    }

    /// Qualified audit log table name.
    #[must_use]
    pub fn audit_log_table(&self) -> String {
        self.qualify(AUDIT_LOG_TABLE)
    }

    /// Qualified audit log sequence name.
    #[must_use]
    pub fn audit_log_sequence(&self) -> String {
        self.qualify(AUDIT_LOG_SEQUENCE)
    }

    /// Qualified role hierarchy log table name.
    #[must_use]
    pub fn role_hierarchy_log_table(&self) -> String {
        self.qualify(ROLE_HIERARCHY_LOG_TABLE)
    }

    /// Qualified role hierarchy log sequence name.
    #[must_use]
    pub fn role_hierarchy_log_sequence(&self) -> String {
        self.qualify(ROLE_HIERARCHY_LOG_SEQUENCE)
    }

    /// Qualified role metadata table name.
    #[must_use]
    pub fn role_metadata_table(&self) -> String {
        self.qualify(ROLE_METADATA_TABLE)
    }

    /// Qualified environments table name.
    #[must_use]
    pub fn environments_table(&self) -> String {
        self.qualify(ENVIRONMENTS_TABLE)
    }

    /// Qualified name of one account-usage view.
    #[must_use]
    pub fn usage_view(&self, view: &str) -> String {
        format!("{}.{view}", self.usage_namespace)
    }
}

#[cfg(test)]
mod tests {
    use grantline_core::SqlIdentifier;

    use super::ControlSchema;

    fn schema() -> ControlSchema {
        let Ok(database) = SqlIdentifier::new("SECURITY") else {
            panic!("expected a valid database identifier");
        };
        let Ok(schema) = SqlIdentifier::new("ACCESS_CONTROL") else {
            panic!("expected a valid schema identifier");
        };
        ControlSchema::new(database, schema)
    }

    #[test]
    fn objects_are_fully_qualified() {
        let schema = schema();
        assert_eq!(schema.audit_log_table(), "SECURITY.ACCESS_CONTROL.AUDIT_LOG");
        assert_eq!(
            schema.role_hierarchy_log_sequence(),
            "SECURITY.ACCESS_CONTROL.SEQ_ROLE_HIERARCHY_LOG"
        );
    }

    #[test]
    fn usage_views_use_the_account_usage_namespace() {
        let schema = schema();
        assert_eq!(
            schema.usage_view("GRANTS_TO_ROLES"),
            "SNOWFLAKE.ACCOUNT_USAGE.GRANTS_TO_ROLES"
        );
    }
}
