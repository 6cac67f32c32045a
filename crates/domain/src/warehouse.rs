use std::str::FromStr;

use grantline_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Upper bound for the auto-suspend window, in seconds.
pub const AUTO_SUSPEND_MAX_SECONDS: u16 = 3600;

/// Upper bound for warehouse cluster counts.
pub const CLUSTER_COUNT_MAX: u8 = 10;

/// Compute sizes offered when provisioning a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum WarehouseSize {
    XSmall,
    Small,
    Medium,
    Large,
    XLarge,
    XxLarge,
    XxxLarge,
}

impl WarehouseSize {
    /// Returns the stable statement value for this size.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::XSmall => "XSMALL",
            Self::Small => "SMALL",
            Self::Medium => "MEDIUM",
            Self::Large => "LARGE",
            Self::XLarge => "XLARGE",
            Self::XxLarge => "XXLARGE",
            Self::XxxLarge => "XXXLARGE",
        }
    }

    /// Returns all offered sizes, smallest first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[WarehouseSize] = &[
            WarehouseSize::XSmall,
            WarehouseSize::Small,
            WarehouseSize::Medium,
            WarehouseSize::Large,
            WarehouseSize::XLarge,
            WarehouseSize::XxLarge,
            WarehouseSize::XxxLarge,
        ];

        ALL
    }
}

impl FromStr for WarehouseSize {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "XSMALL" => Ok(Self::XSmall),
            "SMALL" => Ok(Self::Small),
            "MEDIUM" => Ok(Self::Medium),
            "LARGE" => Ok(Self::Large),
            "XLARGE" => Ok(Self::XLarge),
            "XXLARGE" => Ok(Self::XxLarge),
            "XXXLARGE" => Ok(Self::XxxLarge),
            _ => Err(AppError::Validation(format!(
                "unknown warehouse size '{value}'"
            ))),
        }
    }
}

/// Policy that decides when additional clusters are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScalingPolicy {
    /// Start clusters eagerly to minimize queuing.
    Standard,
    /// Conserve credits by starting clusters only under sustained load.
    Economy,
}

impl ScalingPolicy {
    /// Returns the stable statement value for this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Economy => "ECONOMY",
        }
    }
}

impl FromStr for ScalingPolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "STANDARD" => Ok(Self::Standard),
            "ECONOMY" => Ok(Self::Economy),
            _ => Err(AppError::Validation(format!(
                "unknown scaling policy '{value}'"
            ))),
        }
    }
}

/// Primary workload the warehouse is provisioned for. Recorded in the audit
/// trail; not part of the CREATE statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum WarehouseFunction {
    Gen,
    Etl,
    DataLoader,
    Analytics,
    BiTool,
    Custom,
}

impl WarehouseFunction {
    /// Returns the stable storage value for this function.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gen => "GEN",
            Self::Etl => "ETL",
            Self::DataLoader => "DATALOADER",
            Self::Analytics => "ANALYTICS",
            Self::BiTool => "BI_TOOL",
            Self::Custom => "CUSTOM",
        }
    }
}

impl FromStr for WarehouseFunction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "GEN" => Ok(Self::Gen),
            "ETL" => Ok(Self::Etl),
            "DATALOADER" => Ok(Self::DataLoader),
            "ANALYTICS" => Ok(Self::Analytics),
            "BI_TOOL" => Ok(Self::BiTool),
            "CUSTOM" => Ok(Self::Custom),
            _ => Err(AppError::Validation(format!(
                "unknown warehouse function '{value}'"
            ))),
        }
    }
}

/// Validated provisioning parameters for one warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseSpec {
    /// Compute size.
    pub size: WarehouseSize,
    /// Seconds of inactivity before automatic suspension; 0 disables.
    pub auto_suspend_seconds: u16,
    /// Resume automatically when a statement arrives.
    pub auto_resume: bool,
    /// Minimum running cluster count.
    pub min_cluster_count: u8,
    /// Maximum running cluster count.
    pub max_cluster_count: u8,
    /// Cluster scaling policy.
    pub scaling_policy: ScalingPolicy,
}

impl WarehouseSpec {
    /// Checks the provisioning bounds.
    pub fn validate(&self) -> AppResult<()> {
        if self.auto_suspend_seconds > AUTO_SUSPEND_MAX_SECONDS {
            return Err(AppError::Validation(format!(
                "auto suspend must be at most {AUTO_SUSPEND_MAX_SECONDS} seconds"
            )));
        }

        if self.min_cluster_count == 0 || self.max_cluster_count == 0 {
            return Err(AppError::Validation(
                "cluster counts must be at least 1".to_owned(),
            ));
        }

        if self.min_cluster_count > CLUSTER_COUNT_MAX
            || self.max_cluster_count > CLUSTER_COUNT_MAX
        {
            return Err(AppError::Validation(format!(
                "cluster counts must be at most {CLUSTER_COUNT_MAX}"
            )));
        }

        if self.min_cluster_count > self.max_cluster_count {
            return Err(AppError::Validation(
                "minimum cluster count exceeds maximum cluster count".to_owned(),
            ));
        }

        Ok(())
    }
}

impl Default for WarehouseSpec {
    fn default() -> Self {
        Self {
            size: WarehouseSize::XSmall,
            auto_suspend_seconds: 300,
            auto_resume: true,
            min_cluster_count: 1,
            max_cluster_count: 1,
            scaling_policy: ScalingPolicy::Standard,
        }
    }
}
