//! Configuration management for Lambda functions.

use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB table holding reservation items
    pub table_name: String,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            table_name: env::var("DYNAMODB_TABLE")?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        })
    }
}
