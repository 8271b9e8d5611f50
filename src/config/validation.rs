//! Configuration validation.

use super::types::Config;
use crate::error::{EtlError, Result};
use crate::source::Platform;

pub(super) fn validate(config: &Config) -> Result<()> {
    config.source.platform.parse::<Platform>()?;

    require(&config.source.host, "source.host")?;
    require(&config.source.database, "source.database")?;
    require(&config.source.user, "source.user")?;
    require(&config.target.host, "target.host")?;
    require(&config.target.database, "target.database")?;
    require(&config.target.user, "target.user")?;

    for (idx, query) in config.queries.iter().enumerate() {
        if query.extract.trim().is_empty() {
            return Err(EtlError::Config(format!("queries[{}].extract is empty", idx)));
        }
        if query.load.trim().is_empty() {
            return Err(EtlError::Config(format!("queries[{}].load is empty", idx)));
        }
    }

    Ok(())
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::Config(format!("{} must not be empty", field)));
    }
    Ok(())
}
