//! Custom validation functions for configuration.

use validator::ValidationError;

use crate::GeneratorConfig;

fn delay_error(message: &'static str) -> ValidationError {
    let mut error = ValidationError::new("delay_bounds");
    error.message = Some(message.into());
    error
}

/// Validate the producer delay bounds: both strictly positive, finite,
/// and `min <= max`.
pub fn validate_delay_bounds(config: &GeneratorConfig) -> Result<(), ValidationError> {
    let (min, max) = (config.min_delay_secs, config.max_delay_secs);

    if !min.is_finite() || !max.is_finite() {
        return Err(delay_error("delay bounds must be finite"));
    }
    if min <= 0.0 || max <= 0.0 {
        return Err(delay_error("delay bounds must be strictly positive"));
    }
    if min > max {
        return Err(delay_error("min_delay_secs must not exceed max_delay_secs"));
    }
    Ok(())
}
