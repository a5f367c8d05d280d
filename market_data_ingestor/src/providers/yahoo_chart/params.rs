use order_flow::models::timeframe::{TimeFrame, TimeFrameUnit};

use crate::{
    models::request_params::BarsRequestParams,
    providers::{ProviderError, ValidationSnafu},
};

/// Rejects intervals the chart endpoint does not serve.
pub fn validate_interval(interval: &TimeFrame) -> Result<(), ProviderError> {
    let supported = match interval.unit {
        TimeFrameUnit::Minute => [1, 2, 5, 15, 30, 60, 90].contains(&interval.amount),
        TimeFrameUnit::Hour => interval.amount == 1,
        TimeFrameUnit::Day => [1, 5].contains(&interval.amount),
        TimeFrameUnit::Week => interval.amount == 1,
        TimeFrameUnit::Month => [1, 3].contains(&interval.amount),
    };
    if supported {
        Ok(())
    } else {
        ValidationSnafu {
            message: format!("interval {interval} is not supported by the chart API"),
        }
        .fail()
    }
}

/// Query string for a chart request.
pub fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    vec![
        ("range".to_string(), params.period.to_string()),
        ("interval".to_string(), params.interval.to_string()),
        ("includePrePost".to_string(), "false".to_string()),
    ]
}
