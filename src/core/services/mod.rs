pub mod expense_service;
pub mod forecast_service;
pub mod group_service;

pub use expense_service::ExpenseService;
pub use forecast_service::{forecast_series, ForecastRequest, ForecastService};
pub use group_service::{GroupService, GroupWithExpenses};

/// Services report the crate-wide error type unchanged.
pub type ServiceResult<T> = crate::errors::Result<T>;
