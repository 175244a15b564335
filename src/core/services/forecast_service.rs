//! Forecast of a group's upcoming daily spend.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::core::forecast::{post_process, DailySeriesBuilder, HoltLinear, PredictionHorizon};
use crate::core::services::ServiceResult;
use crate::core::time::Clock;
use crate::domain::DatedAmount;
use crate::errors::SplitError;
use crate::storage::{ExpenseRepository, GroupRepository};

/// Transport-neutral forecast request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub group_id: Uuid,
    pub start_date: NaiveDate,
    /// Kept as a raw number so non-integer input can be rejected with a proper message.
    pub horizon: f64,
}

/// Entry point for forecasting; the only component that touches the repositories.
pub struct ForecastService {
    groups: Arc<dyn GroupRepository>,
    expenses: Arc<dyn ExpenseRepository>,
    clock: Arc<dyn Clock>,
    engine: HoltLinear,
}

impl ForecastService {
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        expenses: Arc<dyn ExpenseRepository>,
        clock: Arc<dyn Clock>,
        engine: HoltLinear,
    ) -> Self {
        Self {
            groups,
            expenses,
            clock,
            engine,
        }
    }

    pub async fn handle(&self, request: &ForecastRequest) -> ServiceResult<Vec<f64>> {
        self.predict(request.group_id, request.start_date, request.horizon)
            .await
    }

    /// Predicts `horizon` days of spend following today, from history on or after `start_date`.
    pub async fn predict(
        &self,
        group_id: Uuid,
        start_date: NaiveDate,
        horizon: f64,
    ) -> ServiceResult<Vec<f64>> {
        let horizon = PredictionHorizon::try_from(horizon)?;
        if self.groups.find_group(group_id).await?.is_none() {
            return Err(SplitError::GroupNotFound("Group not found".into()));
        }
        let history = self.expenses.list_expenses(group_id, start_date).await?;
        let values = forecast_series(
            &self.engine,
            &history,
            start_date,
            self.clock.today(),
            horizon,
        )?;
        debug!(group = %group_id, horizon = horizon.days(), "forecast computed");
        Ok(values)
    }
}

/// Synchronous core of [`ForecastService::predict`] once the history is fetched.
pub fn forecast_series(
    engine: &HoltLinear,
    history: &[DatedAmount],
    start_date: NaiveDate,
    today: NaiveDate,
    horizon: PredictionHorizon,
) -> ServiceResult<Vec<f64>> {
    let series = DailySeriesBuilder::new(start_date, today).build(history);
    debug!(
        records = history.len(),
        days = series.len(),
        required = horizon.required_len(),
        "daily series built"
    );
    if series.len() < horizon.required_len() {
        return Err(SplitError::InsufficientData(
            "Not enough expenses to predict in given period, or too many predicted expenses wanted"
                .into(),
        ));
    }
    let model = engine
        .fit(&series)
        .ok_or_else(|| SplitError::Forecast("Could not predict future expenses".into()))?;
    let augmented = model.augmented(horizon.days());
    let predicted = &augmented[augmented.len() - horizon.days()..];
    Ok(post_process(predicted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forecast::Smoothing;
    use crate::core::time::FixedClock;
    use crate::domain::{Currency, Expense, Group, NewExpense, NewGroup, PaidDetails, UserIndex};
    use crate::errors::ErrorCategory;
    use crate::storage::InMemoryStore;
    use chrono::Duration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    async fn seeded(days: i64, amount: f64) -> (Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let group = Group::from_new(NewGroup::new(
            "Trip",
            Currency::Usd,
            vec![UserIndex::new(1, "Ana"), UserIndex::new(2, "Ben")],
        ));
        let group = store.insert_group(group).await.unwrap();
        for offset in 1..=days {
            let expense = Expense::from_new(
                group.id,
                NewExpense::new(
                    group.id,
                    "Daily",
                    start() + Duration::days(offset),
                    amount,
                    PaidDetails::amounts(&[(1, amount)]),
                    PaidDetails::amounts(&[(2, amount)]),
                ),
            );
            store.insert_expense(expense).await.unwrap();
        }
        (store, group.id)
    }

    fn service(store: Arc<InMemoryStore>, today: NaiveDate) -> ForecastService {
        ForecastService::new(
            store.clone(),
            store,
            Arc::new(FixedClock::new(today)),
            HoltLinear::default(),
        )
    }

    #[tokio::test]
    async fn constant_spend_forecasts_the_same_spend() {
        let (store, group_id) = seeded(10, 20.0).await;
        let service = service(store, start() + Duration::days(10));
        let values = service.predict(group_id, start(), 2.0).await.unwrap();
        assert_eq!(values, vec![20.0, 20.0]);
    }

    #[tokio::test]
    async fn invalid_horizon_is_rejected_before_any_lookup() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store, start());
        for horizon in [0.0, 2.5, -1.0] {
            let err = service
                .predict(Uuid::new_v4(), start(), horizon)
                .await
                .unwrap_err();
            assert_eq!(err.category(), ErrorCategory::InputValidation);
            assert_eq!(
                err.reason(),
                "Prediction length must be at least 1 and an integer"
            );
        }
    }

    #[tokio::test]
    async fn unknown_group_is_reported() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store, start());
        let err = service.predict(Uuid::new_v4(), start(), 1.0).await.unwrap_err();
        assert!(matches!(err, SplitError::GroupNotFound(_)));
    }

    #[tokio::test]
    async fn short_history_is_insufficient() {
        let (store, group_id) = seeded(4, 10.0).await;
        let service = service(store, start() + Duration::days(4));
        let err = service.predict(group_id, start(), 1.0).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InsufficientData);
    }

    #[test]
    fn engine_failure_is_internal() {
        let engine = HoltLinear::new(
            Smoothing::Fixed {
                alpha: 2.0,
                beta: 0.5,
            },
            1,
        );
        let history: Vec<DatedAmount> = (1..=5)
            .map(|offset| DatedAmount::new(3.0, start() + Duration::days(offset)))
            .collect();
        let horizon = PredictionHorizon::new(1).unwrap();
        let err = forecast_series(&engine, &history, start(), start() + Duration::days(5), horizon)
            .unwrap_err();
        assert_eq!(err, SplitError::Forecast("Could not predict future expenses".into()));
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
