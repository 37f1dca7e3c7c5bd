use crate::errors::AppError;
use crate::models::{DateKey, DayResponse, HistoryResponse, HourKey, ToggleRequest, ToggleResponse};
use crate::state::AppState;
use crate::storage::KeyValueMedium;
use crate::stats::build_history_at;
use crate::tracker::reference_hour;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Json,
};
use chrono::{Local, NaiveDateTime};
use tracing::info;

pub async fn index<M: KeyValueMedium + 'static>(
    State(state): State<AppState<M>>,
) -> Html<String> {
    let now = local_now();
    let day = day_view(&state, DateKey::new(now.date()), now).await;
    Html(render_index(&day))
}

pub async fn get_today<M: KeyValueMedium + 'static>(
    State(state): State<AppState<M>>,
) -> Json<DayResponse> {
    let now = local_now();
    Json(day_view(&state, DateKey::new(now.date()), now).await)
}

pub async fn get_day<M: KeyValueMedium + 'static>(
    State(state): State<AppState<M>>,
    Path(date): Path<String>,
) -> Result<Json<DayResponse>, AppError> {
    let date = parse_date(&date)?;
    Ok(Json(day_view(&state, date, local_now()).await))
}

pub async fn get_history<M: KeyValueMedium + 'static>(
    State(state): State<AppState<M>>,
) -> Json<HistoryResponse> {
    let tracker = state.tracker.lock().await;
    Json(build_history_at(local_now(), tracker.record(), &state.window))
}

pub async fn toggle<M: KeyValueMedium + 'static>(
    State(state): State<AppState<M>>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    let now = local_now();
    let hour = parse_hour(payload.hour.trim())?;
    let date = match payload.date.as_deref().map(str::trim) {
        Some(raw) => parse_date(raw)?,
        None => DateKey::new(now.date()),
    };

    let response = apply_toggle(&state, date, hour, now).await?;
    Ok(Json(response))
}

pub async fn toggle_form<M: KeyValueMedium + 'static>(
    State(state): State<AppState<M>>,
    Path(hour): Path<String>,
) -> Result<Redirect, AppError> {
    let now = local_now();
    let hour = parse_hour(&hour)?;
    apply_toggle(&state, DateKey::new(now.date()), hour, now).await?;
    Ok(Redirect::to("/"))
}

async fn apply_toggle<M: KeyValueMedium>(
    state: &AppState<M>,
    date: DateKey,
    hour: HourKey,
    now: NaiveDateTime,
) -> Result<ToggleResponse, AppError> {
    if !state.window.contains(hour) {
        return Err(AppError::bad_request(format!(
            "hour {hour} is outside the tracked window"
        )));
    }

    let mut tracker = state.tracker.lock().await;
    if tracker.classify_hour(date, hour, reference_hour(date, now)).is_future {
        return Err(AppError::bad_request("future hours cannot be toggled"));
    }

    let outcome = tracker.toggle(date, hour).await;
    info!(%date, %hour, completed = outcome.completed, "toggled hour");

    Ok(ToggleResponse {
        date,
        hour,
        completed: outcome.completed,
        persisted: outcome.persisted(),
        warning: outcome.save_error.map(|err| err.to_string()),
    })
}

async fn day_view<M: KeyValueMedium>(
    state: &AppState<M>,
    date: DateKey,
    now: NaiveDateTime,
) -> DayResponse {
    let now_hour = reference_hour(date, now);
    let tracker = state.tracker.lock().await;
    DayResponse {
        date,
        hours: tracker.hour_slots(date, &state.window, now_hour),
        progress: tracker.daily_progress(date, &state.window, now_hour),
    }
}

fn parse_date(raw: &str) -> Result<DateKey, AppError> {
    raw.parse::<DateKey>().map_err(AppError::bad_request)
}

fn parse_hour(raw: &str) -> Result<HourKey, AppError> {
    raw.parse::<HourKey>().map_err(AppError::bad_request)
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HourWindow;
    use crate::storage::{DEFAULT_STORAGE_KEY, MemoryMedium, PersistentStore};
    use crate::tracker::CompletionTracker;

    async fn state_with(medium: MemoryMedium) -> AppState<MemoryMedium> {
        let mut tracker = CompletionTracker::new(PersistentStore::new(medium, DEFAULT_STORAGE_KEY));
        tracker.initialize().await;
        AppState::new(HourWindow::default(), tracker)
    }

    fn past_toggle(hour: &str) -> Json<ToggleRequest> {
        Json(ToggleRequest {
            hour: hour.to_string(),
            date: Some("2024-06-01".to_string()),
        })
    }

    #[tokio::test]
    async fn toggle_reports_unpersisted_flip_as_warning() {
        let medium = MemoryMedium::new();
        medium.reject_writes(true);
        let state = state_with(medium.clone()).await;

        let Json(response) = toggle(State(state.clone()), past_toggle("10:00"))
            .await
            .unwrap();
        assert!(response.completed);
        assert!(!response.persisted);
        assert!(response.warning.is_some());

        let tracker = state.tracker.lock().await;
        assert!(tracker.is_completed(response.date, response.hour));
        assert!(medium.stored(DEFAULT_STORAGE_KEY).await.is_none());
    }

    #[tokio::test]
    async fn toggle_reports_persisted_flip() {
        let medium = MemoryMedium::new();
        let state = state_with(medium.clone()).await;

        let Json(response) = toggle(State(state), past_toggle("11:00")).await.unwrap();
        assert!(response.completed);
        assert!(response.persisted);
        assert!(response.warning.is_none());
        assert!(medium.stored(DEFAULT_STORAGE_KEY).await.is_some());
    }

    #[tokio::test]
    async fn apply_toggle_rejects_future_and_outside_hours() {
        let state = state_with(MemoryMedium::new()).await;
        let date: DateKey = "2024-06-01".parse().unwrap();
        let now = date.date().and_hms_opt(12, 5, 0).unwrap();

        let future = apply_toggle(&state, date, "13:00".parse().unwrap(), now).await;
        assert_eq!(future.unwrap_err().status, axum::http::StatusCode::BAD_REQUEST);

        let outside = apply_toggle(&state, date, "08:00".parse().unwrap(), now).await;
        assert_eq!(outside.unwrap_err().status, axum::http::StatusCode::BAD_REQUEST);

        let current = apply_toggle(&state, date, "12:00".parse().unwrap(), now).await;
        assert!(current.unwrap().completed);
        let completed: Vec<HourKey> = state.tracker.lock().await.record().completed_on(date).collect();
        assert_eq!(completed, vec![HourKey::new(12).unwrap()]);
    }
}
