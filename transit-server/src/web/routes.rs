//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::domain::{GeoPoint, PlateNumber, TransportMode, ValidationError, VehicleType};
use crate::estimate;
use crate::fleet::FleetError;
use crate::transit::TransitError;

use super::dto::*;
use super::state::AppState;

/// Fallback tariff the fare-estimate endpoint quotes for any mode string
/// outside the four vehicle tariff tables, active modes included.
/// Deliberately different from the estimator's tables; this reproduces the
/// long-standing boundary behavior.
const FALLBACK_BASE_FARE: f64 = 15.0;
const FALLBACK_PER_KM_RATE: f64 = 8.0;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/estimate", post(estimate_trip))
        .route("/api/transport/fare-estimate", post(fare_estimate))
        .route("/api/transport/bus-stops", get(bus_stops))
        .route("/api/transport/book", post(book_ride))
        .route("/api/transport/bookings/user/:user_id", get(user_bookings))
        .route("/api/routes", get(list_routes).post(create_route))
        .route("/api/routes/search", post(search_routes))
        .route("/api/routes/:id", get(get_route))
        .route("/api/vehicles/nearby", get(nearby_vehicles))
        .route("/api/vehicles/:plate", get(vehicle_snapshot))
        .route("/api/railway/schedules/:station", get(train_schedules))
        .route("/api/railway/booking-link/:train", get(booking_link))
        .route("/api/railway/live-status/:train", get(train_live_status))
        .route("/api/railway/delays", post(report_delay))
        .route("/api/railway/delays/:station_code", get(station_delays))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Typed trip estimate: distance, ETA, fare and carbon cost.
async fn estimate_trip(
    Json(req): Json<EstimateRequest>,
) -> Result<Json<estimate::Estimate>, AppError> {
    let origin = req.origin.into_point()?;
    let destination = req.destination.into_point()?;
    let waypoints = req
        .waypoints
        .into_iter()
        .map(Coord::into_point)
        .collect::<Result<Vec<GeoPoint>, _>>()?;
    let mode = TransportMode::parse(&req.mode)?;

    Ok(Json(estimate::estimate(
        &origin,
        &destination,
        &waypoints,
        mode,
    )))
}

/// Boundary fare quote with breakdown.
///
/// Unlike the typed estimate, this accepts any mode string. Only the four
/// vehicle types carry a tariff here; everything else, cycling and walking
/// included, is quoted at the fallback tariff.
async fn fare_estimate(
    Json(req): Json<FareEstimateRequest>,
) -> Result<Json<FareEstimateResponse>, AppError> {
    let origin = req.origin.into_point()?;
    let destination = req.destination.into_point()?;
    let distance = origin.distance_km(&destination);

    let (base, rate) = match VehicleType::parse(&req.transport_mode) {
        Ok(vehicle_type) => {
            let mode = vehicle_type.transport_mode();
            (estimate::base_fare(mode), estimate::per_km_rate(mode))
        }
        Err(_) => (FALLBACK_BASE_FARE, FALLBACK_PER_KM_RATE),
    };

    let distance_fare = (distance * rate).round() as i64;
    let estimated_fare = (base + distance * rate).round() as i64;

    Ok(Json(FareEstimateResponse {
        distance: (distance * 100.0).round() / 100.0,
        estimated_fare,
        transport_mode: req.transport_mode,
        breakdown: FareBreakdown {
            base_fare: base,
            distance_fare,
            total: estimated_fare,
        },
    }))
}

/// The bus-stop list (read-through cached).
async fn bus_stops(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stops = state.transit.bus_stops().await?;
    Ok(Json(stops))
}

/// The route list (read-through cached).
async fn list_routes(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let routes = state.transit.routes().await?;
    Ok(Json(routes))
}

/// Insert a route; the cached route list is invalidated before the
/// response is sent.
async fn create_route(
    State(state): State<AppState>,
    Json(req): Json<CreateRouteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let origin = req.origin.into_point()?;
    let destination = req.destination.into_point()?;
    let mode = TransportMode::parse(&req.transport_mode)?;

    let distance = origin.distance_km(&destination);
    let record = state
        .transit
        .create_route(crate::store::NewRoute {
            name: req.name,
            origin,
            destination,
            mode,
            eta_mins: estimate::travel_time_mins(distance, mode),
            cost: estimate::fare(distance, mode),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// A single route by id. Keyed lookups bypass the cache.
async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let route = state.transit.route(id).await.map_err(|e| match e {
        TransitError::Store(crate::store::StoreError::NotFound) => AppError::NotFound {
            message: format!("route not found: {id}"),
        },
        other => other.into(),
    })?;
    Ok(Json(route))
}

/// Search route options between two points (read-through cached).
async fn search_routes(
    State(state): State<AppState>,
    Json(req): Json<RouteSearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let origin = req.origin.into_point()?;
    let destination = req.destination.into_point()?;
    let mode = req
        .transport_mode
        .as_deref()
        .map(TransportMode::parse)
        .transpose()?;

    let results = state.transit.search_routes(origin, destination, mode).await?;
    Ok(Json(results))
}

/// Available vehicles near a point, nearest first.
async fn nearby_vehicles(
    State(state): State<AppState>,
    Query(query): Query<NearbyVehiclesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let here = GeoPoint::new(query.latitude, query.longitude)?;
    let vehicle_type = query
        .r#type
        .as_deref()
        .map(VehicleType::parse)
        .transpose()?;
    let radius = query.radius.unwrap_or(5.0);

    let vehicles = state.fleet.nearby(&here, radius, vehicle_type).await;
    Ok(Json(vehicles))
}

/// Snapshot of a single vehicle by plate.
async fn vehicle_snapshot(
    State(state): State<AppState>,
    Path(plate): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let plate = PlateNumber::parse(&plate)?;
    let snapshot = state
        .fleet
        .snapshot(&plate)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("no vehicle registered under {plate}"),
        })?;
    Ok(Json(snapshot))
}

/// Book a ride.
async fn book_ride(
    State(state): State<AppState>,
    Json(req): Json<BookRideRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .transit
        .book_ride(crate::store::NewBooking {
            user_id: req.user_id,
            vehicle_id: req.vehicle_id,
            origin: req.origin.into_point()?,
            destination: req.destination.into_point()?,
            estimated_fare: req.estimated_fare,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// A user's booking history.
async fn user_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.transit.user_bookings(user_id).await?;
    Ok(Json(bookings))
}

/// Train schedules for a station, decorated with live status.
async fn train_schedules(
    State(state): State<AppState>,
    Path(station): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let schedule = state
        .railway
        .schedules(&station)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("station not found: {station}"),
        })?;
    Ok(Json(schedule))
}

/// Reservation links for a train.
async fn booking_link(
    State(state): State<AppState>,
    Path(train): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let links = state.railway.booking_links(&train)?;
    Ok(Json(links))
}

/// Live running status for a single train.
async fn train_live_status(
    State(state): State<AppState>,
    Path(train): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let status = state.railway.live_status(&train)?;
    Ok(Json(status))
}

/// Accept a rider-reported delay onto the delay board.
async fn report_delay(
    State(state): State<AppState>,
    Json(req): Json<DelayReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let report = state
        .railway
        .report_delay(
            &req.train_number,
            &req.station_code,
            req.delay_minutes,
            req.reason,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Active delay reports for a station.
async fn station_delays(
    State(state): State<AppState>,
    Path(station_code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.railway.active_delays(&station_code).await))
}

/// Application-level errors for HTTP responses.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<TransitError> for AppError {
    fn from(e: TransitError) -> Self {
        match e {
            TransitError::Validation(v) => v.into(),
            TransitError::Store(s) => AppError::Internal {
                message: s.to_string(),
            },
        }
    }
}

impl From<FleetError> for AppError {
    fn from(e: FleetError) -> Self {
        match e {
            FleetError::UnknownVehicle(_) => AppError::NotFound {
                message: e.to_string(),
            },
            FleetError::AlreadyRegistered(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            FleetError::Validation(v) => v.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        tracing::debug!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fare_request(mode: &str) -> FareEstimateRequest {
        FareEstimateRequest {
            origin: Coord {
                latitude: 21.2094,
                longitude: 81.3947,
            },
            destination: Coord {
                latitude: 21.1938,
                longitude: 81.3509,
            },
            transport_mode: mode.to_string(),
        }
    }

    #[test]
    fn fallback_tariff_differs_from_the_estimator() {
        // Known modes use the estimator tables.
        assert_eq!(estimate::base_fare(TransportMode::Auto), 15.0);
        assert_eq!(estimate::base_fare(TransportMode::Bus), 10.0);

        // The boundary fallback is a distinct tariff, preserved as-is.
        assert_ne!(FALLBACK_BASE_FARE, estimate::base_fare(TransportMode::Bus));
        assert_eq!(FALLBACK_BASE_FARE, 15.0);
        assert_eq!(FALLBACK_PER_KM_RATE, 8.0);
    }

    #[tokio::test]
    async fn fare_estimate_quotes_vehicle_tariffs_for_vehicle_types() {
        let Json(resp) = fare_estimate(Json(fare_request("bus"))).await.unwrap();
        assert_eq!(resp.breakdown.base_fare, 10.0);
        assert_eq!(
            resp.estimated_fare,
            (10.0 + resp.distance * 2.0).round() as i64
        );
    }

    #[tokio::test]
    async fn fare_estimate_quotes_fallback_for_active_modes() {
        // Cycling and walking are fare-free in the estimator, but this
        // endpoint only carries the four vehicle tariffs; anything else gets
        // the fallback quote.
        for mode in ["cycling", "walking", "jetpack"] {
            let Json(resp) = fare_estimate(Json(fare_request(mode))).await.unwrap();
            assert_eq!(resp.breakdown.base_fare, FALLBACK_BASE_FARE, "{mode}");
            assert_eq!(
                resp.estimated_fare,
                (FALLBACK_BASE_FARE + resp.distance * FALLBACK_PER_KM_RATE).round() as i64,
                "{mode}"
            );
            assert!(resp.estimated_fare > 0, "{mode}");
        }
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err: AppError = ValidationError::Latitude(95.0).into();
        assert!(matches!(err, AppError::BadRequest { .. }));

        let err: AppError = TransitError::Validation(ValidationError::EndpointsTooClose).into();
        assert!(matches!(err, AppError::BadRequest { .. }));

        let err: AppError = FleetError::UnknownVehicle("CG07AB1234".into()).into();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
