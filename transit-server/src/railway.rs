//! Railway schedules and booking links.
//!
//! Serves the fixed timetable for the Durg and Bhilai Nagar stations,
//! decorated with a live status per train. Live status comes from a
//! `DelaySource`, injected so the binary can use randomized mock delays
//! while tests pin outcomes deterministically. Decorated schedules are
//! cached read-through for 5 minutes. Rider-reported delays are held on an
//! in-process board, queryable per station while they stay active.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::cache::{CacheBackend, CacheGateway, keys, ttl};
use crate::domain::{TrainNumber, ValidationError};

/// Live running status of a train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LiveStatus {
    OnTime,
    Delayed { minutes: u32 },
}

impl fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveStatus::OnTime => f.write_str("On Time"),
            LiveStatus::Delayed { minutes } => write!(f, "Delayed by {minutes} min"),
        }
    }
}

/// Source of live train status.
///
/// There is no real telemetry feed; the production binary injects
/// randomized mock delays, tests inject a fixed source.
pub trait DelaySource: Send + Sync {
    fn live_status(&self, train: &TrainNumber) -> LiveStatus;
}

/// Mock delay source: roughly 30% of trains report a 5-35 minute delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDelays;

impl DelaySource for RandomDelays {
    fn live_status(&self, _train: &TrainNumber) -> LiveStatus {
        let mut rng = rand::rng();
        if rng.random_bool(0.3) {
            LiveStatus::Delayed {
                minutes: rng.random_range(5..35),
            }
        } else {
            LiveStatus::OnTime
        }
    }
}

/// Delay source that reports the same status for every train.
#[derive(Debug, Clone, Copy)]
pub struct FixedStatus(pub LiveStatus);

impl DelaySource for FixedStatus {
    fn live_status(&self, _train: &TrainNumber) -> LiveStatus {
        self.0
    }
}

/// A train in the static timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTrain {
    pub number: TrainNumber,
    pub name: String,
    pub arrival: String,
    pub departure: String,
    pub platform: String,
    pub destination: String,
}

/// A station's schedule decorated with live status, as served to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSchedule {
    pub station: String,
    pub station_code: String,
    pub last_updated: DateTime<Utc>,
    pub trains: Vec<LiveTrain>,
}

/// A scheduled train with its live status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTrain {
    #[serde(flatten)]
    pub train: ScheduledTrain,
    pub live_status: LiveStatus,
}

/// Booking links for a train on the common reservation platforms.
#[derive(Debug, Clone, Serialize)]
pub struct BookingLinks {
    pub train_number: TrainNumber,
    pub booking_url: String,
    pub alternatives: Vec<AlternativeBooking>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlternativeBooking {
    pub platform: &'static str,
    pub url: String,
}

/// The live running position of a single train, as served to callers.
#[derive(Debug, Clone, Serialize)]
pub struct TrainLiveStatus {
    pub train_number: TrainNumber,
    /// Name from the timetable; absent for trains outside it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_name: Option<String>,
    pub live_status: LiveStatus,
    pub last_updated: DateTime<Utc>,
}

/// A rider-reported delay, validated and held on the delay board. Push
/// delivery and durable storage are handled elsewhere.
#[derive(Debug, Clone, Serialize)]
pub struct DelayReport {
    pub train_number: TrainNumber,
    pub station_code: String,
    pub delay_minutes: u32,
    pub reason: String,
    pub reported_at: DateTime<Utc>,
    pub status: &'static str,
}

impl DelayReport {
    /// Validate and timestamp a delay report.
    pub fn new(
        train_number: &str,
        station_code: &str,
        delay_minutes: u32,
        reason: Option<String>,
    ) -> Result<Self, ValidationError> {
        let train_number = TrainNumber::parse(train_number)?;

        Ok(Self {
            train_number,
            station_code: station_code.to_string(),
            delay_minutes,
            reason: reason.unwrap_or_else(|| "Technical reasons".to_string()),
            reported_at: Utc::now(),
            status: "active",
        })
    }
}

struct StationTimetable {
    key: &'static str,
    station: &'static str,
    code: &'static str,
    trains: &'static [(&'static str, &'static str, &'static str, &'static str, &'static str, &'static str)],
}

/// Fixed timetable for the region's two stations.
/// Columns: number, name, arrival, departure, platform, destination.
const TIMETABLE: &[StationTimetable] = &[
    StationTimetable {
        key: "durg",
        station: "Durg",
        code: "DURG",
        trains: &[
            ("12853", "Amarkantak Express", "06:10", "06:15", "1", "Anand Vihar Terminal"),
            ("18237", "Chattisgarh Express", "14:25", "14:30", "2", "Bilaspur Junction"),
            ("12409", "Gondwana Express", "22:40", "22:45", "3", "Hazrat Nizamuddin"),
        ],
    },
    StationTimetable {
        key: "bhilai-nagar",
        station: "Bhilai Nagar",
        code: "BIA",
        trains: &[
            ("18029", "Kurukshetra Express", "07:18", "07:20", "1", "Kurukshetra Junction"),
            ("12854", "Amarkantak Express", "19:30", "19:35", "2", "Jabalpur Junction"),
        ],
    },
];

/// Railway information service: schedules with live status, booking links
/// and the rider-reported delay board.
pub struct RailwayService<B, D> {
    cache: CacheGateway<B>,
    delays: D,
    reports: RwLock<Vec<DelayReport>>,
}

impl<B: CacheBackend, D: DelaySource> RailwayService<B, D> {
    pub fn new(cache: CacheGateway<B>, delays: D) -> Self {
        Self {
            cache,
            delays,
            reports: RwLock::new(Vec::new()),
        }
    }

    /// The live-decorated schedule for a station, or `None` for a station
    /// outside the timetable. Station names are matched case-insensitively.
    /// Cached for 5 minutes; the decorated statuses are cached with it.
    pub async fn schedules(&self, station: &str) -> Option<LiveSchedule> {
        let key = keys::train_schedule(station);
        if let Some(cached) = self.cache.get_json(&key).await {
            return Some(cached);
        }

        let normalized = station.trim().to_lowercase();
        let timetable = TIMETABLE.iter().find(|t| t.key == normalized)?;

        let trains = timetable
            .trains
            .iter()
            .filter_map(|&(number, name, arrival, departure, platform, destination)| {
                let number = TrainNumber::parse(number).ok()?;
                let live_status = self.delays.live_status(&number);
                Some(LiveTrain {
                    train: ScheduledTrain {
                        number,
                        name: name.to_string(),
                        arrival: arrival.to_string(),
                        departure: departure.to_string(),
                        platform: platform.to_string(),
                        destination: destination.to_string(),
                    },
                    live_status,
                })
            })
            .collect();

        let schedule = LiveSchedule {
            station: timetable.station.to_string(),
            station_code: timetable.code.to_string(),
            last_updated: Utc::now(),
            trains,
        };

        self.cache.set_json(&key, &schedule, ttl::SCHEDULES).await;
        Some(schedule)
    }

    /// The live running status of a single train. Always answers for a
    /// well-formed train number; the name is filled in from the timetable
    /// when the train appears there.
    pub fn live_status(&self, train_number: &str) -> Result<TrainLiveStatus, ValidationError> {
        let number = TrainNumber::parse(train_number)?;

        let train_name = TIMETABLE
            .iter()
            .flat_map(|t| t.trains.iter())
            .find(|&&(candidate, ..)| candidate == number.as_str())
            .map(|&(_, name, ..)| name.to_string());

        Ok(TrainLiveStatus {
            live_status: self.delays.live_status(&number),
            train_number: number,
            train_name,
            last_updated: Utc::now(),
        })
    }

    /// Record a rider-reported delay on the board and return it.
    pub async fn report_delay(
        &self,
        train_number: &str,
        station_code: &str,
        delay_minutes: u32,
        reason: Option<String>,
    ) -> Result<DelayReport, ValidationError> {
        let report = DelayReport::new(train_number, station_code, delay_minutes, reason)?;
        self.reports.write().await.push(report.clone());
        Ok(report)
    }

    /// Active delay reports for a station, newest first. Station codes are
    /// matched case-insensitively.
    pub async fn active_delays(&self, station_code: &str) -> Vec<DelayReport> {
        let reports = self.reports.read().await;
        let mut matches: Vec<DelayReport> = reports
            .iter()
            .filter(|r| r.status == "active" && r.station_code.eq_ignore_ascii_case(station_code))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));
        matches
    }

    /// Booking links for a train number across reservation platforms.
    pub fn booking_links(&self, train_number: &str) -> Result<BookingLinks, ValidationError> {
        let number = TrainNumber::parse(train_number)?;

        Ok(BookingLinks {
            train_number: number,
            booking_url: format!(
                "https://www.irctc.co.in/nget/train-search?trainNumber={number}"
            ),
            alternatives: vec![
                AlternativeBooking {
                    platform: "ConfirmTkt",
                    url: format!("https://www.confirmtkt.com/train/{number}"),
                },
                AlternativeBooking {
                    platform: "Trainman",
                    url: format!("https://trainman.in/train/{number}"),
                },
            ],
        })
    }
}
