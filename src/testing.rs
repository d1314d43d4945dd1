//! In-memory store used by unit tests across the crate.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    store::{ReadingStore, RecommendationSink},
    Reading, RecommendationRecord, ValidReading, WindowedAverages,
};

// ---

#[derive(Default)]
pub struct FakeStore {
    readings: Mutex<Vec<Reading>>,
    records: Mutex<Vec<RecommendationRecord>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a reading with an explicit timestamp.
    pub fn push(
        &self,
        device: &str,
        at: DateTime<Utc>,
        temperatura: f64,
        oxigenio: Option<f64>,
        ph: Option<f64>,
    ) {
        // ---
        let mut readings = self.readings.lock().unwrap();
        let id = readings.len() as i32 + 1;
        readings.push(Reading {
            id,
            dispositivo_id: device.to_string(),
            temperatura,
            oxigenio,
            ph,
            data_hora: at,
        });
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<RecommendationRecord> {
        self.records.lock().unwrap().clone()
    }

    fn check_reads(&self) -> Result<(), sqlx::Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[async_trait]
impl ReadingStore for FakeStore {
    async fn insert_reading(&self, reading: &ValidReading) -> Result<Reading, sqlx::Error> {
        // ---
        self.check_reads()?;
        self.push(
            &reading.dispositivo_id,
            Utc::now(),
            reading.temperatura,
            reading.oxigenio,
            reading.ph,
        );
        Ok(self.readings.lock().unwrap().last().cloned().unwrap())
    }

    async fn windowed_averages(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<WindowedAverages, sqlx::Error> {
        // ---
        self.check_reads()?;
        let readings = self.readings.lock().unwrap();
        let in_window: Vec<&Reading> = readings
            .iter()
            .filter(|r| r.dispositivo_id == device_id && r.data_hora >= start && r.data_hora <= end)
            .collect();

        let temps: Vec<f64> = in_window.iter().map(|r| r.temperatura).collect();
        let oxs: Vec<f64> = in_window.iter().filter_map(|r| r.oxigenio).collect();
        let phs: Vec<f64> = in_window.iter().filter_map(|r| r.ph).collect();

        Ok(WindowedAverages {
            avg_temp: average(&temps),
            avg_ox: average(&oxs),
            avg_ph: average(&phs),
            cnt_temp: temps.len() as i64,
            cnt_ox: oxs.len() as i64,
            cnt_ph: phs.len() as i64,
        })
    }

    async fn recent_readings(
        &self,
        device_id: &str,
        limit: i64,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        // ---
        self.check_reads()?;
        let mut rows: Vec<Reading> = self
            .readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.dispositivo_id == device_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.data_hora.cmp(&a.data_hora));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn latest_reading(&self, device_id: &str) -> Result<Option<Reading>, sqlx::Error> {
        Ok(self.recent_readings(device_id, 1).await?.into_iter().next())
    }
}

#[async_trait]
impl RecommendationSink for FakeStore {
    async fn insert_recommendation(&self, record: &RecommendationRecord) -> Result<(), sqlx::Error> {
        // ---
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolClosed);
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
