use crate::config::ServiceConfig;
use crate::domain::payment::{PaymentRecord, PaymentRequest, PaymentStatus, SubmissionOutcome};
use crate::domain::report::{self, Report, ReportType};
use crate::error::{ErrorKind, ExceptionHandler, FeeError, Thrown};
use crate::services::clock::{Clock, SystemClock};
use crate::services::dedup::DuplicateFilter;
use crate::services::id_generator::IdGenerator;
use crate::services::lock_manager::LockManager;
use crate::services::simulator::Simulator;
use indexmap::IndexMap;
use log::Level;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayments {
    pub student_id: String,
    pub payments: Vec<PaymentRecord>,
}

// Each instance owns its own ledger, locks and dedup state.
pub struct PaymentService {
    config: ServiceConfig,
    clock: Arc<dyn Clock>,
    locks: LockManager,
    dedup: DuplicateFilter,
    ids: IdGenerator,
    simulator: Arc<Simulator>,
    ledger: Mutex<IndexMap<String, PaymentRecord>>,
}

impl PaymentService {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        PaymentService {
            locks: LockManager::new(),
            dedup: DuplicateFilter::new(config.dedup_window),
            ids: IdGenerator::new(Arc::clone(&clock)),
            simulator: Arc::new(Simulator::from_config(&config)),
            ledger: Mutex::new(IndexMap::new()),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn locks(&self) -> &LockManager {
        &self.locks
    }

    pub async fn submit(&self, request: PaymentRequest) -> SubmissionOutcome {
        match self.try_submit(request).await {
            Ok(record) => SubmissionOutcome::accepted(&record),
            Err(thrown) => {
                let handled = match rejection_level(&thrown) {
                    Level::Warn => {
                        log::warn!("Payment rejected: {}", thrown);
                        ExceptionHandler::handle(&thrown)
                    }
                    _ => ExceptionHandler::log(&thrown),
                };
                SubmissionOutcome::rejected(handled)
            }
        }
    }

    pub async fn try_submit(&self, request: PaymentRequest) -> Result<PaymentRecord, Thrown> {
        let submission = request.validate(self.config.max_amount)?;

        if self
            .dedup
            .is_duplicate(&submission.student_id, submission.amount, self.clock.now())
        {
            log::debug!(
                "Duplicate rejected: student={}, amount={}",
                submission.student_id,
                submission.amount
            );
            return Err(duplicate().into());
        }

        let permit = self.locks.acquire(&submission.student_id).await;

        // A same-key submission may have been accepted while we queued.
        if self
            .dedup
            .is_duplicate(&submission.student_id, submission.amount, self.clock.now())
        {
            log::debug!(
                "Duplicate rejected after wait: student={}, amount={}",
                submission.student_id,
                submission.amount
            );
            return Err(duplicate().into());
        }

        let simulator = Arc::clone(&self.simulator);
        let charged = submission.clone();
        tokio::spawn(async move { simulator.charge(&charged).await }).await??;

        let record = PaymentRecord {
            id: self.ids.next_id(),
            student_id: submission.student_id,
            amount: submission.amount,
            method: submission.method,
            created_at: self.clock.now(),
            status: PaymentStatus::Completed,
        };

        self.ledger
            .lock()
            .await
            .insert(record.id.clone(), record.clone());
        self.dedup
            .record(&record.student_id, record.amount, record.created_at);
        self.dedup.purge_expired(record.created_at);

        log::info!(
            "Payment accepted: id={}, student={}, amount={}, method={}",
            record.id,
            record.student_id,
            record.amount,
            record.method
        );

        drop(permit);
        Ok(record)
    }

    pub async fn payments(&self) -> Vec<PaymentRecord> {
        self.ledger.lock().await.values().cloned().collect()
    }

    pub async fn payments_by_student(&self) -> Vec<StudentPayments> {
        let ledger = self.ledger.lock().await;
        let mut grouped: IndexMap<&str, Vec<PaymentRecord>> = IndexMap::new();
        for record in ledger.values() {
            grouped
                .entry(record.student_id.as_str())
                .or_default()
                .push(record.clone());
        }
        grouped
            .into_iter()
            .map(|(student_id, payments)| StudentPayments {
                student_id: student_id.to_string(),
                payments,
            })
            .collect()
    }

    pub async fn generate_report(&self, report_type: &str) -> Result<Report, FeeError> {
        let result = self.try_generate_report(report_type).await;
        if let Err(err) = &result {
            if err.field.is_none() {
                ExceptionHandler::log(&Thrown::Fee(err.clone()));
            }
        }
        result
    }

    async fn try_generate_report(&self, report_type: &str) -> Result<Report, FeeError> {
        let report_type: ReportType = report_type.parse()?;
        self.simulator.query_reports().await?;

        let payments = self.payments().await;
        let report = Report::build(report_type, &payments, self.clock.now());
        log::info!(
            "Report generated: type={:?}, payments={}, total={}",
            report.report_type,
            report.total_payments,
            report.total_amount
        );
        Ok(report)
    }

    pub async fn write_ledger<W: Write>(&self, writer: W) -> Result<(), Thrown> {
        let payments = self.payments().await;
        report::write_ledger_csv(&payments, writer)?;
        Ok(())
    }
}

impl Default for PaymentService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

// Client-side rejections are expected traffic and stay out of the error log.
fn rejection_level(thrown: &Thrown) -> Level {
    match thrown {
        Thrown::Fee(err) if matches!(err.kind, ErrorKind::Validation | ErrorKind::Concurrency) => {
            Level::Warn
        }
        _ => Level::Error,
    }
}

fn duplicate() -> FeeError {
    FeeError::concurrency().with_message("Duplicate payment detected")
}
