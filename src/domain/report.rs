use crate::domain::payment::{serialize_amount, PaymentMethod, PaymentRecord};
use crate::error::{FeeError, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ReportType {
    pub fn period(self) -> Duration {
        match self {
            ReportType::Daily => Duration::days(1),
            ReportType::Weekly => Duration::days(7),
            ReportType::Monthly => Duration::days(30),
            ReportType::Yearly => Duration::days(365),
        }
    }
}

impl FromStr for ReportType {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(ReportType::Daily),
            "weekly" => Ok(ReportType::Weekly),
            "monthly" => Ok(ReportType::Monthly),
            "yearly" => Ok(ReportType::Yearly),
            "" => Err(FeeError::validation("Report type is required", "reportType")),
            other => Err(FeeError::validation(
                format!("Unsupported report type: {}", other),
                "reportType",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_type: ReportType,
    pub generated_at: DateTime<Utc>,
    pub period_start: DateTime<Utc>,
    pub total_payments: usize,
    #[serde(serialize_with = "serialize_amount")]
    pub total_amount: Decimal,
    pub payments_by_method: BTreeMap<PaymentMethod, usize>,
}

impl Report {
    pub fn build(report_type: ReportType, payments: &[PaymentRecord], now: DateTime<Utc>) -> Self {
        let period_start = now - report_type.period();
        let mut total_payments = 0;
        let mut total_amount = Decimal::ZERO;
        let mut payments_by_method = BTreeMap::new();

        for payment in payments
            .iter()
            .filter(|p| p.created_at > period_start && p.created_at <= now)
        {
            total_payments += 1;
            total_amount += payment.amount;
            *payments_by_method.entry(payment.method).or_insert(0) += 1;
        }

        Report {
            report_type,
            generated_at: now,
            period_start,
            total_payments,
            total_amount,
            payments_by_method,
        }
    }
}

#[derive(Serialize)]
struct LedgerRow<'a> {
    id: &'a str,
    student_id: &'a str,
    amount: String,
    method: &'static str,
    created_at: String,
    status: &'static str,
}

pub fn write_ledger_csv<W: Write>(payments: &[PaymentRecord], writer: W) -> std::result::Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for payment in payments {
        csv_writer.serialize(LedgerRow {
            id: &payment.id,
            student_id: &payment.student_id,
            amount: format!("{:.2}", payment.amount),
            method: payment.method.as_str(),
            created_at: payment.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            status: "completed",
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}
