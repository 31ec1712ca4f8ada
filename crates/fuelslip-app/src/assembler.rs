//! Report assembly: rows in, numbered invoices and a summary out
//!
//! Allocation fans out over a small worker pool; everything positional
//! (slip-number continuation, invoice numbers) happens afterwards on the
//! results restored to input order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use chrono::Utc;
use fuelslip_domain::model::{BillingRun, RowRejection, VehicleAllocation, VehicleBillingRequest};
use fuelslip_domain::service::{
    allocate_request, continue_slip_numbers, number_invoices, summarize, InvoiceCounter,
};
use fuelslip_infra::{parse_row, RawRow};
use fuelslip_types::{Error, Result, RoundingPolicy};

use crate::config::BillingSettings;

/// Builds a [`BillingRun`] from loaded rows
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    settings: BillingSettings,
    jobs: usize,
    all_or_nothing: bool,
}

impl ReportAssembler {
    pub fn new(settings: BillingSettings) -> Self {
        Self {
            settings,
            jobs: 1,
            all_or_nothing: false,
        }
    }

    /// Number of allocation workers. 0 = CPU count.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        self
    }

    /// Fail the whole batch when any row is rejected
    pub fn all_or_nothing(mut self, enabled: bool) -> Self {
        self.all_or_nothing = enabled;
        self
    }

    pub fn assemble(&self, rows: &[RawRow]) -> Result<BillingRun> {
        self.assemble_with_progress(rows, &|| {})
    }

    /// Same as [`assemble`](Self::assemble); `progress` is called once per allocated vehicle
    pub fn assemble_with_progress(&self, rows: &[RawRow], progress: &(dyn Fn() + Sync)) -> Result<BillingRun> {
        let allocation = &self.settings.allocation;
        let counter = InvoiceCounter::starting_at(self.settings.start_invoice)?;

        let mut requests = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();
        for raw in rows {
            match parse_row(raw, &allocation.defaults) {
                Ok(request) => requests.push(request),
                Err(rejection) => rejected.push(rejection),
            }
        }
        self.check_rejections(&rejected)?;

        tracing::info!(
            rows = rows.len(),
            accepted = requests.len(),
            jobs = self.jobs,
            "allocating slips"
        );

        let mut allocations = Vec::with_capacity(requests.len());
        for (request, result) in requests
            .iter()
            .zip(allocate_all(&requests, allocation.rounding, self.jobs, progress))
        {
            match result {
                Ok(a) => allocations.push(a),
                Err(e @ Error::InvalidConfiguration { .. }) => return Err(e),
                Err(e) => rejected.push(RowRejection {
                    row: request.row,
                    vehicle: Some(request.vehicle.clone()),
                    reason: e.to_string(),
                }),
            }
        }
        let (allocations, overflowed) = continue_slip_numbers(allocations, allocation.start_slip);
        rejected.extend(overflowed);
        rejected.sort_by_key(|r| r.row);
        self.check_rejections(&rejected)?;

        let (invoices, counter) = number_invoices(allocations, counter)?;
        let summary = summarize(&invoices, counter, rejected);

        for warning in &summary.warnings {
            tracing::warn!(
                row = warning.row,
                vehicle = %warning.vehicle,
                invoice = %warning.invoice_label,
                residual = %warning.residual,
                "rounding left an unbilled residual"
            );
        }
        for rejection in &summary.rejected {
            tracing::warn!(row = rejection.row, reason = %rejection.reason, "row rejected");
        }
        tracing::debug!(
            invoices = summary.invoice_count(),
            total = %summary.total_amount,
            "billing run assembled"
        );

        Ok(BillingRun {
            header: self.settings.header.clone(),
            invoices,
            summary,
            generated_at: Utc::now(),
        })
    }

    fn check_rejections(&self, rejected: &[RowRejection]) -> Result<()> {
        if !self.all_or_nothing || rejected.is_empty() {
            return Ok(());
        }
        for rejection in rejected {
            tracing::warn!(row = rejection.row, reason = %rejection.reason, "row rejected");
        }
        Err(Error::BatchRejected {
            rejected: rejected.len(),
        })
    }
}

/// Allocate every request, returning results in request order
fn allocate_all(
    requests: &[VehicleBillingRequest],
    policy: RoundingPolicy,
    jobs: usize,
    progress: &(dyn Fn() + Sync),
) -> Vec<Result<VehicleAllocation>> {
    let workers = jobs.clamp(1, requests.len().max(1));
    if workers == 1 {
        return requests
            .iter()
            .map(|r| {
                let result = allocate_request(r, policy);
                progress();
                result
            })
            .collect();
    }

    let next_index = AtomicUsize::new(0);
    let mut indexed: Vec<(usize, Result<VehicleAllocation>)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let next_index = &next_index;
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        // Get next request to allocate (lock-free)
                        let idx = next_index.fetch_add(1, Ordering::SeqCst);
                        if idx >= requests.len() {
                            break;
                        }
                        done.push((idx, allocate_request(&requests[idx], policy)));
                        progress();
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    // Restore input order before anything positional happens
    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use rust_decimal_macros::dec;

    fn settings() -> BillingSettings {
        Config {
            customer_name: "Al-Habib Logistics".to_string(),
            account_number: "ACC-778".to_string(),
            slip_date: "Sep-2025".to_string(),
            ..Config::default()
        }
        .settings()
        .unwrap()
    }

    fn row(row: usize, vehicle: &str, amount: &str, start_slip: Option<&str>) -> RawRow {
        RawRow {
            row,
            vehicle: Some(vehicle.to_string()),
            amount: Some(amount.to_string()),
            start_slip: start_slip.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_two_vehicles_get_consecutive_invoices() {
        let rows = vec![
            row(2, "LEA-1234", "55000", Some("100")),
            row(3, "LES-77", "137.50", Some("900")),
        ];
        let run = ReportAssembler::new(settings()).assemble(&rows).unwrap();

        assert_eq!(run.invoices.len(), 2);
        assert_eq!(run.invoices[0].invoice_label(), "INV-0001");
        assert_eq!(run.invoices[0].slips.len(), 5);
        assert_eq!(run.invoices[1].invoice_label(), "INV-0002");
        assert_eq!(run.invoices[1].slips[0].number, 900);
        assert_eq!(run.summary.total_amount, dec!(55137.50));
        assert_eq!(run.summary.next_invoice_number.map(|n| n.value()), Some(3));
    }

    #[test]
    fn test_rejected_rows_do_not_consume_invoice_numbers() {
        let rows = vec![
            row(2, "A", "11000", Some("1")),
            row(3, "B", "not-a-number", Some("2")),
            row(4, "C", "11000", Some("3")),
        ];
        let run = ReportAssembler::new(settings()).assemble(&rows).unwrap();

        assert_eq!(run.invoices.len(), 2);
        assert_eq!(run.invoices[1].vehicle, "C");
        assert_eq!(run.invoices[1].invoice_label(), "INV-0002");
        assert_eq!(run.summary.rejected.len(), 1);
        assert_eq!(run.summary.rejected[0].row, 3);
    }

    #[test]
    fn test_all_or_nothing() {
        let rows = vec![row(2, "A", "11000", Some("1")), row(3, "B", "-1", Some("2"))];
        let err = ReportAssembler::new(settings())
            .all_or_nothing(true)
            .assemble(&rows)
            .unwrap_err();
        assert!(matches!(err, Error::BatchRejected { rejected: 1 }));
    }

    #[test]
    fn test_missing_start_slip_continues_numbering() {
        let rows = vec![
            row(2, "A", "22000", Some("500")),
            row(3, "B", "11137.50", None),
            row(4, "C", "0", None),
            row(5, "D", "100", None),
        ];
        let run = ReportAssembler::new(settings()).assemble(&rows).unwrap();

        let numbers: Vec<Vec<u64>> = run
            .invoices
            .iter()
            .map(|i| i.slips.iter().map(|s| s.number).collect())
            .collect();
        assert_eq!(numbers[0], vec![500, 501]);
        assert_eq!(numbers[1], vec![502, 503]);
        assert!(numbers[2].is_empty());
        assert_eq!(numbers[3], vec![504]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows: Vec<RawRow> = (0..200)
            .map(|i| {
                let amount = format!("{}.{:02}", 1000 + i * 137, i % 100);
                let start = if i % 3 == 0 { Some((i * 10 + 1).to_string()) } else { None };
                RawRow {
                    row: i + 2,
                    vehicle: Some(format!("V-{:03}", i)),
                    amount: Some(amount),
                    start_slip: start,
                    ..Default::default()
                }
            })
            .collect();

        let sequential = ReportAssembler::new(settings()).assemble(&rows).unwrap();
        let parallel = ReportAssembler::new(settings())
            .with_jobs(8)
            .assemble(&rows)
            .unwrap();

        assert_eq!(sequential.invoices, parallel.invoices);
        assert_eq!(sequential.summary, parallel.summary);
    }

    #[test]
    fn test_truncated_policy_reports_residual() {
        let mut config = Config {
            customer_name: "Al-Habib Logistics".to_string(),
            account_number: "ACC-778".to_string(),
            slip_date: "Sep-2025".to_string(),
            ..Config::default()
        };
        config.rounding = RoundingPolicy::Truncated;

        let rows = vec![row(2, "A", "11137.50", Some("1"))];
        let run = ReportAssembler::new(config.settings().unwrap())
            .assemble(&rows)
            .unwrap();

        assert_eq!(run.summary.warnings.len(), 1);
        assert_eq!(run.invoices[0].residual, dec!(137.50));
        assert_eq!(run.invoices[0].requested_amount(), dec!(11137.50));
    }

    #[test]
    fn test_largest_start_slip_without_row_start_slip() {
        let mut config = Config {
            customer_name: "Al-Habib Logistics".to_string(),
            account_number: "ACC-778".to_string(),
            slip_date: "Sep-2025".to_string(),
            ..Config::default()
        };
        config.start_slip = u64::from(u32::MAX);

        let rows = vec![row(2, "A", "22000", None), row(3, "B", "275", None)];
        let run = ReportAssembler::new(config.settings().unwrap())
            .assemble(&rows)
            .unwrap();

        let max = u64::from(u32::MAX);
        assert_eq!(run.invoices[0].slips[0].number, max);
        assert_eq!(run.invoices[0].slips[1].number, max + 1);
        assert_eq!(run.invoices[1].slips[0].number, max + 2);
    }

    #[test]
    fn test_last_invoice_number_is_issued() {
        let mut config = Config {
            customer_name: "Al-Habib Logistics".to_string(),
            account_number: "ACC-778".to_string(),
            slip_date: "Sep-2025".to_string(),
            ..Config::default()
        };
        config.start_invoice = u32::MAX;

        let rows = vec![row(2, "A", "22000", None)];
        let run = ReportAssembler::new(config.settings().unwrap())
            .assemble(&rows)
            .unwrap();

        assert_eq!(run.invoices[0].invoice_label(), "INV-4294967295");
        assert_eq!(run.summary.next_invoice_number, None);

        let two = vec![row(2, "A", "22000", None), row(3, "B", "100", None)];
        let err = ReportAssembler::new(config.settings().unwrap())
            .assemble(&two)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { ref field, .. } if field == "start_invoice"));
    }

    #[test]
    fn test_progress_called_per_vehicle() {
        let calls = AtomicUsize::new(0);
        let rows = vec![row(2, "A", "1", None), row(3, "B", "2", None), row(4, "C", "3", None)];
        ReportAssembler::new(settings())
            .with_jobs(2)
            .assemble_with_progress(&rows, &|| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
