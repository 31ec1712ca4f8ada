//! Slip allocation
//!
//! Splits a vehicle's purchased amount into fixed-capacity slips priced at a
//! single rate. Full slips are emitted while a whole slip still fits in the
//! remaining amount; the tail is sized by the [`RoundingPolicy`].
//!
//! Under [`RoundingPolicy::Fractional`] the final slip carries
//! `remaining / rate` litres and exactly the remaining amount, so the slip
//! amounts always sum to the requested total. [`RoundingPolicy::Truncated`]
//! bills whole litres only and reports what it could not bill as a residual.

use fuelslip_types::{Error, Result, RoundingPolicy};
use rust_decimal::Decimal;

use crate::model::{Slip, VehicleAllocation, VehicleBillingRequest};

/// Upper bound on slips for a single vehicle. Larger requests are almost
/// certainly a misplaced decimal point in the input.
pub const MAX_SLIPS_PER_VEHICLE: usize = 100_000;

/// Slips produced for one amount, plus what could not be billed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    pub slips: Vec<Slip>,
    pub residual: Decimal,
}

impl Allocation {
    pub fn total_quantity(&self) -> Decimal {
        self.slips.iter().map(|s| s.quantity).sum()
    }

    pub fn total_amount(&self) -> Decimal {
        self.slips.iter().map(|s| s.amount).sum()
    }
}

/// Allocate with the default fractional policy
pub fn allocate(
    total_amount: Decimal,
    rate: Decimal,
    slip_capacity: Decimal,
    starting_slip_number: u64,
    product: &str,
) -> Result<Allocation> {
    allocate_with_policy(
        total_amount,
        rate,
        slip_capacity,
        starting_slip_number,
        product,
        RoundingPolicy::Fractional,
    )
}

pub fn allocate_with_policy(
    total_amount: Decimal,
    rate: Decimal,
    slip_capacity: Decimal,
    starting_slip_number: u64,
    product: &str,
    policy: RoundingPolicy,
) -> Result<Allocation> {
    validate_preconditions(rate, slip_capacity, starting_slip_number)?;

    if total_amount <= Decimal::ZERO {
        return Ok(Allocation::default());
    }

    let full_slip_amount = slip_capacity
        .checked_mul(rate)
        .ok_or_else(|| Error::AmountOverflow(format!("{} x {}", slip_capacity, rate)))?;

    let full_slips = total_amount
        .checked_div(full_slip_amount)
        .ok_or_else(|| Error::AmountOverflow(format!("{} / {}", total_amount, full_slip_amount)))?
        .floor();
    if full_slips >= Decimal::from(MAX_SLIPS_PER_VEHICLE) {
        return Err(Error::AmountOverflow(format!(
            "amount {} needs more than {} slips of {}",
            total_amount, MAX_SLIPS_PER_VEHICLE, full_slip_amount
        )));
    }

    let mut slips = Vec::new();
    let mut remaining = total_amount;
    let mut slip_index = 1;
    let mut slip_number = starting_slip_number;

    while remaining > Decimal::ZERO {
        let (quantity, amount) = if full_slip_amount > remaining {
            partial_slip(remaining, rate, policy)?
        } else {
            (slip_capacity, full_slip_amount)
        };

        // A tail too small to hold any quantity stays in `remaining`
        if quantity <= Decimal::ZERO {
            break;
        }

        slips.push(Slip {
            index: slip_index,
            number: slip_number,
            product: product.to_string(),
            quantity,
            rate,
            amount,
        });

        remaining -= amount;
        slip_index += 1;
        slip_number = slip_number
            .checked_add(1)
            .ok_or_else(|| Error::AmountOverflow("slip number exceeds u64".to_string()))?;
    }

    Ok(Allocation {
        slips,
        residual: remaining.max(Decimal::ZERO),
    })
}

/// Quantity and amount of the final slip when a full slip no longer fits
fn partial_slip(remaining: Decimal, rate: Decimal, policy: RoundingPolicy) -> Result<(Decimal, Decimal)> {
    let exact = remaining
        .checked_div(rate)
        .ok_or_else(|| Error::AmountOverflow(format!("{} / {}", remaining, rate)))?;

    match policy {
        RoundingPolicy::Fractional => Ok((exact, remaining)),
        RoundingPolicy::Truncated => {
            let whole = exact.floor();
            let amount = whole
                .checked_mul(rate)
                .ok_or_else(|| Error::AmountOverflow(format!("{} x {}", whole, rate)))?;
            Ok((whole, amount))
        }
    }
}

fn validate_preconditions(rate: Decimal, slip_capacity: Decimal, starting_slip_number: u64) -> Result<()> {
    if rate <= Decimal::ZERO {
        return Err(Error::invalid_config(
            "rate",
            format!("must be greater than zero (got {})", rate),
        ));
    }
    if slip_capacity <= Decimal::ZERO {
        return Err(Error::invalid_config(
            "slip_capacity",
            format!("must be greater than zero (got {})", slip_capacity),
        ));
    }
    if starting_slip_number < 1 {
        return Err(Error::invalid_config("start_slip", "must be at least 1"));
    }
    Ok(())
}

/// Allocate one vehicle's request.
///
/// A request without a starting slip number is allocated from 1; the caller
/// renumbers it once the previous vehicle's last slip is known.
pub fn allocate_request(request: &VehicleBillingRequest, policy: RoundingPolicy) -> Result<VehicleAllocation> {
    let allocation = allocate_with_policy(
        request.total_amount,
        request.rate,
        request.slip_capacity,
        request.start_slip.unwrap_or(1),
        &request.product,
        policy,
    )?;

    if allocation.residual > Decimal::ZERO {
        tracing::debug!(
            vehicle = %request.vehicle,
            residual = %allocation.residual,
            "allocation stopped with an unbilled residual"
        );
    }

    Ok(VehicleAllocation {
        row: request.row,
        vehicle: request.vehicle.clone(),
        product: request.product.clone(),
        rate: request.rate,
        slip_capacity: request.slip_capacity,
        total_quantity: allocation.total_quantity(),
        total_amount: allocation.total_amount(),
        residual: allocation.residual,
        slips: allocation.slips,
        explicit_start: request.start_slip.is_some(),
    })
}
