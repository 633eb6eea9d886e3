// service/payment_calculator.rs
//
// Settlement math for a confirmed timesheet. Every amount is an exact
// decimal rounded half-up to cents where it is stored.
use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::shiftmodel::Payment;

const MONEY_SCALE: i64 = 2;
const HOURS_SCALE: i64 = 2;

/// Who carries the platform fee.
///
/// `Gross`: the fee is charged to the employer on top of the subtotal and
/// the worker receives the full subtotal. `Net`: the fee is also withheld
/// from the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutModel {
    Gross,
    Net,
}

impl FromStr for PayoutModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gross" => Ok(PayoutModel::Gross),
            "net" => Ok(PayoutModel::Net),
            other => Err(format!("Unknown payout model '{}', expected 'gross' or 'net'", other)),
        }
    }
}

impl fmt::Display for PayoutModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoutModel::Gross => f.write_str("gross"),
            PayoutModel::Net => f.write_str("net"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum PaymentError {
    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("Platform fee percentage must be between 0 and 1, got {0}")]
    FeeOutOfRange(BigDecimal),

    #[error("Overtime multiplier must be at least 1, got {0}")]
    MultiplierTooLow(BigDecimal),

    #[error("Clock-out time is before clock-in time")]
    ClockOutBeforeClockIn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentBreakdown {
    pub regular_amount: BigDecimal,
    pub overtime_amount: BigDecimal,
    pub subtotal: BigDecimal,
    pub platform_fee_percentage: BigDecimal,
    pub platform_fee: BigDecimal,
    pub total_charged: BigDecimal,
    pub worker_payout: BigDecimal,
    pub payout_model: PayoutModel,
}

pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

fn ensure_non_negative(value: &BigDecimal, what: &'static str) -> Result<(), PaymentError> {
    if value < &BigDecimal::zero() {
        return Err(PaymentError::Negative(what));
    }
    Ok(())
}

pub fn calculate_payment(
    hourly_rate: &BigDecimal,
    overtime_multiplier: &BigDecimal,
    regular_hours: &BigDecimal,
    overtime_hours: &BigDecimal,
    platform_fee_percentage: &BigDecimal,
    payout_model: PayoutModel,
) -> Result<PaymentBreakdown, PaymentError> {
    ensure_non_negative(hourly_rate, "Hourly rate")?;
    ensure_non_negative(regular_hours, "Regular hours")?;
    ensure_non_negative(overtime_hours, "Overtime hours")?;

    if overtime_multiplier < &BigDecimal::from(1) {
        return Err(PaymentError::MultiplierTooLow(overtime_multiplier.clone()));
    }
    if platform_fee_percentage < &BigDecimal::zero()
        || platform_fee_percentage >= &BigDecimal::from(1)
    {
        return Err(PaymentError::FeeOutOfRange(platform_fee_percentage.clone()));
    }

    let regular_amount = round_money(&(regular_hours * hourly_rate));
    let overtime_amount = round_money(&(overtime_hours * hourly_rate * overtime_multiplier));
    let subtotal = &regular_amount + &overtime_amount;
    let platform_fee = round_money(&(&subtotal * platform_fee_percentage));
    let total_charged = &subtotal + &platform_fee;
    let worker_payout = match payout_model {
        PayoutModel::Gross => subtotal.clone(),
        PayoutModel::Net => &subtotal - &platform_fee,
    };

    Ok(PaymentBreakdown {
        regular_amount,
        overtime_amount,
        subtotal,
        platform_fee_percentage: platform_fee_percentage.clone(),
        platform_fee,
        total_charged,
        worker_payout,
        payout_model,
    })
}

/// Re-derives fee, charge and payout from a stored payment row and
/// reports whether they agree with what was written.
pub fn verify_payment(payment: &Payment, payout_model: PayoutModel) -> bool {
    let subtotal_ok = payment.subtotal == &payment.regular_amount + &payment.overtime_amount;
    let fee_ok =
        payment.platform_fee == round_money(&(&payment.subtotal * &payment.platform_fee_percentage));
    let total_ok = payment.total_charged == &payment.subtotal + &payment.platform_fee;
    let payout_ok = match payout_model {
        PayoutModel::Gross => payment.worker_payout == payment.subtotal,
        PayoutModel::Net => payment.worker_payout == &payment.subtotal - &payment.platform_fee,
    };

    subtotal_ok && fee_ok && total_ok && payout_ok
}

/// Hours between clock-in and clock-out, rounded to two places.
pub fn worked_hours(
    clock_in: DateTime<Utc>,
    clock_out: DateTime<Utc>,
) -> Result<BigDecimal, PaymentError> {
    let minutes = (clock_out - clock_in).num_minutes();
    if minutes < 0 {
        return Err(PaymentError::ClockOutBeforeClockIn);
    }

    let hours = BigDecimal::from(minutes) / BigDecimal::from(60);
    Ok(hours.with_scale_round(HOURS_SCALE, RoundingMode::HalfUp))
}

/// Splits worked hours into (regular, overtime) against the scheduled
/// length of the shift.
pub fn split_hours(worked: &BigDecimal, scheduled_minutes: i64) -> (BigDecimal, BigDecimal) {
    let scheduled = (BigDecimal::from(scheduled_minutes.max(0)) / BigDecimal::from(60))
        .with_scale_round(HOURS_SCALE, RoundingMode::HalfUp);

    if worked <= &scheduled {
        (worked.clone(), BigDecimal::zero())
    } else {
        let overtime = worked - &scheduled;
        (scheduled, overtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    #[test]
    fn test_standard_shift_settlement() {
        let breakdown = calculate_payment(
            &dec("20"),
            &dec("1.5"),
            &dec("8"),
            &dec("2"),
            &dec("0.1"),
            PayoutModel::Gross,
        )
        .unwrap();

        assert_eq!(breakdown.regular_amount, dec("160"));
        assert_eq!(breakdown.overtime_amount, dec("60"));
        assert_eq!(breakdown.subtotal, dec("220"));
        assert_eq!(breakdown.platform_fee, dec("22"));
        assert_eq!(breakdown.total_charged, dec("242"));
        assert_eq!(breakdown.worker_payout, dec("220"));
    }

    #[test]
    fn test_net_model_withholds_fee_from_worker() {
        let breakdown = calculate_payment(
            &dec("20"),
            &dec("1.5"),
            &dec("8"),
            &dec("2"),
            &dec("0.1"),
            PayoutModel::Net,
        )
        .unwrap();

        assert_eq!(breakdown.total_charged, dec("242"));
        assert_eq!(breakdown.worker_payout, dec("198"));
    }

    #[test]
    fn test_fee_rounds_half_up_to_cents() {
        // 3 * 12.35 = 37.05; 37.05 * 0.15 = 5.5575
        let breakdown = calculate_payment(
            &dec("12.35"),
            &dec("1.5"),
            &dec("3"),
            &dec("0"),
            &dec("0.15"),
            PayoutModel::Gross,
        )
        .unwrap();

        assert_eq!(breakdown.subtotal, dec("37.05"));
        assert_eq!(breakdown.platform_fee, dec("5.56"));
        assert_eq!(breakdown.total_charged, dec("42.61"));
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let fee = calculate_payment(
            &dec("20"),
            &dec("1.5"),
            &dec("8"),
            &dec("0"),
            &dec("1.2"),
            PayoutModel::Gross,
        );
        assert_eq!(fee, Err(PaymentError::FeeOutOfRange(dec("1.2"))));

        let hours = calculate_payment(
            &dec("20"),
            &dec("1.5"),
            &dec("-1"),
            &dec("0"),
            &dec("0.1"),
            PayoutModel::Gross,
        );
        assert_eq!(hours, Err(PaymentError::Negative("Regular hours")));

        let multiplier = calculate_payment(
            &dec("20"),
            &dec("0.5"),
            &dec("8"),
            &dec("0"),
            &dec("0.1"),
            PayoutModel::Gross,
        );
        assert_eq!(multiplier, Err(PaymentError::MultiplierTooLow(dec("0.5"))));
    }

    #[test]
    fn test_verify_payment_detects_tampered_fee() {
        let breakdown = calculate_payment(
            &dec("18.5"),
            &dec("2"),
            &dec("7.5"),
            &dec("1.25"),
            &dec("0.12"),
            PayoutModel::Gross,
        )
        .unwrap();

        let mut payment = Payment {
            id: Uuid::new_v4(),
            shift_id: Uuid::new_v4(),
            timesheet_id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
            regular_amount: breakdown.regular_amount,
            overtime_amount: breakdown.overtime_amount,
            subtotal: breakdown.subtotal,
            platform_fee_percentage: breakdown.platform_fee_percentage,
            platform_fee: breakdown.platform_fee,
            total_charged: breakdown.total_charged,
            worker_payout: breakdown.worker_payout,
            status: crate::models::shiftmodel::PaymentStatus::HeldInEscrow,
            created_at: None,
            released_at: None,
        };

        assert!(verify_payment(&payment, PayoutModel::Gross));
        assert!(!verify_payment(&payment, PayoutModel::Net));

        payment.platform_fee = &payment.platform_fee + dec("0.01");
        assert!(!verify_payment(&payment, PayoutModel::Gross));
    }

    #[test]
    fn test_worked_hours_and_overtime_split() {
        let clock_in = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let clock_out = Utc.with_ymd_and_hms(2026, 3, 2, 19, 15, 0).unwrap();

        let worked = worked_hours(clock_in, clock_out).unwrap();
        assert_eq!(worked, dec("10.25"));

        let (regular, overtime) = split_hours(&worked, 8 * 60);
        assert_eq!(regular, dec("8"));
        assert_eq!(overtime, dec("2.25"));

        let (regular, overtime) = split_hours(&dec("6.5"), 8 * 60);
        assert_eq!(regular, dec("6.5"));
        assert_eq!(overtime, dec("0"));
    }

    #[test]
    fn test_clock_out_before_clock_in() {
        let clock_in = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let clock_out = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        assert_eq!(
            worked_hours(clock_in, clock_out),
            Err(PaymentError::ClockOutBeforeClockIn)
        );
    }

    #[test]
    fn test_payout_model_parsing() {
        assert_eq!("Gross".parse::<PayoutModel>(), Ok(PayoutModel::Gross));
        assert_eq!(" net ".parse::<PayoutModel>(), Ok(PayoutModel::Net));
        assert!("split".parse::<PayoutModel>().is_err());
    }
}
