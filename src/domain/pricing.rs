//! Rental price computation
//!
//! All amounts are integer minor currency units (e.g. cents) so day-count
//! multiplication never accumulates floating-point error. Day counting is
//! inclusive: a same-day rental bills as one day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::models::reservation::{InsuranceLevel, ReservationOptions};

/// Add-on fee schedule; configuration, never hardcoded at call sites
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Flat GPS fee per rental (minor units)
    pub gps_fee: i64,
    /// Flat extra-driver fee per rental (minor units)
    pub extra_driver_fee: i64,
    /// Premium insurance surcharge per rental day (minor units)
    pub premium_insurance_per_day: i64,
    /// Currency code (ISO 4217)
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            gps_fee: 3_000,
            extra_driver_fee: 5_000,
            premium_insurance_per_day: 1_500,
            currency: "MAD".to_string(),
        }
    }
}

/// Detailed price breakdown for a rental quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Inclusive day count
    pub days: i64,
    /// `days * price_per_day`
    pub base: i64,
    pub gps_fee: i64,
    pub extra_driver_fee: i64,
    pub insurance_fee: i64,
    pub total: i64,
    pub currency: String,
}

impl PriceBreakdown {
    pub fn format_total(&self) -> String {
        let major = self.total / 100;
        let minor = self.total % 100;
        format!("{}.{:02} {}", major, minor, self.currency)
    }
}

/// Inclusive day count for a rental period.
///
/// `start == end` counts as 1 day; callers guarantee `start <= end`.
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Quote a rental: base price plus selected add-ons.
///
/// Pure function of its inputs; `daily_rate` comes from the vehicle record
/// and the fee constants from `PricingConfig`.
pub fn quote(
    start: NaiveDate,
    end: NaiveDate,
    daily_rate: i64,
    options: ReservationOptions,
    config: &PricingConfig,
) -> PriceBreakdown {
    let days = rental_days(start, end);
    let base = days * daily_rate;

    let gps_fee = if options.gps { config.gps_fee } else { 0 };
    let extra_driver_fee = if options.extra_driver {
        config.extra_driver_fee
    } else {
        0
    };
    let insurance_fee = match options.insurance {
        InsuranceLevel::Premium => config.premium_insurance_per_day * days,
        InsuranceLevel::None | InsuranceLevel::Basic => 0,
    };

    PriceBreakdown {
        days,
        base,
        gps_fee,
        extra_driver_fee,
        insurance_fee,
        total: base + gps_fee + extra_driver_fee + insurance_fee,
        currency: config.currency.clone(),
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn config() -> PricingConfig {
        PricingConfig {
            gps_fee: 3_000,
            extra_driver_fee: 5_000,
            premium_insurance_per_day: 1_500,
            currency: "MAD".to_string(),
        }
    }

    #[test]
    fn same_day_rental_bills_one_day() {
        let d = date("2024-03-01");
        let q = quote(d, d, 10_000, ReservationOptions::default(), &config());
        assert_eq!(q.days, 1);
        assert_eq!(q.total, 10_000);
    }

    #[test]
    fn adjacent_days_bill_two_days() {
        let q = quote(
            date("2024-03-01"),
            date("2024-03-02"),
            10_000,
            ReservationOptions::default(),
            &config(),
        );
        assert_eq!(q.days, 2);
        assert_eq!(q.total, 20_000);
    }

    #[test]
    fn three_day_base_price() {
        // 2024-03-01..2024-03-03 at rate 100 -> 300
        let q = quote(
            date("2024-03-01"),
            date("2024-03-03"),
            100,
            ReservationOptions::default(),
            &config(),
        );
        assert_eq!(q.days, 3);
        assert_eq!(q.base, 300);
        assert_eq!(q.total, 300);
    }

    #[test]
    fn gps_adds_flat_fee_independent_of_days() {
        let cfg = config();
        for (start, end) in [("2024-03-01", "2024-03-01"), ("2024-03-01", "2024-03-10")] {
            let without = quote(
                date(start),
                date(end),
                10_000,
                ReservationOptions::default(),
                &cfg,
            );
            let with = quote(
                date(start),
                date(end),
                10_000,
                ReservationOptions {
                    gps: true,
                    ..Default::default()
                },
                &cfg,
            );
            assert_eq!(with.total, without.total + cfg.gps_fee);
        }
    }

    #[test]
    fn extra_driver_adds_flat_fee() {
        let cfg = config();
        let without = quote(
            date("2024-03-01"),
            date("2024-03-03"),
            10_000,
            ReservationOptions::default(),
            &cfg,
        );
        let with = quote(
            date("2024-03-01"),
            date("2024-03-03"),
            10_000,
            ReservationOptions {
                extra_driver: true,
                ..Default::default()
            },
            &cfg,
        );
        assert_eq!(with.total, without.total + cfg.extra_driver_fee);
    }

    #[test]
    fn premium_insurance_scales_with_days() {
        let cfg = config();
        let q = quote(
            date("2024-03-01"),
            date("2024-03-03"),
            10_000,
            ReservationOptions {
                insurance: InsuranceLevel::Premium,
                ..Default::default()
            },
            &cfg,
        );
        assert_eq!(q.insurance_fee, cfg.premium_insurance_per_day * 3);
        assert_eq!(q.total, 30_000 + cfg.premium_insurance_per_day * 3);
    }

    #[test]
    fn basic_insurance_is_free() {
        let cfg = config();
        let q = quote(
            date("2024-03-01"),
            date("2024-03-03"),
            10_000,
            ReservationOptions {
                insurance: InsuranceLevel::Basic,
                ..Default::default()
            },
            &cfg,
        );
        assert_eq!(q.insurance_fee, 0);
        assert_eq!(q.total, 30_000);
    }

    #[test]
    fn all_addons_are_additive() {
        let cfg = config();
        let q = quote(
            date("2024-06-01"),
            date("2024-06-02"),
            20_000,
            ReservationOptions {
                gps: true,
                extra_driver: true,
                insurance: InsuranceLevel::Premium,
            },
            &cfg,
        );
        assert_eq!(
            q.total,
            40_000 + cfg.gps_fee + cfg.extra_driver_fee + cfg.premium_insurance_per_day * 2
        );
    }

    #[test]
    fn format_total_prints_major_units() {
        let q = quote(
            date("2024-03-01"),
            date("2024-03-01"),
            12_345,
            ReservationOptions::default(),
            &config(),
        );
        assert_eq!(q.format_total(), "123.45 MAD");
    }
}
